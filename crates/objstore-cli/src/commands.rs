use std::io::Write;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use objstore_codec::{is_valid_json, ObjectCodec};
use objstore_server::{ObjectStoreServer, ServerConfig};
use objstore_store::{EtagHasher, InMemoryObjectStore};
use objstore_types::{ObjectCoordinates, RawObject};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::CheckConfig(args) => cmd_check_config(args),
        Command::Encode(args) => cmd_encode(args),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    println!("{} object store on {}", "▶".green().bold(), config.bind_addr.to_string().bold());
    if config.auth.is_none() {
        tracing::warn!("no [auth] section; every caller may read and write");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(async {
        let server = ObjectStoreServer::new(config, InMemoryObjectStore::new());
        server
            .serve_with_shutdown(async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::error!(%err, "cannot listen for ctrl-c");
                }
            })
            .await
    })?;
    println!("{} stopped", "✓".green());
    Ok(())
}

fn cmd_check_config(args: CheckConfigArgs) -> anyhow::Result<()> {
    let config = ServerConfig::load(&args.path)?;
    println!("{} {} is valid", "✓".green().bold(), args.path.display());
    println!("  bind: {}", config.bind_addr.to_string().bold());
    println!("  batch limit: {}", config.max_batch_size);
    println!(
        "  history limit: {} (max {})",
        config.default_history_limit, config.max_history_limit
    );
    println!(
        "  search limit: {} (max {})",
        config.default_search_limit, config.max_search_limit
    );
    match &config.auth {
        Some(auth) => println!(
            "  auth: {} tokens, {} admins, {} grants",
            auth.tokens.len(),
            auth.admins.len(),
            auth.grants.len()
        ),
        None => println!("  auth: {}", "open".yellow()),
    }
    Ok(())
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let encoded = encode_file(&args.kind, &args.uid, &args.path)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&encoded)?;
    writeln!(stdout)?;
    Ok(())
}

/// Wrap the file at `path` as an object and return its wire encoding.
pub fn encode_file(kind: &str, uid: &str, path: &Path) -> anyhow::Result<Vec<u8>> {
    ObjectCoordinates::new(kind, uid).validate()?;
    let body = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mut object = RawObject::new(uid, kind);
    object.etag = EtagHasher::BODY.etag(&body);
    tracing::debug!(
        bytes = body.len(),
        embedded = is_valid_json(&body),
        "encoding {}",
        path.display()
    );
    let object = object.with_body(body);
    Ok(ObjectCodec::encode(&object)?)
}
