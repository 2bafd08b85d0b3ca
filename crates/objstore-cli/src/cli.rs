use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "objstore",
    about = "Versioned object store with a skip-if-default JSON wire format",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server over an in-memory store
    Serve(ServeArgs),
    /// Parse and validate a server config file
    CheckConfig(CheckConfigArgs),
    /// Print the wire encoding of a file wrapped as an object
    Encode(EncodeArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file; defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Listen address, overriding the config
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct CheckConfigArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct EncodeArgs {
    #[arg(long)]
    pub kind: String,
    #[arg(long)]
    pub uid: String,
    /// File holding the object body
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["objstore", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:8080".parse().unwrap()));
            assert!(args.config.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_rejects_bad_addr() {
        assert!(Cli::try_parse_from(["objstore", "serve", "--bind", "nowhere"]).is_err());
    }

    #[test]
    fn parse_check_config() {
        let cli = Cli::try_parse_from(["objstore", "check-config", "server.toml"]).unwrap();
        if let Command::CheckConfig(args) = cli.command {
            assert_eq!(args.path, PathBuf::from("server.toml"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_encode() {
        let cli = Cli::try_parse_from([
            "objstore", "encode", "--kind", "dashboard", "--uid", "d1", "body.json",
        ])
        .unwrap();
        if let Command::Encode(args) = cli.command {
            assert_eq!(args.kind, "dashboard");
            assert_eq!(args.uid, "d1");
            assert_eq!(args.path, PathBuf::from("body.json"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn encode_requires_coordinates() {
        assert!(Cli::try_parse_from(["objstore", "encode", "body.json"]).is_err());
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["objstore", "--verbose", "check-config", "x.toml"]).unwrap();
        assert!(cli.verbose);
        let cli = Cli::try_parse_from(["objstore", "check-config", "x.toml", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
