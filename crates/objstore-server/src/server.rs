use std::future::Future;
use std::sync::Arc;

use objstore_store::ObjectStore;
use tokio::net::TcpListener;

use crate::auth::{AllowAllAuth, AuthProvider, KindAclAuth};
use crate::config::ServerConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::handler::{ServiceLimits, StoreService};
use crate::router::{build_router, AppState};
use crate::service::ObjectStoreService;

/// Object store HTTP server.
pub struct ObjectStoreServer {
    config: ServerConfig,
    state: AppState,
}

impl ObjectStoreServer {
    /// Serve `store` with the auth provider described by `config`.
    pub fn new<S: ObjectStore + 'static>(config: ServerConfig, store: S) -> Self {
        let auth: Arc<dyn AuthProvider> = match &config.auth {
            Some(acl) => Arc::new(KindAclAuth::from_config(acl, config.allow_anonymous_read)),
            None => Arc::new(AllowAllAuth),
        };
        let service = StoreService::new(store, Arc::clone(&auth), ServiceLimits::from(&config));
        Self::with_service(config, Arc::new(service), auth)
    }

    pub fn with_service(
        config: ServerConfig,
        service: Arc<dyn ObjectStoreService>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            config,
            state: AppState { service, auth },
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.permissive_cors)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServiceResult<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves, then finish in-flight requests.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> ServiceResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("object store listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }
}
