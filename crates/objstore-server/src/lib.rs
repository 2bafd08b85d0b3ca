//! Object store service.
//!
//! Exposes Read, BatchRead, Write, Delete, History and Search over HTTP,
//! with authentication, per-kind authorization, and request limits taken
//! from [`ServerConfig`]. Response bodies are produced by `objstore-codec`.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod service;

pub use auth::{Access, Action, AllowAllAuth, AuthProvider, Credentials, Identity, KindAclAuth};
pub use config::{AuthConfig, GrantConfig, ServerConfig};
pub use error::{ServiceError, ServiceResult};
pub use handler::{ServiceLimits, StoreService};
pub use router::{build_router, AppState};
pub use server::ObjectStoreServer;
pub use service::ObjectStoreService;
