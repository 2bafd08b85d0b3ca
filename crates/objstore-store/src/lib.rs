//! Versioned object storage behind the object store service.
//!
//! Objects are addressed by `(kind, UID)`. Every successful write adds an
//! immutable version; the store records who wrote it, when, and a content
//! ETag derived from the body with BLAKE3 (domain-separated).
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Versions are immutable once written.
//! 2. Optimistic concurrency: a write or delete may name the version or ETag
//!    it expects; a mismatch is a conflict and nothing changes.
//! 3. Writing the same body again is reported as unchanged, not a new version.
//! 4. Summaries (name, description, labels, scalar fields) are extracted at
//!    write time so search never has to parse bodies.
//! 5. All errors are propagated, never silently ignored.

pub mod error;
pub mod etag;
pub mod memory;
pub mod summary;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use etag::EtagHasher;
pub use memory::InMemoryObjectStore;
pub use summary::ObjectSummary;
pub use traits::{
    DeleteOutcome, HistoryPage, ObjectStore, PutOutcome, PutRequest, SearchPage, SearchQuery,
    StoredObject,
};
