use objstore_types::ObjectCoordinates;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A pagination token that this store did not issue.
    #[error("invalid page token: {0:?}")]
    InvalidPageToken(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored data for an object is inconsistent.
    #[error("corrupt object {coordinates}: {reason}")]
    CorruptObject {
        coordinates: ObjectCoordinates,
        reason: String,
    },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
