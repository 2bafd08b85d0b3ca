use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use objstore_codec::ObjectCodec;
use objstore_types::{ObjectCoordinates, ObjectErrorInfo, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("object not found: {0}")]
    NotFound(ObjectCoordinates),

    #[error("precondition failed on {coordinates}: {reason}")]
    Conflict {
        coordinates: ObjectCoordinates,
        reason: String,
    },

    #[error("authentication failed: {0}")]
    Unauthenticated(String),

    #[error("permission denied: {action} for {identity}")]
    PermissionDenied { identity: String, action: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store error: {0}")]
    Store(#[from] objstore_store::StoreError),

    #[error("codec error: {0}")]
    Codec(#[from] objstore_codec::CodecError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Numeric code carried in `ObjectErrorInfo.code`.
    pub fn code(&self) -> i64 {
        i64::from(self.http_status().as_u16())
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Store(objstore_store::StoreError::InvalidPageToken(_)) => StatusCode::BAD_REQUEST,
            Self::Store(_)
            | Self::Codec(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(&self) -> ObjectErrorInfo {
        ObjectErrorInfo::new(self.code(), self.to_string())
    }
}

impl From<TypeError> for ServiceError {
    fn from(err: TypeError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Call failures travel as their HTTP status with an encoded
/// `ObjectErrorInfo` body.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        match ObjectCodec::encode(&self.to_error_info()) {
            Ok(body) => {
                (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
            }
            Err(_) => status.into_response(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
