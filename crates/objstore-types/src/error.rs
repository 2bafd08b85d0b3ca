use thiserror::Error;

/// Errors produced while building or validating model records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unknown status name: {0}")]
    UnknownStatus(String),

    #[error("body given both as `body` and `body_base64`")]
    AmbiguousBody,

    #[error("invalid base64 body: {0}")]
    InvalidBase64(String),
}
