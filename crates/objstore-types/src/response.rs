use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;
use crate::object::RawObject;
use crate::search::ObjectSearchResult;

/// Structured error attached to a response or a failed batch slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectErrorInfo {
    /// Numeric code, HTTP-like (404, 409, 403, 400, 500).
    pub code: i64,
    pub message: String,
    /// Optional JSON text with extra detail. Spliced verbatim.
    pub details_json: Vec<u8>,
}

impl ObjectErrorInfo {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details_json: Vec::new(),
        }
    }

    pub fn with_details(mut self, details_json: Vec<u8>) -> Self {
        self.details_json = details_json;
        self
    }
}

impl fmt::Display for ObjectErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

/// Response to a single read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadObjectResponse {
    /// Written as `null` when absent; the key itself is always present.
    pub object: Option<RawObject>,
    /// JSON text summarizing the object. Spliced verbatim.
    pub summary_json: Vec<u8>,
}

impl ReadObjectResponse {
    pub fn new(object: RawObject) -> Self {
        Self {
            object: Some(object),
            summary_json: Vec::new(),
        }
    }
}

/// Outcome of a write, rendered on the wire by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WriteStatus {
    #[default]
    Error,
    Created,
    Updated,
    /// Body identical to the current version; nothing was stored.
    Unchanged,
    /// A precondition did not match the current version.
    Conflict,
}

impl WriteStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Conflict => "conflict",
        }
    }
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "unchanged" => Ok(Self::Unchanged),
            "conflict" => Ok(Self::Conflict),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

/// Response to a write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteObjectResponse {
    pub status: WriteStatus,
    pub error: Option<ObjectErrorInfo>,
    /// The stored object, or the current server-side object on conflict.
    pub object: Option<RawObject>,
    pub summary_json: Vec<u8>,
}

impl WriteObjectResponse {
    pub fn error(error: ObjectErrorInfo) -> Self {
        Self {
            status: WriteStatus::Error,
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn conflict(current: RawObject, error: ObjectErrorInfo) -> Self {
        Self {
            status: WriteStatus::Conflict,
            error: Some(error),
            object: Some(current),
            summary_json: Vec::new(),
        }
    }
}

/// Outcome of a delete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeleteStatus {
    #[default]
    Error,
    Deleted,
    NotFound,
    Conflict,
}

impl DeleteStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Deleted => "deleted",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
        }
    }
}

impl fmt::Display for DeleteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeleteStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "deleted" => Ok(Self::Deleted),
            "not_found" => Ok(Self::NotFound),
            "conflict" => Ok(Self::Conflict),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteObjectResponse {
    pub status: DeleteStatus,
    pub error: Option<ObjectErrorInfo>,
}

impl DeleteObjectResponse {
    pub fn with_status(status: DeleteStatus) -> Self {
        Self {
            status,
            error: None,
        }
    }
}

/// One slot of a batch read, positionally matched to its request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchReadResult {
    Found(ReadObjectResponse),
    Failed(ObjectErrorInfo),
}

impl BatchReadResult {
    pub fn object(&self) -> Option<&RawObject> {
        match self {
            Self::Found(resp) => resp.object.as_ref(),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ObjectErrorInfo> {
        match self {
            Self::Found(_) => None,
            Self::Failed(err) => Some(err),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReadObjectResponse {
    pub results: Vec<BatchReadResult>,
}

/// Metadata for one past version of an object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectVersionInfo {
    /// Always emitted.
    pub version: String,
    pub updated: i64,
    pub updated_by: String,
    pub size: i64,
    pub etag: String,
    pub comment: String,
}

/// Page of an object's history, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectHistoryResponse {
    pub uid: String,
    pub kind: String,
    pub versions: Vec<ObjectVersionInfo>,
    /// Present when more versions remain.
    pub next_page_token: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectSearchResponse {
    pub results: Vec<ObjectSearchResult>,
    pub next_page_token: String,
}
