use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest UID accepted by [`ObjectCoordinates::validate`].
pub const MAX_UID_LEN: usize = 256;
/// Longest kind accepted by [`ObjectCoordinates::validate`].
pub const MAX_KIND_LEN: usize = 64;

/// Addresses one object in the store: its kind plus its UID.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectCoordinates {
    pub kind: String,
    pub uid: String,
}

impl ObjectCoordinates {
    pub fn new(kind: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            uid: uid.into(),
        }
    }

    /// Check that both parts are present and well-formed.
    pub fn validate(&self) -> Result<(), TypeError> {
        check_part("kind", &self.kind, MAX_KIND_LEN)?;
        check_part("UID", &self.uid, MAX_UID_LEN)
    }
}

fn check_part(field: &'static str, value: &str, max: usize) -> Result<(), TypeError> {
    if value.is_empty() {
        return Err(TypeError::MissingField(field));
    }
    if value.len() > max {
        return Err(TypeError::InvalidField {
            field,
            reason: format!("longer than {max} bytes"),
        });
    }
    if value.contains('/') || value.chars().any(char::is_control) {
        return Err(TypeError::InvalidField {
            field,
            reason: format!("{value:?} contains a reserved character"),
        });
    }
    Ok(())
}

impl fmt::Display for ObjectCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.uid)
    }
}

/// Where an object was synchronized from, when it was not written directly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawObjectSyncInfo {
    /// Origin of the synced copy (e.g. a provisioning path).
    pub source: String,
    /// When the copy was taken, unix milliseconds. `0` means unset.
    pub time: i64,
}

/// A stored object as it crosses the wire.
///
/// Every field except `uid` treats its zero value as "absent": an empty
/// string, an empty body, a zero timestamp or size, or `None` for `sync`
/// is left out of the encoding entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawObject {
    /// Stable identifier. Always emitted, even when empty.
    pub uid: String,
    pub kind: String,
    pub version: String,
    /// Creation time, unix milliseconds.
    pub created: i64,
    /// Last update time, unix milliseconds.
    pub updated: i64,
    pub created_by: String,
    pub updated_by: String,
    /// Opaque payload. Emitted as embedded JSON when it parses as JSON,
    /// otherwise as base64.
    pub body: Vec<u8>,
    /// Content fingerprint used for optimistic concurrency.
    pub etag: String,
    /// Body length in bytes.
    pub size: i64,
    pub sync: Option<RawObjectSyncInfo>,
}

impl RawObject {
    pub fn new(uid: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Set the body and keep `size` in step with it.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.size = self.body.len() as i64;
        self
    }

    pub fn coordinates(&self) -> ObjectCoordinates {
        ObjectCoordinates::new(self.kind.clone(), self.uid.clone())
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Copy of this object with the body dropped (metadata only).
    pub fn without_body(&self) -> Self {
        Self {
            body: Vec::new(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_validate_ok() {
        assert!(ObjectCoordinates::new("dashboard", "abc-123").validate().is_ok());
    }

    #[test]
    fn coordinates_require_both_parts() {
        assert_eq!(
            ObjectCoordinates::new("", "abc").validate(),
            Err(TypeError::MissingField("kind"))
        );
        assert_eq!(
            ObjectCoordinates::new("dashboard", "").validate(),
            Err(TypeError::MissingField("UID"))
        );
    }

    #[test]
    fn coordinates_reject_slash_and_length() {
        let err = ObjectCoordinates::new("dashboard", "a/b").validate().unwrap_err();
        assert!(matches!(err, TypeError::InvalidField { field: "UID", .. }));

        let long = "x".repeat(MAX_UID_LEN + 1);
        let err = ObjectCoordinates::new("dashboard", long).validate().unwrap_err();
        assert!(matches!(err, TypeError::InvalidField { field: "UID", .. }));
    }

    #[test]
    fn coordinates_display() {
        assert_eq!(ObjectCoordinates::new("folder", "f1").to_string(), "folder/f1");
    }

    #[test]
    fn with_body_tracks_size() {
        let obj = RawObject::new("a", "dashboard").with_body(b"{\"x\":1}".to_vec());
        assert_eq!(obj.size, 7);
        assert!(obj.has_body());
        let meta = obj.without_body();
        assert!(!meta.has_body());
        assert_eq!(meta.size, 7);
        assert_eq!(meta.uid, "a");
    }
}
