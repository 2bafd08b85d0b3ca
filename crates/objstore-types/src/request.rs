use std::collections::BTreeMap;

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::TypeError;
use crate::object::ObjectCoordinates;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadObjectRequest {
    #[serde(rename = "UID", alias = "uid")]
    pub uid: String,
    pub kind: String,
    /// Specific version to read; empty means the latest.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub with_body: bool,
    pub with_summary: bool,
}

impl ReadObjectRequest {
    pub fn new(kind: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            kind: kind.into(),
            with_body: true,
            ..Default::default()
        }
    }

    pub fn coordinates(&self) -> ObjectCoordinates {
        ObjectCoordinates::new(self.kind.clone(), self.uid.clone())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchReadObjectRequest {
    pub batch: Vec<ReadObjectRequest>,
}

/// A write. The body may arrive as embedded JSON (`body`) or as a base64
/// string (`body_base64`), mirroring how responses carry it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "WriteObjectRequestWire")]
pub struct WriteObjectRequest {
    pub uid: String,
    pub kind: String,
    pub body: Vec<u8>,
    /// Free-form note recorded with the version.
    pub comment: String,
    /// Fails with a conflict unless the current version matches.
    pub previous_version: String,
    /// Fails with a conflict unless the current ETag matches.
    pub previous_etag: String,
}

impl WriteObjectRequest {
    pub fn new(kind: impl Into<String>, uid: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            uid: uid.into(),
            kind: kind.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn coordinates(&self) -> ObjectCoordinates {
        ObjectCoordinates::new(self.kind.clone(), self.uid.clone())
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct WriteObjectRequestWire {
    #[serde(rename = "UID", alias = "uid")]
    uid: String,
    kind: String,
    #[serde(deserialize_with = "present_body")]
    body: Option<Box<RawValue>>,
    body_base64: Option<String>,
    comment: String,
    previous_version: String,
    previous_etag: String,
}

/// An explicit `"body": null` is the four-byte JSON document `null`, not
/// an absent body.
fn present_body<'de, D>(deserializer: D) -> Result<Option<Box<RawValue>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

impl TryFrom<WriteObjectRequestWire> for WriteObjectRequest {
    type Error = TypeError;

    fn try_from(wire: WriteObjectRequestWire) -> Result<Self, Self::Error> {
        let body = match (wire.body, wire.body_base64) {
            (Some(_), Some(_)) => return Err(TypeError::AmbiguousBody),
            (Some(raw), None) => raw.get().as_bytes().to_vec(),
            (None, Some(encoded)) => base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| TypeError::InvalidBase64(e.to_string()))?,
            (None, None) => Vec::new(),
        };
        Ok(Self {
            uid: wire.uid,
            kind: wire.kind,
            body,
            comment: wire.comment,
            previous_version: wire.previous_version,
            previous_etag: wire.previous_etag,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteObjectRequest {
    #[serde(rename = "UID", alias = "uid")]
    pub uid: String,
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub previous_version: String,
}

impl DeleteObjectRequest {
    pub fn new(kind: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            kind: kind.into(),
            previous_version: String::new(),
        }
    }

    pub fn coordinates(&self) -> ObjectCoordinates {
        ObjectCoordinates::new(self.kind.clone(), self.uid.clone())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectHistoryRequest {
    #[serde(rename = "UID", alias = "uid")]
    pub uid: String,
    pub kind: String,
    /// Page size; `0` picks the server default.
    pub limit: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub next_page_token: String,
}

impl ObjectHistoryRequest {
    pub fn new(kind: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn coordinates(&self) -> ObjectCoordinates {
        ObjectCoordinates::new(self.kind.clone(), self.uid.clone())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectSearchRequest {
    /// Kinds to match; empty matches every kind.
    pub kind: Vec<String>,
    /// Case-insensitive text matched against UID, name and description.
    pub query: String,
    /// Every pair must be present on a hit.
    pub labels: BTreeMap<String, String>,
    pub with_body: bool,
    pub with_labels: bool,
    pub with_fields: bool,
    pub limit: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub next_page_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_request_accepts_uid_casings() {
        let a: ReadObjectRequest =
            serde_json::from_str(r#"{"UID":"d1","kind":"dashboard","with_body":true}"#).unwrap();
        let b: ReadObjectRequest =
            serde_json::from_str(r#"{"uid":"d1","kind":"dashboard","with_body":true}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.coordinates(), ObjectCoordinates::new("dashboard", "d1"));
    }

    #[test]
    fn write_request_embedded_body() {
        let req: WriteObjectRequest = serde_json::from_str(
            r#"{"UID":"d1","kind":"dashboard","body":{"a": [1, 2]},"previous_version":"3"}"#,
        )
        .unwrap();
        assert_eq!(req.body, br#"{"a": [1, 2]}"#.to_vec());
        assert_eq!(req.previous_version, "3");
    }

    #[test]
    fn write_request_null_body_is_kept() {
        let req: WriteObjectRequest =
            serde_json::from_str(r#"{"UID":"d1","kind":"flag","body":null}"#).unwrap();
        assert_eq!(req.body, b"null");

        let req: WriteObjectRequest =
            serde_json::from_str(r#"{"UID":"d1","kind":"flag"}"#).unwrap();
        assert!(req.body.is_empty());
    }

    #[test]
    fn write_request_base64_body() {
        let req: WriteObjectRequest =
            serde_json::from_str(r#"{"UID":"d1","kind":"blob","body_base64":"/wAQ"}"#).unwrap();
        assert_eq!(req.body, vec![0xFF, 0x00, 0x10]);
    }

    #[test]
    fn write_request_rejects_both_bodies() {
        let err = serde_json::from_str::<WriteObjectRequest>(
            r#"{"UID":"d1","kind":"blob","body":1,"body_base64":"AQ=="}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn write_request_rejects_bad_base64() {
        assert!(serde_json::from_str::<WriteObjectRequest>(
            r#"{"UID":"d1","kind":"blob","body_base64":"***"}"#
        )
        .is_err());
    }

    #[test]
    fn search_request_defaults() {
        let req: ObjectSearchRequest = serde_json::from_str("{}").unwrap();
        assert!(req.kind.is_empty());
        assert_eq!(req.limit, 0);
        assert!(!req.with_body);
    }
}
