//! Parse the wire form back into records.
//!
//! Absent keys decode to zero values. An embedded `body` is recovered as
//! the exact JSON text that was spliced in; `body_base64` is decoded.

use std::collections::BTreeMap;

use base64::Engine;
use serde::Deserialize;
use serde_json::value::RawValue;

use objstore_types::{
    ObjectErrorInfo, ObjectSearchResult, RawObject, RawObjectSyncInfo, ReadObjectResponse,
    WriteObjectResponse, WriteStatus,
};

use crate::error::{CodecError, CodecResult};

#[derive(Deserialize)]
struct RawObjectWire {
    #[serde(rename = "UID")]
    uid: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    updated: i64,
    #[serde(default, rename = "updatedBy")]
    updated_by: String,
    #[serde(default)]
    created: i64,
    #[serde(default, rename = "createdBy")]
    created_by: String,
    #[serde(default, deserialize_with = "present")]
    body: Option<Box<RawValue>>,
    #[serde(default)]
    body_base64: Option<String>,
    #[serde(default)]
    etag: String,
    #[serde(default)]
    size: i64,
    #[serde(default)]
    sync: Option<SyncWire>,
}

#[derive(Deserialize)]
struct SyncWire {
    #[serde(default)]
    source: String,
    #[serde(default)]
    time: i64,
}

#[derive(Deserialize)]
struct ErrorInfoWire {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default, deserialize_with = "present")]
    details: Option<Box<RawValue>>,
}

#[derive(Deserialize)]
struct SearchResultWire {
    #[serde(rename = "UID")]
    uid: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    updated: i64,
    #[serde(default, rename = "updatedBy")]
    updated_by: String,
    #[serde(default, deserialize_with = "present")]
    body: Option<Box<RawValue>>,
    #[serde(default)]
    body_base64: Option<String>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
    #[serde(default, deserialize_with = "present")]
    error: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "present")]
    fields: Option<Box<RawValue>>,
}

#[derive(Deserialize)]
struct ReadResponseWire {
    object: Option<RawObjectWire>,
    #[serde(default, deserialize_with = "present")]
    summary: Option<Box<RawValue>>,
}

#[derive(Deserialize)]
struct WriteResponseWire {
    status: String,
    #[serde(default)]
    error: Option<ErrorInfoWire>,
    #[serde(default)]
    object: Option<RawObjectWire>,
    #[serde(default, deserialize_with = "present")]
    summary: Option<Box<RawValue>>,
}

/// A key that is present keeps its raw text, `null` included. Only a
/// missing key falls back to `None` through `#[serde(default)]`.
fn present<'de, D>(deserializer: D) -> Result<Option<Box<RawValue>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

fn parse<'a, T: Deserialize<'a>>(data: &'a [u8]) -> CodecResult<T> {
    serde_json::from_slice(data).map_err(|e| CodecError::Deserialization(e.to_string()))
}

fn raw_bytes(raw: Option<Box<RawValue>>) -> Vec<u8> {
    raw.map(|v| v.get().as_bytes().to_vec()).unwrap_or_default()
}

fn body_bytes(body: Option<Box<RawValue>>, body_base64: Option<String>) -> CodecResult<Vec<u8>> {
    match (body, body_base64) {
        (Some(_), Some(_)) => Err(CodecError::InvalidField {
            field: "body",
            reason: "both `body` and `body_base64` present".into(),
        }),
        (Some(raw), None) => Ok(raw.get().as_bytes().to_vec()),
        (None, Some(encoded)) => base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| CodecError::InvalidField {
                field: "body_base64",
                reason: e.to_string(),
            }),
        (None, None) => Ok(Vec::new()),
    }
}

impl TryFrom<RawObjectWire> for RawObject {
    type Error = CodecError;

    fn try_from(wire: RawObjectWire) -> CodecResult<Self> {
        Ok(Self {
            uid: wire.uid,
            kind: wire.kind,
            version: wire.version,
            created: wire.created,
            updated: wire.updated,
            created_by: wire.created_by,
            updated_by: wire.updated_by,
            body: body_bytes(wire.body, wire.body_base64)?,
            etag: wire.etag,
            size: wire.size,
            sync: wire.sync.map(|s| RawObjectSyncInfo {
                source: s.source,
                time: s.time,
            }),
        })
    }
}

impl From<ErrorInfoWire> for ObjectErrorInfo {
    fn from(wire: ErrorInfoWire) -> Self {
        Self {
            code: wire.code,
            message: wire.message,
            details_json: raw_bytes(wire.details),
        }
    }
}

pub fn decode_raw_object(data: &[u8]) -> CodecResult<RawObject> {
    parse::<RawObjectWire>(data)?.try_into()
}

pub fn decode_search_result(data: &[u8]) -> CodecResult<ObjectSearchResult> {
    let wire: SearchResultWire = parse(data)?;
    Ok(ObjectSearchResult {
        uid: wire.uid,
        kind: wire.kind,
        name: wire.name,
        description: wire.description,
        updated: wire.updated,
        updated_by: wire.updated_by,
        body: body_bytes(wire.body, wire.body_base64)?,
        labels: wire.labels,
        error_json: raw_bytes(wire.error),
        fields_json: raw_bytes(wire.fields),
    })
}

pub fn decode_read_response(data: &[u8]) -> CodecResult<ReadObjectResponse> {
    let wire: ReadResponseWire = parse(data)?;
    Ok(ReadObjectResponse {
        object: wire.object.map(RawObject::try_from).transpose()?,
        summary_json: raw_bytes(wire.summary),
    })
}

pub fn decode_write_response(data: &[u8]) -> CodecResult<WriteObjectResponse> {
    let wire: WriteResponseWire = parse(data)?;
    let status = wire
        .status
        .parse::<WriteStatus>()
        .map_err(|e| CodecError::InvalidField {
            field: "status",
            reason: e.to_string(),
        })?;
    Ok(WriteObjectResponse {
        status,
        error: wire.error.map(ObjectErrorInfo::from),
        object: wire.object.map(RawObject::try_from).transpose()?,
        summary_json: raw_bytes(wire.summary),
    })
}
