use std::io::Write;

use objstore_types::{
    BatchReadObjectResponse, BatchReadResult, DeleteObjectResponse, ObjectErrorInfo,
    ObjectHistoryResponse, ObjectSearchResponse, ObjectSearchResult, ObjectVersionInfo,
    RawObject, RawObjectSyncInfo, ReadObjectResponse, WriteObjectResponse,
};

use crate::body::BodyEncoding;
use crate::error::CodecResult;
use crate::keys;
use crate::stream::JsonStream;

/// A record with a fixed wire layout.
///
/// Implementations write their always-present fields first, then every
/// other field in declared order, skipping any field at its zero value.
pub trait WireEncode {
    fn encode<W: Write>(&self, stream: &mut JsonStream<W>) -> CodecResult<()>;
}

impl<T: WireEncode + ?Sized> WireEncode for &T {
    fn encode<W: Write>(&self, stream: &mut JsonStream<W>) -> CodecResult<()> {
        (**self).encode(stream)
    }
}

// ---------------------------------------------------------------------------
// Presence-checked field writers
// ---------------------------------------------------------------------------

fn string_field<W: Write>(s: &mut JsonStream<W>, key: &str, value: &str) -> CodecResult<()> {
    if value.is_empty() {
        return Ok(());
    }
    s.write_field(key)?;
    s.write_string(value)
}

fn i64_field<W: Write>(s: &mut JsonStream<W>, key: &str, value: i64) -> CodecResult<()> {
    if value == 0 {
        return Ok(());
    }
    s.write_field(key)?;
    s.write_i64(value)
}

/// Pre-serialized JSON, trusted as-is.
fn raw_field<W: Write>(s: &mut JsonStream<W>, key: &str, json: &[u8]) -> CodecResult<()> {
    if json.is_empty() {
        return Ok(());
    }
    s.write_field(key)?;
    s.write_raw(json)
}

fn body_field<W: Write>(s: &mut JsonStream<W>, body: &[u8]) -> CodecResult<()> {
    if body.is_empty() {
        return Ok(());
    }
    BodyEncoding::select(body).write_field(s)
}

fn nested_field<W: Write, T: WireEncode>(
    s: &mut JsonStream<W>,
    key: &str,
    value: Option<&T>,
) -> CodecResult<()> {
    match value {
        Some(value) => {
            s.write_field(key)?;
            value.encode(s)
        }
        None => Ok(()),
    }
}

fn array_field<W: Write, T: WireEncode>(
    s: &mut JsonStream<W>,
    key: &str,
    items: &[T],
) -> CodecResult<()> {
    s.write_field(key)?;
    s.write_array_start()?;
    for item in items {
        s.write_element()?;
        item.encode(s)?;
    }
    s.write_array_end()
}

// ---------------------------------------------------------------------------
// Core records
// ---------------------------------------------------------------------------

impl WireEncode for RawObject {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        s.write_object_start()?;
        s.write_field(keys::UID)?;
        s.write_string(&self.uid)?;

        string_field(s, keys::KIND, &self.kind)?;
        string_field(s, keys::VERSION, &self.version)?;
        i64_field(s, keys::UPDATED, self.updated)?;
        string_field(s, keys::UPDATED_BY, &self.updated_by)?;
        i64_field(s, keys::CREATED, self.created)?;
        string_field(s, keys::CREATED_BY, &self.created_by)?;
        body_field(s, &self.body)?;
        string_field(s, keys::ETAG, &self.etag)?;
        i64_field(s, keys::SIZE, self.size)?;
        nested_field(s, keys::SYNC, self.sync.as_ref())?;

        s.write_object_end()
    }
}

impl WireEncode for RawObjectSyncInfo {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        s.write_object_start()?;
        string_field(s, keys::SOURCE, &self.source)?;
        i64_field(s, keys::TIME, self.time)?;
        s.write_object_end()
    }
}

impl WireEncode for ObjectSearchResult {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        s.write_object_start()?;
        s.write_field(keys::UID)?;
        s.write_string(&self.uid)?;

        string_field(s, keys::KIND, &self.kind)?;
        string_field(s, keys::NAME, &self.name)?;
        string_field(s, keys::DESCRIPTION, &self.description)?;
        i64_field(s, keys::UPDATED, self.updated)?;
        string_field(s, keys::UPDATED_BY, &self.updated_by)?;
        body_field(s, &self.body)?;
        if let Some(labels) = &self.labels {
            s.write_field(keys::LABELS)?;
            s.write_string_map(labels)?;
        }
        raw_field(s, keys::ERROR, &self.error_json)?;
        raw_field(s, keys::FIELDS, &self.fields_json)?;

        s.write_object_end()
    }
}

impl WireEncode for ReadObjectResponse {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        s.write_object_start()?;
        // Present even without an object, as `null`.
        s.write_field(keys::OBJECT)?;
        match &self.object {
            Some(object) => object.encode(s)?,
            None => s.write_null()?,
        }
        raw_field(s, keys::SUMMARY, &self.summary_json)?;
        s.write_object_end()
    }
}

impl WireEncode for WriteObjectResponse {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        s.write_object_start()?;
        s.write_field(keys::STATUS)?;
        s.write_string(self.status.as_str())?;

        nested_field(s, keys::ERROR, self.error.as_ref())?;
        nested_field(s, keys::OBJECT, self.object.as_ref())?;
        raw_field(s, keys::SUMMARY, &self.summary_json)?;

        s.write_object_end()
    }
}

// ---------------------------------------------------------------------------
// Supporting records
// ---------------------------------------------------------------------------

impl WireEncode for ObjectErrorInfo {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        s.write_object_start()?;
        i64_field(s, keys::CODE, self.code)?;
        string_field(s, keys::MESSAGE, &self.message)?;
        raw_field(s, keys::DETAILS, &self.details_json)?;
        s.write_object_end()
    }
}

impl WireEncode for BatchReadResult {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        match self {
            Self::Found(response) => response.encode(s),
            Self::Failed(error) => {
                s.write_object_start()?;
                s.write_field(keys::OBJECT)?;
                s.write_null()?;
                s.write_field(keys::ERROR)?;
                error.encode(s)?;
                s.write_object_end()
            }
        }
    }
}

impl WireEncode for BatchReadObjectResponse {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        s.write_object_start()?;
        array_field(s, keys::RESULTS, &self.results)?;
        s.write_object_end()
    }
}

impl WireEncode for DeleteObjectResponse {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        s.write_object_start()?;
        s.write_field(keys::STATUS)?;
        s.write_string(self.status.as_str())?;
        nested_field(s, keys::ERROR, self.error.as_ref())?;
        s.write_object_end()
    }
}

impl WireEncode for ObjectVersionInfo {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        s.write_object_start()?;
        s.write_field(keys::VERSION)?;
        s.write_string(&self.version)?;
        i64_field(s, keys::UPDATED, self.updated)?;
        string_field(s, keys::UPDATED_BY_SNAKE, &self.updated_by)?;
        i64_field(s, keys::SIZE, self.size)?;
        string_field(s, keys::ETAG, &self.etag)?;
        string_field(s, keys::COMMENT, &self.comment)?;
        s.write_object_end()
    }
}

impl WireEncode for ObjectHistoryResponse {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        s.write_object_start()?;
        s.write_field(keys::UID)?;
        s.write_string(&self.uid)?;
        string_field(s, keys::KIND, &self.kind)?;
        array_field(s, keys::VERSIONS, &self.versions)?;
        string_field(s, keys::NEXT_PAGE_TOKEN, &self.next_page_token)?;
        s.write_object_end()
    }
}

impl WireEncode for ObjectSearchResponse {
    fn encode<W: Write>(&self, s: &mut JsonStream<W>) -> CodecResult<()> {
        s.write_object_start()?;
        array_field(s, keys::RESULTS, &self.results)?;
        string_field(s, keys::NEXT_PAGE_TOKEN, &self.next_page_token)?;
        s.write_object_end()
    }
}
