use std::io::Write;

use serde::de::IgnoredAny;

use crate::error::CodecResult;
use crate::keys;
use crate::stream::JsonStream;

/// How a body is carried on the wire, decided per value at encode time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyEncoding<'a> {
    /// Valid JSON text, spliced unescaped under `body`.
    EmbeddedJson(&'a [u8]),
    /// Anything else, as a base64 string under `body_base64`.
    Base64(&'a [u8]),
}

impl<'a> BodyEncoding<'a> {
    pub fn select(body: &'a [u8]) -> Self {
        if is_valid_json(body) {
            Self::EmbeddedJson(body)
        } else {
            tracing::trace!(len = body.len(), "body is not JSON, using base64");
            Self::Base64(body)
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::EmbeddedJson(_) => keys::BODY,
            Self::Base64(_) => keys::BODY_BASE64,
        }
    }

    /// Write the key and value for this body.
    pub fn write_field<W: Write>(&self, stream: &mut JsonStream<W>) -> CodecResult<()> {
        stream.write_field(self.key())?;
        match self {
            Self::EmbeddedJson(json) => stream.write_raw(json),
            Self::Base64(bytes) => stream.write_base64(bytes),
        }
    }
}

/// Syntactic check: is `bytes` exactly one JSON value, optionally padded
/// with whitespace, in valid UTF-8?
///
/// The payload is walked but never materialized or interpreted.
pub fn is_valid_json(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok() && serde_json::from_slice::<IgnoredAny>(bytes).is_ok()
}
