use std::collections::BTreeMap;
use std::io::Write;

use base64::Engine;

use crate::error::{CodecError, CodecResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScopeKind {
    Object,
    Array,
}

#[derive(Clone, Copy, Debug)]
struct Scope {
    kind: ScopeKind,
    /// Whether a member has already been written in this scope.
    written: bool,
}

/// Forward-only JSON writer.
///
/// Callers decide per field whether to emit it; the stream inserts the
/// `,` separator itself, based on whether anything was already written in
/// the enclosing object or array. Omitted fields therefore never leave a
/// stray separator behind.
///
/// Any I/O failure is returned immediately and the output must be treated
/// as unusable.
pub struct JsonStream<W: Write> {
    writer: W,
    scopes: Vec<Scope>,
}

impl<W: Write> JsonStream<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            scopes: Vec::new(),
        }
    }

    /// Number of currently open objects and arrays.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Recover the writer. Fails if an object or array is still open.
    pub fn into_inner(self) -> CodecResult<W> {
        if !self.scopes.is_empty() {
            return Err(CodecError::InvalidState("unterminated object or array"));
        }
        Ok(self.writer)
    }

    pub fn write_object_start(&mut self) -> CodecResult<()> {
        self.put(b"{")?;
        self.scopes.push(Scope {
            kind: ScopeKind::Object,
            written: false,
        });
        Ok(())
    }

    pub fn write_object_end(&mut self) -> CodecResult<()> {
        self.close(ScopeKind::Object)?;
        self.put(b"}")
    }

    pub fn write_array_start(&mut self) -> CodecResult<()> {
        self.put(b"[")?;
        self.scopes.push(Scope {
            kind: ScopeKind::Array,
            written: false,
        });
        Ok(())
    }

    pub fn write_array_end(&mut self) -> CodecResult<()> {
        self.close(ScopeKind::Array)?;
        self.put(b"]")
    }

    /// Write an object key, preceded by a separator when needed. The value
    /// must follow immediately.
    pub fn write_field(&mut self, name: &str) -> CodecResult<()> {
        self.separate(ScopeKind::Object)?;
        self.write_string(name)?;
        self.put(b":")
    }

    /// Mark the start of the next array element.
    pub fn write_element(&mut self) -> CodecResult<()> {
        self.separate(ScopeKind::Array)
    }

    pub fn write_string(&mut self, value: &str) -> CodecResult<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> CodecResult<()> {
        write!(self.writer, "{value}")?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> CodecResult<()> {
        self.put(if value { b"true" } else { b"false" })
    }

    pub fn write_null(&mut self) -> CodecResult<()> {
        self.put(b"null")
    }

    /// Splice bytes into the output as-is. The caller vouches that they
    /// form one complete JSON value.
    pub fn write_raw(&mut self, json: &[u8]) -> CodecResult<()> {
        self.put(json)
    }

    /// Write bytes as a standard (padded) base64 string.
    pub fn write_base64(&mut self, bytes: &[u8]) -> CodecResult<()> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.put(b"\"")?;
        self.put(encoded.as_bytes())?;
        self.put(b"\"")
    }

    /// Write a string map as a JSON object, keys in sorted order.
    pub fn write_string_map(&mut self, map: &BTreeMap<String, String>) -> CodecResult<()> {
        self.write_object_start()?;
        for (key, value) in map {
            self.write_field(key)?;
            self.write_string(value)?;
        }
        self.write_object_end()
    }

    pub fn flush(&mut self) -> CodecResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn separate(&mut self, expected: ScopeKind) -> CodecResult<()> {
        let scope = self
            .scopes
            .last_mut()
            .ok_or(CodecError::InvalidState("member written outside of a container"))?;
        if scope.kind != expected {
            return Err(CodecError::InvalidState(match expected {
                ScopeKind::Object => "object field written inside an array",
                ScopeKind::Array => "array element written inside an object",
            }));
        }
        let more = scope.written;
        scope.written = true;
        if more {
            self.put(b",")?;
        }
        Ok(())
    }

    fn close(&mut self, expected: ScopeKind) -> CodecResult<()> {
        match self.scopes.pop() {
            Some(scope) if scope.kind == expected => Ok(()),
            Some(_) => Err(CodecError::InvalidState("mismatched container end")),
            None => Err(CodecError::InvalidState("container end without start")),
        }
    }

    fn put(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }
}
