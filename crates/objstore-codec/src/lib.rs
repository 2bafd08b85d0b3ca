//! Wire encoding for the object store protocol.
//!
//! Records are written as JSON with two departures from plain field-by-field
//! marshaling:
//!
//! 1. **Skip-if-default.** Apart from a record's always-present fields, a
//!    field is written only when it differs from its zero value (empty
//!    string or bytes, `0`, `None`). No `null`, no empty placeholders.
//! 2. **Dual body encoding.** A body that is valid JSON is spliced in
//!    unescaped under `body`; any other body is written as base64 under
//!    `body_base64`. Exactly one of the two keys appears.
//!
//! Key names and key order are fixed; see [`keys`].
//!
//! # Example
//!
//! ```
//! use objstore_codec::ObjectCodec;
//! use objstore_types::RawObject;
//!
//! let obj = RawObject::new("d1", "dashboard").with_body(br#"{"a":1}"#.to_vec());
//! let json = ObjectCodec::encode(&obj).unwrap();
//! assert_eq!(json, br#"{"UID":"d1","kind":"dashboard","body":{"a":1},"size":7}"#);
//! ```

pub mod body;
pub mod codec;
pub mod decode;
pub mod encode;
pub mod error;
pub mod keys;
pub mod stream;

pub use body::{is_valid_json, BodyEncoding};
pub use codec::ObjectCodec;
pub use encode::WireEncode;
pub use error::{CodecError, CodecResult};
pub use stream::JsonStream;
