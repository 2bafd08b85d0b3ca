//! Data model for the object store protocol.
//!
//! These are the value records that cross the wire: they are built by the
//! store layer for one request, encoded once by `objstore-codec`, then
//! dropped. Nothing here knows about JSON layout; the field-presence and
//! body-encoding rules live in the codec.
//!
//! # Key Types
//!
//! - [`RawObject`] -- a stored, versioned object with metadata and body
//! - [`ObjectSearchResult`] -- one search hit, value or per-hit error
//! - [`ReadObjectResponse`] / [`WriteObjectResponse`] -- single-object outcomes
//! - [`WriteStatus`] / [`DeleteStatus`] -- outcomes carried by name
//! - Request records for the six service operations

pub mod error;
pub mod object;
pub mod request;
pub mod response;
pub mod search;

pub use error::TypeError;
pub use object::{ObjectCoordinates, RawObject, RawObjectSyncInfo, MAX_KIND_LEN, MAX_UID_LEN};
pub use request::{
    BatchReadObjectRequest, DeleteObjectRequest, ObjectHistoryRequest, ObjectSearchRequest,
    ReadObjectRequest, WriteObjectRequest,
};
pub use response::{
    BatchReadObjectResponse, BatchReadResult, DeleteObjectResponse, DeleteStatus,
    ObjectErrorInfo, ObjectHistoryResponse, ObjectSearchResponse, ObjectVersionInfo,
    ReadObjectResponse, WriteObjectResponse, WriteStatus,
};
pub use search::ObjectSearchResult;
