use std::collections::BTreeMap;

use objstore_types::{ObjectCoordinates, ObjectVersionInfo, RawObject};

use crate::error::StoreResult;
use crate::summary::ObjectSummary;

/// One stored version of an object.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredObject {
    pub object: RawObject,
    /// Note supplied by the writer of this version.
    pub comment: String,
    pub summary: ObjectSummary,
}

impl StoredObject {
    pub fn version_info(&self) -> ObjectVersionInfo {
        ObjectVersionInfo {
            version: self.object.version.clone(),
            updated: self.object.updated,
            updated_by: self.object.updated_by.clone(),
            size: self.object.size,
            etag: self.object.etag.clone(),
            comment: self.comment.clone(),
        }
    }
}

/// A write handed to the store. Preconditions are checked against the
/// latest version; an empty precondition is not checked.
#[derive(Clone, Debug, Default)]
pub struct PutRequest {
    pub coordinates: ObjectCoordinates,
    pub body: Vec<u8>,
    pub comment: String,
    /// Identity recorded as `created_by` / `updated_by`.
    pub identity: String,
    pub previous_version: String,
    pub previous_etag: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PutOutcome {
    Created(StoredObject),
    Updated(StoredObject),
    /// Same body as the latest version; no version was added.
    Unchanged(StoredObject),
    /// A precondition failed; nothing was written. `current` is `None`
    /// when the object does not exist at all.
    Conflict {
        current: Option<StoredObject>,
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Conflict { current: StoredObject, reason: String },
}

/// A page of an object's versions, newest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryPage {
    pub versions: Vec<ObjectVersionInfo>,
    pub next_page_token: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SearchQuery {
    /// Empty matches every kind.
    pub kinds: Vec<String>,
    /// Case-insensitive substring of UID, name or description.
    pub text: String,
    /// All pairs must be present in a hit's labels.
    pub labels: BTreeMap<String, String>,
    pub limit: usize,
    pub page_token: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchPage {
    /// Latest version of each matching object.
    pub hits: Vec<StoredObject>,
    pub next_page_token: Option<String>,
}

/// Versioned object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are addressed by `(kind, UID)` and keep every version.
/// - Versions are immutable once written; a write adds a version or fails.
/// - Preconditions are checked and applied atomically with the write.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read the latest version, or a specific one.
    ///
    /// Returns `Ok(None)` if the object or version does not exist.
    fn get_object(
        &self,
        coordinates: &ObjectCoordinates,
        version: Option<&str>,
    ) -> StoreResult<Option<StoredObject>>;

    /// Write a new version, subject to the request's preconditions.
    fn put_object(&self, request: PutRequest) -> StoreResult<PutOutcome>;

    /// Delete an object with all of its history.
    fn delete_object(
        &self,
        coordinates: &ObjectCoordinates,
        previous_version: Option<&str>,
    ) -> StoreResult<DeleteOutcome>;

    /// List versions, newest first.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn list_history(
        &self,
        coordinates: &ObjectCoordinates,
        limit: usize,
        page_token: Option<&str>,
    ) -> StoreResult<Option<HistoryPage>>;

    /// Find objects matching a query, ordered by kind then UID.
    fn search_objects(&self, query: &SearchQuery) -> StoreResult<SearchPage>;
}
