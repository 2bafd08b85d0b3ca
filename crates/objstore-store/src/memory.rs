use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::RwLock;

use objstore_types::{ObjectCoordinates, RawObject};

use crate::error::{StoreError, StoreResult};
use crate::etag::EtagHasher;
use crate::summary::ObjectSummary;
use crate::traits::{
    DeleteOutcome, HistoryPage, ObjectStore, PutOutcome, PutRequest, SearchPage, SearchQuery,
    StoredObject,
};

/// All versions of one object, oldest first. Never empty.
#[derive(Debug)]
struct ObjectEntry {
    versions: Vec<StoredObject>,
}

impl ObjectEntry {
    fn latest(&self) -> &StoredObject {
        // Entries are created with one version and never shrink.
        &self.versions[self.versions.len() - 1]
    }
}

/// In-memory, BTreeMap-based versioned store.
///
/// Intended for tests and embedding. All objects are held in memory behind a
/// `RwLock` for safe concurrent access. Map order is `(kind, UID)`, which is
/// also the search order.
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<ObjectCoordinates, ObjectEntry>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Number of versions kept for one object.
    pub fn version_count(&self, coordinates: &ObjectCoordinates) -> usize {
        self.objects
            .read()
            .expect("lock poisoned")
            .get(coordinates)
            .map_or(0, |entry| entry.versions.len())
    }

    /// Remove all objects from the store.
    pub fn clear(&self) {
        self.objects.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn build_version(
    request: &PutRequest,
    version: u64,
    etag: String,
    previous: Option<&RawObject>,
) -> StoredObject {
    let now = now_millis();
    let (created, created_by) = match previous {
        Some(prev) => (prev.created, prev.created_by.clone()),
        None => (now, request.identity.clone()),
    };
    StoredObject {
        object: RawObject {
            uid: request.coordinates.uid.clone(),
            kind: request.coordinates.kind.clone(),
            version: version.to_string(),
            created,
            updated: now,
            created_by,
            updated_by: request.identity.clone(),
            body: request.body.clone(),
            etag,
            size: request.body.len() as i64,
            sync: None,
        },
        comment: request.comment.clone(),
        summary: ObjectSummary::extract(&request.body),
    }
}

/// Why the preconditions in `request` reject `current`, if they do.
fn precondition_failure(request: &PutRequest, current: &RawObject) -> Option<String> {
    if !request.previous_version.is_empty() && request.previous_version != current.version {
        return Some(format!(
            "expected version {}, current version is {}",
            request.previous_version, current.version
        ));
    }
    if !request.previous_etag.is_empty() && request.previous_etag != current.etag {
        return Some(format!(
            "expected etag {}, current etag is {}",
            request.previous_etag, current.etag
        ));
    }
    None
}

fn parse_page_token(token: Option<&str>) -> StoreResult<usize> {
    match token {
        None | Some("") => Ok(0),
        Some(t) => t
            .parse::<usize>()
            .map_err(|_| StoreError::InvalidPageToken(t.to_string())),
    }
}

/// Cut one page out of `items`. A `limit` of zero takes everything left.
fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> (Vec<T>, Option<String>) {
    let total = items.len();
    let take = if limit == 0 { total } else { limit };
    let page: Vec<T> = items.into_iter().skip(offset).take(take).collect();
    let end = offset.saturating_add(page.len());
    let next = (end < total).then(|| end.to_string());
    (page, next)
}

fn matches_query(hit: &StoredObject, query: &SearchQuery, needle: &str) -> bool {
    if !query.kinds.is_empty() && !query.kinds.iter().any(|k| *k == hit.object.kind) {
        return false;
    }
    let labels_ok = query
        .labels
        .iter()
        .all(|(key, value)| hit.summary.labels.get(key) == Some(value));
    if !labels_ok {
        return false;
    }
    needle.is_empty()
        || hit.object.uid.to_lowercase().contains(needle)
        || hit.summary.matches_text(needle)
}

impl ObjectStore for InMemoryObjectStore {
    fn get_object(
        &self,
        coordinates: &ObjectCoordinates,
        version: Option<&str>,
    ) -> StoreResult<Option<StoredObject>> {
        let map = self.objects.read().expect("lock poisoned");
        let Some(entry) = map.get(coordinates) else {
            return Ok(None);
        };
        Ok(match version {
            None | Some("") => Some(entry.latest().clone()),
            Some(v) => entry
                .versions
                .iter()
                .find(|stored| stored.object.version == v)
                .cloned(),
        })
    }

    fn put_object(&self, request: PutRequest) -> StoreResult<PutOutcome> {
        let etag = EtagHasher::BODY.etag(&request.body);
        let mut map = self.objects.write().expect("lock poisoned");

        let mut entry = match map.entry(request.coordinates.clone()) {
            Entry::Occupied(entry) => entry,
            Entry::Vacant(slot) => {
                if !request.previous_version.is_empty() || !request.previous_etag.is_empty() {
                    return Ok(PutOutcome::Conflict {
                        current: None,
                        reason: format!("{} does not exist", request.coordinates),
                    });
                }
                let stored = build_version(&request, 1, etag, None);
                tracing::debug!(object = %request.coordinates, "created object");
                slot.insert(ObjectEntry {
                    versions: vec![stored.clone()],
                });
                return Ok(PutOutcome::Created(stored));
            }
        };

        let current = entry.get().latest();
        if let Some(reason) = precondition_failure(&request, &current.object) {
            tracing::debug!(object = %request.coordinates, %reason, "write precondition failed");
            return Ok(PutOutcome::Conflict {
                current: Some(current.clone()),
                reason,
            });
        }
        if current.object.etag == etag {
            return Ok(PutOutcome::Unchanged(current.clone()));
        }

        let next_version = current
            .object
            .version
            .parse::<u64>()
            .map_err(|_| StoreError::CorruptObject {
                coordinates: request.coordinates.clone(),
                reason: format!("non-numeric version {:?}", current.object.version),
            })?
            + 1;
        let stored = build_version(&request, next_version, etag, Some(&current.object));
        tracing::debug!(object = %request.coordinates, version = next_version, "updated object");
        entry.get_mut().versions.push(stored.clone());
        Ok(PutOutcome::Updated(stored))
    }

    fn delete_object(
        &self,
        coordinates: &ObjectCoordinates,
        previous_version: Option<&str>,
    ) -> StoreResult<DeleteOutcome> {
        let mut map = self.objects.write().expect("lock poisoned");
        let Some(entry) = map.get(coordinates) else {
            return Ok(DeleteOutcome::NotFound);
        };
        let current = entry.latest();
        if let Some(expected) = previous_version.filter(|v| !v.is_empty()) {
            if expected != current.object.version {
                return Ok(DeleteOutcome::Conflict {
                    current: current.clone(),
                    reason: format!(
                        "expected version {expected}, current version is {}",
                        current.object.version
                    ),
                });
            }
        }
        map.remove(coordinates);
        tracing::debug!(object = %coordinates, "deleted object");
        Ok(DeleteOutcome::Deleted)
    }

    fn list_history(
        &self,
        coordinates: &ObjectCoordinates,
        limit: usize,
        page_token: Option<&str>,
    ) -> StoreResult<Option<HistoryPage>> {
        let offset = parse_page_token(page_token)?;
        let map = self.objects.read().expect("lock poisoned");
        let Some(entry) = map.get(coordinates) else {
            return Ok(None);
        };
        let newest_first = entry
            .versions
            .iter()
            .rev()
            .map(StoredObject::version_info)
            .collect();
        let (versions, next_page_token) = paginate(newest_first, offset, limit);
        Ok(Some(HistoryPage {
            versions,
            next_page_token,
        }))
    }

    fn search_objects(&self, query: &SearchQuery) -> StoreResult<SearchPage> {
        let offset = parse_page_token(query.page_token.as_deref())?;
        let needle = query.text.to_lowercase();
        let map = self.objects.read().expect("lock poisoned");
        let matching = map
            .values()
            .map(ObjectEntry::latest)
            .filter(|hit| matches_query(hit, query, &needle))
            .cloned()
            .collect();
        let (hits, next_page_token) = paginate(matching, offset, query.limit);
        Ok(SearchPage {
            hits,
            next_page_token,
        })
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}
