use std::sync::Arc;

use async_trait::async_trait;
use objstore_codec::ObjectCodec;
use objstore_store::{DeleteOutcome, ObjectStore, PutOutcome, PutRequest, SearchQuery, StoredObject};
use objstore_types::{
    BatchReadObjectRequest, BatchReadObjectResponse, BatchReadResult, DeleteObjectRequest,
    DeleteObjectResponse, DeleteStatus, ObjectCoordinates, ObjectHistoryRequest,
    ObjectHistoryResponse, ObjectSearchRequest, ObjectSearchResponse, ObjectSearchResult,
    ReadObjectRequest, ReadObjectResponse, WriteObjectRequest, WriteObjectResponse, WriteStatus,
};

use crate::auth::{Action, AuthProvider, Identity};
use crate::config::ServerConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::service::ObjectStoreService;

/// Request limits taken from the server configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceLimits {
    pub max_batch_size: usize,
    pub default_history_limit: usize,
    pub max_history_limit: usize,
    pub default_search_limit: usize,
    pub max_search_limit: usize,
}

impl From<&ServerConfig> for ServiceLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_batch_size: config.max_batch_size,
            default_history_limit: config.default_history_limit,
            max_history_limit: config.max_history_limit,
            default_search_limit: config.default_search_limit,
            max_search_limit: config.max_search_limit,
        }
    }
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

/// A non-positive request limit takes the default; anything else is capped.
fn effective_limit(requested: i64, default: usize, max: usize) -> usize {
    if requested <= 0 {
        return default;
    }
    usize::try_from(requested).map_or(max, |n| n.min(max))
}

fn page_token(token: &str) -> Option<&str> {
    (!token.is_empty()).then_some(token)
}

/// [`ObjectStoreService`] on top of an [`ObjectStore`] and an
/// [`AuthProvider`].
pub struct StoreService<S> {
    store: S,
    auth: Arc<dyn AuthProvider>,
    limits: ServiceLimits,
}

impl<S: ObjectStore> StoreService<S> {
    pub fn new(store: S, auth: Arc<dyn AuthProvider>, limits: ServiceLimits) -> Self {
        Self { store, auth, limits }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn limits(&self) -> &ServiceLimits {
        &self.limits
    }

    async fn require(&self, identity: &Identity, action: Action) -> ServiceResult<()> {
        if self.auth.authorize(identity, &action).await? {
            return Ok(());
        }
        tracing::debug!(identity = %identity.name, %action, "permission denied");
        Err(ServiceError::PermissionDenied {
            identity: identity.name.clone(),
            action: action.to_string(),
        })
    }

    async fn read_one(
        &self,
        identity: &Identity,
        request: &ReadObjectRequest,
    ) -> ServiceResult<ReadObjectResponse> {
        let coordinates = request.coordinates();
        coordinates.validate()?;
        self.require(identity, Action::Read { coordinates: coordinates.clone() }).await?;

        let stored = self
            .store
            .get_object(&coordinates, page_token(&request.version))?
            .ok_or(ServiceError::NotFound(coordinates))?;
        let summary_json = if request.with_summary {
            stored.summary.to_json()?
        } else {
            Vec::new()
        };
        let object = if request.with_body {
            stored.object
        } else {
            stored.object.without_body()
        };
        Ok(ReadObjectResponse { object: Some(object), summary_json })
    }

    async fn try_write(
        &self,
        identity: &Identity,
        request: WriteObjectRequest,
    ) -> ServiceResult<WriteObjectResponse> {
        let coordinates = request.coordinates();
        coordinates.validate()?;
        if request.body.is_empty() {
            return Err(ServiceError::InvalidInput("body is required".into()));
        }
        self.require(identity, Action::Write { coordinates: coordinates.clone() }).await?;

        let outcome = self.store.put_object(PutRequest {
            coordinates: coordinates.clone(),
            body: request.body,
            comment: request.comment,
            identity: identity.name.clone(),
            previous_version: request.previous_version,
            previous_etag: request.previous_etag,
        })?;
        let (status, stored) = match outcome {
            PutOutcome::Created(stored) => (WriteStatus::Created, stored),
            PutOutcome::Updated(stored) => (WriteStatus::Updated, stored),
            PutOutcome::Unchanged(stored) => (WriteStatus::Unchanged, stored),
            PutOutcome::Conflict { current, reason } => {
                let error = ServiceError::Conflict { coordinates, reason }.to_error_info();
                return Ok(match current {
                    Some(current) => WriteObjectResponse::conflict(current.object, error),
                    None => WriteObjectResponse {
                        status: WriteStatus::Conflict,
                        error: Some(error),
                        ..Default::default()
                    },
                });
            }
        };
        Ok(WriteObjectResponse {
            status,
            error: None,
            summary_json: stored.summary.to_json()?,
            object: Some(stored.object.without_body()),
        })
    }

    async fn try_delete(
        &self,
        identity: &Identity,
        request: DeleteObjectRequest,
    ) -> ServiceResult<DeleteObjectResponse> {
        let coordinates = request.coordinates();
        coordinates.validate()?;
        self.require(identity, Action::Delete { coordinates: coordinates.clone() }).await?;

        Ok(match self.store.delete_object(&coordinates, page_token(&request.previous_version))? {
            DeleteOutcome::Deleted => DeleteObjectResponse::with_status(DeleteStatus::Deleted),
            DeleteOutcome::NotFound => DeleteObjectResponse::with_status(DeleteStatus::NotFound),
            DeleteOutcome::Conflict { reason, .. } => DeleteObjectResponse {
                status: DeleteStatus::Conflict,
                error: Some(ServiceError::Conflict { coordinates, reason }.to_error_info()),
            },
        })
    }

    /// Resolve one search hit, or turn it into an error slot when the
    /// caller may not read it.
    async fn search_hit(
        &self,
        identity: &Identity,
        request: &ObjectSearchRequest,
        hit: StoredObject,
    ) -> ServiceResult<ObjectSearchResult> {
        let coordinates = hit.object.coordinates();
        if let Err(err) = self.require(identity, Action::Read { coordinates }).await {
            let error_json = ObjectCodec::encode(&err.to_error_info())?;
            let hit = ObjectSearchResult::new(hit.object.uid, hit.object.kind);
            return Ok(hit.into_error(error_json));
        }

        let StoredObject { object, summary, .. } = hit;
        let fields_json = if request.with_fields { summary.fields_json()? } else { Vec::new() };
        let labels = (request.with_labels && !summary.labels.is_empty()).then_some(summary.labels);
        Ok(ObjectSearchResult {
            uid: object.uid,
            kind: object.kind,
            name: summary.name,
            description: summary.description,
            updated: object.updated,
            updated_by: object.updated_by,
            body: if request.with_body { object.body } else { Vec::new() },
            labels,
            error_json: Vec::new(),
            fields_json,
        })
    }
}

#[async_trait]
impl<S: ObjectStore> ObjectStoreService for StoreService<S> {
    async fn read(
        &self,
        identity: &Identity,
        request: ReadObjectRequest,
    ) -> ServiceResult<ReadObjectResponse> {
        let result = self.read_one(identity, &request).await;
        match &result {
            Ok(_) => tracing::debug!(uid = %request.uid, kind = %request.kind, "read"),
            Err(err) => {
                tracing::debug!(uid = %request.uid, kind = %request.kind, %err, "read failed")
            }
        }
        result
    }

    async fn batch_read(
        &self,
        identity: &Identity,
        request: BatchReadObjectRequest,
    ) -> ServiceResult<BatchReadObjectResponse> {
        if request.batch.len() > self.limits.max_batch_size {
            return Err(ServiceError::InvalidInput(format!(
                "batch of {} exceeds the limit of {}",
                request.batch.len(),
                self.limits.max_batch_size
            )));
        }
        let mut results = Vec::with_capacity(request.batch.len());
        for item in &request.batch {
            results.push(match self.read_one(identity, item).await {
                Ok(found) => BatchReadResult::Found(found),
                Err(err) => {
                    tracing::debug!(uid = %item.uid, kind = %item.kind, %err, "batch slot failed");
                    BatchReadResult::Failed(err.to_error_info())
                }
            });
        }
        tracing::debug!(count = results.len(), "batch read");
        Ok(BatchReadObjectResponse { results })
    }

    async fn write(&self, identity: &Identity, request: WriteObjectRequest) -> WriteObjectResponse {
        let (uid, kind) = (request.uid.clone(), request.kind.clone());
        match self.try_write(identity, request).await {
            Ok(response) => {
                tracing::info!(
                    %uid,
                    %kind,
                    status = %response.status,
                    identity = %identity.name,
                    "write"
                );
                response
            }
            Err(err) => {
                tracing::warn!(%uid, %kind, %err, "write failed");
                WriteObjectResponse::error(err.to_error_info())
            }
        }
    }

    async fn delete(
        &self,
        identity: &Identity,
        request: DeleteObjectRequest,
    ) -> DeleteObjectResponse {
        let (uid, kind) = (request.uid.clone(), request.kind.clone());
        match self.try_delete(identity, request).await {
            Ok(response) => {
                tracing::info!(
                    %uid,
                    %kind,
                    status = %response.status,
                    identity = %identity.name,
                    "delete"
                );
                response
            }
            Err(err) => {
                tracing::warn!(%uid, %kind, %err, "delete failed");
                DeleteObjectResponse {
                    status: DeleteStatus::Error,
                    error: Some(err.to_error_info()),
                }
            }
        }
    }

    async fn history(
        &self,
        identity: &Identity,
        request: ObjectHistoryRequest,
    ) -> ServiceResult<ObjectHistoryResponse> {
        let coordinates = request.coordinates();
        coordinates.validate()?;
        self.require(identity, Action::Read { coordinates: coordinates.clone() }).await?;

        let limit = effective_limit(
            request.limit,
            self.limits.default_history_limit,
            self.limits.max_history_limit,
        );
        let page = self
            .store
            .list_history(&coordinates, limit, page_token(&request.next_page_token))?
            .ok_or_else(|| ServiceError::NotFound(coordinates.clone()))?;
        tracing::debug!(object = %coordinates, count = page.versions.len(), "history");

        let ObjectCoordinates { kind, uid } = coordinates;
        Ok(ObjectHistoryResponse {
            uid,
            kind,
            versions: page.versions,
            next_page_token: page.next_page_token.unwrap_or_default(),
        })
    }

    async fn search(
        &self,
        identity: &Identity,
        request: ObjectSearchRequest,
    ) -> ServiceResult<ObjectSearchResponse> {
        if request.kind.iter().any(String::is_empty) {
            return Err(ServiceError::InvalidInput("empty kind in search filter".into()));
        }
        self.require(identity, Action::Search { kinds: request.kind.clone() }).await?;

        let query = SearchQuery {
            kinds: request.kind.clone(),
            text: request.query.clone(),
            labels: request.labels.clone(),
            limit: effective_limit(
                request.limit,
                self.limits.default_search_limit,
                self.limits.max_search_limit,
            ),
            page_token: page_token(&request.next_page_token).map(str::to_string),
        };
        let page = self.store.search_objects(&query)?;

        let mut results = Vec::with_capacity(page.hits.len());
        for hit in page.hits {
            results.push(self.search_hit(identity, &request, hit).await?);
        }
        tracing::debug!(
            query = %request.query,
            count = results.len(),
            denied = results.iter().filter(|r| r.is_error()).count(),
            "search"
        );
        Ok(ObjectSearchResponse {
            results,
            next_page_token: page.next_page_token.unwrap_or_default(),
        })
    }
}
