use async_trait::async_trait;
use objstore_types::{
    BatchReadObjectRequest, BatchReadObjectResponse, DeleteObjectRequest, DeleteObjectResponse,
    ObjectHistoryRequest, ObjectHistoryResponse, ObjectSearchRequest, ObjectSearchResponse,
    ReadObjectRequest, ReadObjectResponse, WriteObjectRequest, WriteObjectResponse,
};

use crate::auth::Identity;
use crate::error::ServiceResult;

/// The six operations of the object store service.
///
/// Read, History and Search fail the whole call when the object (or the
/// query) cannot be resolved. BatchRead and Search report per-item
/// problems inside the matching result slot instead. Write and Delete never
/// fail as a call: their outcome, including errors, is carried in the
/// response status.
#[async_trait]
pub trait ObjectStoreService: Send + Sync {
    async fn read(
        &self,
        identity: &Identity,
        request: ReadObjectRequest,
    ) -> ServiceResult<ReadObjectResponse>;

    /// Results are positionally matched to `request.batch`.
    async fn batch_read(
        &self,
        identity: &Identity,
        request: BatchReadObjectRequest,
    ) -> ServiceResult<BatchReadObjectResponse>;

    async fn write(&self, identity: &Identity, request: WriteObjectRequest) -> WriteObjectResponse;

    async fn delete(
        &self,
        identity: &Identity,
        request: DeleteObjectRequest,
    ) -> DeleteObjectResponse;

    /// Versions newest first.
    async fn history(
        &self,
        identity: &Identity,
        request: ObjectHistoryRequest,
    ) -> ServiceResult<ObjectHistoryResponse>;

    async fn search(
        &self,
        identity: &Identity,
        request: ObjectSearchRequest,
    ) -> ServiceResult<ObjectSearchResponse>;
}
