//! The seam between typed clients and whatever carries requests to the service.
//!
//! Backends exchange plain JSON documents keyed by entity kind so one object-safe
//! trait serves every entity. Errors a backend raises for its own reasons (network,
//! auth) should be wrapped in [`SdkError::Transport`](crate::errors::SdkError::Transport)
//! and are passed to callers unchanged.

use crate::bulk::BulkResponse;
use crate::errors::SdkResult;
use crate::query::{CursorPaging, Filter, PagingMetadata, QueryDescriptor};
use crate::types::EntityId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of raw documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPage {
    pub items: Vec<Value>,
    pub paging_metadata: PagingMetadata,
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Stores a new document; the service assigns id, revision and timestamps.
    async fn create(&self, kind: &str, doc: Value) -> SdkResult<Value>;

    async fn get(&self, kind: &str, id: &EntityId) -> SdkResult<Value>;

    /// Applies `patch` when its `revision` matches the stored one.
    async fn update(&self, kind: &str, id: &EntityId, patch: Value) -> SdkResult<Value>;

    async fn delete(&self, kind: &str, id: &EntityId) -> SdkResult<()>;

    /// Lists by id (or everything) in id order.
    async fn list(&self, kind: &str, ids: Option<Vec<EntityId>>, paging: CursorPaging) -> SdkResult<RawPage>;

    async fn query(&self, kind: &str, descriptor: &QueryDescriptor) -> SdkResult<RawPage>;

    async fn count(&self, kind: &str, filter: &Filter) -> SdkResult<u64>;

    async fn bulk_create(&self, kind: &str, docs: Vec<Value>, return_entity: bool)
    -> SdkResult<BulkResponse<Value>>;

    async fn bulk_update(&self, kind: &str, patches: Vec<Value>, return_entity: bool)
    -> SdkResult<BulkResponse<Value>>;

    async fn bulk_delete(&self, kind: &str, ids: Vec<EntityId>) -> SdkResult<BulkResponse<Value>>;
}
