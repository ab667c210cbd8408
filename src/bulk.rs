//! Per-item outcomes of bulk create/update/delete.

use crate::entity::{Entity, decode};
use crate::errors::SdkResult;
use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const REVISION_MISMATCH: &str = "REVISION_MISMATCH";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationError {
    pub code: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApplicationError {
    pub fn new(code: &str, description: impl Into<String>) -> Self {
        Self { code: code.to_string(), description: description.into(), data: None }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub original_index: usize,
    pub success: bool,
    /// Absent on success, and on failures past the detail limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApplicationError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionMetadata {
    pub total_successes: usize,
    pub total_failures: usize,
    pub undetailed_failures: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemResult<T> {
    pub item_metadata: ItemMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
}

/// One result per input, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResponse<T> {
    pub results: Vec<BulkItemResult<T>>,
    pub bulk_action_metadata: BulkActionMetadata,
}

impl<T> BulkResponse<T> {
    #[must_use]
    pub fn failed(&self) -> impl Iterator<Item = &BulkItemResult<T>> {
        self.results.iter().filter(|r| !r.item_metadata.success)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl BulkResponse<Value> {
    /// Decodes returned items into `E`; metadata passes through untouched.
    pub fn typed<E: Entity>(self) -> SdkResult<BulkResponse<E>> {
        let results = self
            .results
            .into_iter()
            .map(|r| {
                Ok(BulkItemResult { item_metadata: r.item_metadata, item: r.item.map(decode::<E>).transpose()? })
            })
            .collect::<SdkResult<Vec<_>>>()?;
        Ok(BulkResponse { results, bulk_action_metadata: self.bulk_action_metadata })
    }
}

/// Accumulates per-item outcomes and stops attaching error details past `detail_limit`.
#[derive(Debug)]
pub struct BulkCollector {
    results: Vec<BulkItemResult<Value>>,
    meta: BulkActionMetadata,
    detail_limit: usize,
}

impl BulkCollector {
    #[must_use]
    pub fn new(capacity: usize, detail_limit: usize) -> Self {
        Self { results: Vec::with_capacity(capacity), meta: BulkActionMetadata::default(), detail_limit }
    }

    pub fn success(&mut self, id: EntityId, item: Option<Value>) {
        let original_index = self.results.len();
        self.meta.total_successes += 1;
        self.results.push(BulkItemResult {
            item_metadata: ItemMetadata { id: Some(id), original_index, success: true, error: None },
            item,
        });
    }

    pub fn failure(&mut self, id: Option<EntityId>, error: ApplicationError) {
        let original_index = self.results.len();
        let detailed = self.meta.total_failures - self.meta.undetailed_failures;
        self.meta.total_failures += 1;
        let error = if detailed < self.detail_limit {
            Some(error)
        } else {
            self.meta.undetailed_failures += 1;
            None
        };
        self.results.push(BulkItemResult {
            item_metadata: ItemMetadata { id, original_index, success: false, error },
            item: None,
        });
    }

    /// Appends a result produced elsewhere, renumbering it to its position here.
    pub fn forward(&mut self, mut r: BulkItemResult<Value>) {
        r.item_metadata.original_index = self.results.len();
        if r.item_metadata.success {
            self.meta.total_successes += 1;
        } else {
            let detailed = self.meta.total_failures - self.meta.undetailed_failures;
            self.meta.total_failures += 1;
            if detailed >= self.detail_limit || r.item_metadata.error.is_none() {
                r.item_metadata.error = None;
                self.meta.undetailed_failures += 1;
            }
        }
        self.results.push(r);
    }

    #[must_use]
    pub fn finish(self) -> BulkResponse<Value> {
        BulkResponse { results: self.results, bulk_action_metadata: self.meta }
    }
}
