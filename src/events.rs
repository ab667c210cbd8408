//! Domain events and administrative message shapes.
//!
//! Events are delivered out of band, possibly duplicated or out of order.
//! [`EventSequenceGuard`] keeps the last accepted `entityEventSequence` per
//! entity so consumers can drop replays.

use crate::entity::{Entity, decode};
use crate::errors::SdkResult;
use crate::types::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreInfo {
    pub deleted_date: DateTime<Utc>,
}

/// Exactly one of the four event bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainEventBody {
    #[serde(rename = "createdEvent", rename_all = "camelCase")]
    Created {
        entity: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        restore_info: Option<RestoreInfo>,
    },
    #[serde(rename = "updatedEvent", rename_all = "camelCase")]
    Updated { current_entity: Value },
    #[serde(rename = "deletedEvent", rename_all = "camelCase")]
    Deleted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deleted_entity: Option<Value>,
    },
    #[serde(rename = "actionEvent")]
    Action { body: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    pub id: String,
    pub entity_fqdn: String,
    /// `created`, `updated`, `deleted` or an action name.
    pub slug: String,
    pub entity_id: EntityId,
    pub event_time: DateTime<Utc>,
    pub entity_event_sequence: u64,
    #[serde(flatten)]
    pub body: DomainEventBody,
}

impl DomainEvent {
    /// Decodes the entity snapshot carried by the event, if any, as `E`.
    ///
    /// Returns `Ok(None)` for action events, deletions without a snapshot and
    /// events about another entity type.
    pub fn entity<E: Entity>(&self) -> SdkResult<Option<E>> {
        if self.entity_fqdn != E::FQDN {
            return Ok(None);
        }
        let doc = match &self.body {
            DomainEventBody::Created { entity, .. } => entity,
            DomainEventBody::Updated { current_entity } => current_entity,
            DomainEventBody::Deleted { deleted_entity: Some(e) } => e,
            DomainEventBody::Deleted { deleted_entity: None } | DomainEventBody::Action { .. } => {
                return Ok(None);
            }
        };
        decode::<E>(doc.clone()).map(Some)
    }

    #[must_use]
    pub const fn is_restore(&self) -> bool {
        matches!(self.body, DomainEventBody::Created { restore_info: Some(_), .. })
    }
}

/// Per-entity high-water mark of accepted event sequences.
///
/// Serializable so consumers can persist it between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSequenceGuard {
    last_seen: HashMap<String, u64>,
}

impl EventSequenceGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `event` if its sequence is strictly greater than the last one
    /// accepted for the same entity, and records it.
    pub fn accept(&mut self, event: &DomainEvent) -> bool {
        let key = format!("{}/{}", event.entity_fqdn, event.entity_id);
        match self.last_seen.get(&key) {
            Some(&seen) if event.entity_event_sequence <= seen => {
                log::debug!(
                    "dropping event {} for {key}: sequence {} <= {seen}",
                    event.id,
                    event.entity_event_sequence
                );
                false
            }
            _ => {
                self.last_seen.insert(key, event.entity_event_sequence);
                true
            }
        }
    }

    #[must_use]
    pub fn last_sequence(&self, fqdn: &str, id: &EntityId) -> Option<u64> {
        self.last_seen.get(&format!("{fqdn}/{id}")).copied()
    }
}

/// What a cache invalidation request targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidateCache {
    /// Everything cached for the deployment.
    All(bool),
    MetaSiteId(String),
    SiteId(String),
    #[serde(rename_all = "camelCase")]
    Page { meta_site_id: String, page_id: String },
    #[serde(rename_all = "camelCase")]
    Uri { meta_site_id: String, uri_path: String },
    CustomTag(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateCacheRequest {
    #[serde(flatten)]
    pub target: InvalidateCache,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub hard_purge: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePropertiesNotification {
    pub meta_site_id: String,
    #[serde(default)]
    pub changed_properties: Vec<String>,
    pub version: u64,
}
