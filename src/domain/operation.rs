use crate::entity::{Entity, EntityMeta};
use crate::errors::{SdkError, SdkResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::query_fields! {
    pub enum OperationField {
        Id => "_id": [EQ | SORT],
        CreatedDate => "_createdDate": [EQ | RANGE | SORT],
        UpdatedDate => "_updatedDate": [EQ | RANGE | SORT],
        Name => "name": [EQ | SORT | TEXT],
        Default => "default": [EQ | SORT],
        FulfillmentIds => "fulfillmentIds": [EQ | ARRAY],
        OnlineOrderingStatus => "onlineOrderingStatus": [EQ | SORT],
        BusinessLocationId => "businessLocationId": [EQ | SORT],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnlineOrderingStatus {
    #[default]
    Enabled,
    Disabled,
    PausedUntil,
}

/// Preparation window in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBounds {
    pub min_minutes: u32,
    pub max_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsapOptions {
    pub preparation_time: TimeBounds,
    #[serde(default)]
    pub asap_preorder_allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreorderOptions {
    /// How far ahead an order may be placed.
    pub max_days_ahead: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_minutes_ahead: Option<u32>,
}

/// When orders are fulfilled: as soon as possible or at a chosen slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderScheduling {
    AsapOptions(AsapOptions),
    PreorderOptions(PreorderOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub fulfillment_ids: Vec<String>,
    #[serde(default)]
    pub online_ordering_status: OnlineOrderingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_scheduling: Option<OrderScheduling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_location_id: Option<String>,
}

impl Entity for Operation {
    const KIND: &'static str = "operations";
    const FQDN: &'static str = "restaurants.operations.v1.operation";
    const DEFAULT_LIMIT: usize = 50;
    const MAX_LIST: usize = 100;

    type Field = OperationField;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate_new(&self) -> SdkResult<()> {
        super::require_name(Self::KIND, &self.name)?;
        if self.online_ordering_status == OnlineOrderingStatus::PausedUntil && self.paused_until.is_none() {
            return Err(SdkError::validation("operations: PAUSED_UNTIL requires pausedUntil"));
        }
        if let Some(OrderScheduling::AsapOptions(asap)) = &self.order_scheduling {
            let t = asap.preparation_time;
            if t.min_minutes > t.max_minutes {
                return Err(SdkError::validation("operations: preparation time min exceeds max"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scheduling_is_a_one_of() {
        let op: Operation = serde_json::from_value(json!({
            "name": "Dinner service",
            "orderScheduling": {"preorderOptions": {"maxDaysAhead": 3}}
        }))
        .unwrap();
        assert_eq!(
            op.order_scheduling,
            Some(OrderScheduling::PreorderOptions(PreorderOptions { max_days_ahead: 3, min_minutes_ahead: None }))
        );
        assert_eq!(op.online_ordering_status, OnlineOrderingStatus::Enabled);
    }

    #[test]
    fn paused_needs_a_date() {
        let op = Operation {
            name: "Lunch".into(),
            online_ordering_status: OnlineOrderingStatus::PausedUntil,
            ..Operation::default()
        };
        assert!(op.validate_new().is_err());
    }
}
