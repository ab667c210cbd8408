use crate::entity::{Entity, EntityMeta};
use crate::errors::{SdkError, SdkResult};
use serde::{Deserialize, Serialize};

crate::query_fields! {
    pub enum FulfillmentMethodField {
        Id => "_id": [EQ | SORT],
        CreatedDate => "_createdDate": [EQ | RANGE | SORT],
        UpdatedDate => "_updatedDate": [EQ | RANGE | SORT],
        Name => "name": [EQ | SORT | TEXT],
        Enabled => "enabled": [EQ | SORT],
        Fee => "fee": [EQ | RANGE | SORT],
        BusinessLocationId => "businessLocationId": [EQ | SORT],
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time_minutes: Option<u32>,
    /// Decimal string; orders at or above this amount ship free.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_delivery_threshold: Option<String>,
    #[serde(default)]
    pub postal_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FulfillmentDetails {
    PickupOptions(PickupOptions),
    DeliveryOptions(DeliveryOptions),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentMethod {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(default)]
    pub name: String,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_order_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FulfillmentDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_location_id: Option<String>,
}

const fn enabled_default() -> bool {
    true
}

impl Default for FulfillmentMethod {
    fn default() -> Self {
        Self {
            meta: EntityMeta::default(),
            name: String::new(),
            enabled: true,
            fee: None,
            minimum_order_price: None,
            details: None,
            business_location_id: None,
        }
    }
}

impl FulfillmentMethod {
    #[must_use]
    pub const fn is_delivery(&self) -> bool {
        matches!(self.details, Some(FulfillmentDetails::DeliveryOptions(_)))
    }
}

impl Entity for FulfillmentMethod {
    const KIND: &'static str = "fulfillment-methods";
    const FQDN: &'static str = "restaurants.operations.v1.fulfillment_method";
    const DEFAULT_LIMIT: usize = 50;
    const MAX_LIST: usize = 100;

    type Field = FulfillmentMethodField;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate_new(&self) -> SdkResult<()> {
        super::require_name(Self::KIND, &self.name)?;
        if self.details.is_none() {
            return Err(SdkError::validation("fulfillment-methods: pickupOptions or deliveryOptions is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn details_decode_by_key() {
        let m: FulfillmentMethod = serde_json::from_value(json!({
            "name": "Courier",
            "details": {"deliveryOptions": {"deliveryTimeMinutes": 40}}
        }))
        .unwrap();
        assert!(m.is_delivery());
        assert!(m.enabled);
        assert!(m.validate_new().is_ok());
    }
}
