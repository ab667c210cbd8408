use super::Image;
use crate::entity::{Entity, EntityMeta};
use crate::errors::{SdkError, SdkResult};
use serde::{Deserialize, Serialize};

crate::query_fields! {
    pub enum ItemField {
        Id => "_id": [EQ | SORT],
        CreatedDate => "_createdDate": [EQ | RANGE | SORT],
        UpdatedDate => "_updatedDate": [EQ | RANGE | SORT],
        Name => "name": [EQ | SORT | TEXT],
        Description => "description": [TEXT],
        Visible => "visible": [EQ | SORT],
        Price => "priceInfo.price": [EQ | RANGE | SORT],
        LabelIds => "labelIds": [EQ | ARRAY],
        ModifierGroupIds => "modifierGroupIds": [EQ | ARRAY],
        InStock => "orderSettings.inStock": [EQ],
        BusinessLocationId => "businessLocationId": [EQ | SORT],
    }
}

/// Price is a decimal string, e.g. `"12.50"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInfo {
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceVariant {
    pub variant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_info: Option<PriceInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSettings {
    #[serde(default = "in_stock_default")]
    pub in_stock: bool,
    #[serde(default)]
    pub accepts_special_requests: bool,
}

const fn in_stock_default() -> bool {
    true
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self { in_stock: true, accepts_special_requests: false }
    }
}

/// A dish or product. Either a single `price_info` or per-variant prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_info: Option<PriceInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub price_variants: Vec<PriceVariant>,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub modifier_group_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_settings: Option<OrderSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_location_id: Option<String>,
}

impl Entity for Item {
    const KIND: &'static str = "items";
    const FQDN: &'static str = "restaurants.menus.v1.item";
    const DEFAULT_LIMIT: usize = 100;
    const MAX_LIST: usize = 500;

    type Field = ItemField;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate_new(&self) -> SdkResult<()> {
        super::require_name(Self::KIND, &self.name)?;
        if self.price_info.is_some() && !self.price_variants.is_empty() {
            return Err(SdkError::validation("items: set either priceInfo or priceVariants, not both"));
        }
        Ok(())
    }
}
