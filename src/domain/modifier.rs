use super::PriceInfo;
use crate::entity::{Entity, EntityMeta};
use crate::errors::{SdkError, SdkResult};
use serde::{Deserialize, Serialize};

crate::query_fields! {
    pub enum ModifierField {
        Id => "_id": [EQ | SORT],
        CreatedDate => "_createdDate": [EQ | RANGE | SORT],
        UpdatedDate => "_updatedDate": [EQ | RANGE | SORT],
        Name => "name": [EQ | SORT | TEXT],
        InStock => "inStock": [EQ],
        BusinessLocationId => "businessLocationId": [EQ | SORT],
    }
}

crate::query_fields! {
    pub enum ModifierGroupField {
        Id => "_id": [EQ | SORT],
        CreatedDate => "_createdDate": [EQ | RANGE | SORT],
        UpdatedDate => "_updatedDate": [EQ | RANGE | SORT],
        Name => "name": [EQ | SORT | TEXT],
        Required => "rule.required": [EQ],
        BusinessLocationId => "businessLocationId": [EQ | SORT],
    }
}

/// A single add-on or choice ("Extra cheese").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_info: Option<PriceInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_location_id: Option<String>,
}

impl Entity for Modifier {
    const KIND: &'static str = "modifiers";
    const FQDN: &'static str = "restaurants.menus.v1.item_modifier";
    const DEFAULT_LIMIT: usize = 100;
    const MAX_LIST: usize = 500;

    type Field = ModifierField;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate_new(&self) -> SdkResult<()> {
        super::require_name(Self::KIND, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierGroupEntry {
    pub modifier_id: String,
    #[serde(default)]
    pub pre_selected: bool,
    /// Decimal string added to the item price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_charge: Option<String>,
}

/// How many modifiers a diner must / may pick from a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRule {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_selections: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierGroup {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<ModifierGroupEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<SelectionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_location_id: Option<String>,
}

impl Entity for ModifierGroup {
    const KIND: &'static str = "modifier-groups";
    const FQDN: &'static str = "restaurants.menus.v1.item_modifier_group";
    const DEFAULT_LIMIT: usize = 100;
    const MAX_LIST: usize = 500;

    type Field = ModifierGroupField;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate_new(&self) -> SdkResult<()> {
        super::require_name(Self::KIND, &self.name)?;
        match &self.rule {
            Some(SelectionRule { min_selections: Some(min), max_selections: Some(max), .. }) if min > max => {
                Err(SdkError::Validation(format!(
                    "modifier-groups: minSelections {min} exceeds maxSelections {max}"
                )))
            }
            _ => Ok(()),
        }
    }
}
