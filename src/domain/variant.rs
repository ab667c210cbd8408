use crate::entity::{Entity, EntityMeta};
use crate::errors::SdkResult;
use serde::{Deserialize, Serialize};

crate::query_fields! {
    pub enum VariantField {
        Id => "_id": [EQ | SORT],
        CreatedDate => "_createdDate": [EQ | RANGE | SORT],
        UpdatedDate => "_updatedDate": [EQ | RANGE | SORT],
        Name => "name": [EQ | SORT | TEXT],
        BusinessLocationId => "businessLocationId": [EQ | SORT],
    }
}

/// A size or style an item can be ordered in ("Small", "Large").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_location_id: Option<String>,
}

impl Entity for Variant {
    const KIND: &'static str = "variants";
    const FQDN: &'static str = "restaurants.menus.v1.variant";
    const DEFAULT_LIMIT: usize = 200;
    const MAX_LIST: usize = 500;

    type Field = VariantField;

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
