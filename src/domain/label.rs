use super::Image;
use crate::entity::{Entity, EntityMeta};
use crate::errors::SdkResult;
use serde::{Deserialize, Serialize};

crate::query_fields! {
    pub enum LabelField {
        Id => "_id": [EQ | SORT],
        CreatedDate => "_createdDate": [EQ | RANGE | SORT],
        UpdatedDate => "_updatedDate": [EQ | RANGE | SORT],
        Name => "name": [EQ | SORT | TEXT],
    }
}

/// Dietary or promotional tag ("Vegan", "Spicy").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Image>,
}

impl Entity for Label {
    const KIND: &'static str = "labels";
    const FQDN: &'static str = "restaurants.menus.v1.label";
    const DEFAULT_LIMIT: usize = 200;
    const MAX_LIST: usize = 500;

    type Field = LabelField;

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
