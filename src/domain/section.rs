use super::Image;
use crate::entity::{Entity, EntityMeta};
use crate::errors::SdkResult;
use serde::{Deserialize, Serialize};

crate::query_fields! {
    pub enum SectionField {
        Id => "_id": [EQ | SORT],
        CreatedDate => "_createdDate": [EQ | RANGE | SORT],
        UpdatedDate => "_updatedDate": [EQ | RANGE | SORT],
        Name => "name": [EQ | SORT | TEXT],
        Visible => "visible": [EQ | SORT],
        ItemIds => "itemIds": [EQ | ARRAY],
        BusinessLocationId => "businessLocationId": [EQ | SORT],
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(default)]
    pub item_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_location_id: Option<String>,
}

impl Entity for Section {
    const KIND: &'static str = "sections";
    const FQDN: &'static str = "restaurants.menus.v1.section";
    const DEFAULT_LIMIT: usize = 500;
    const MAX_LIST: usize = 500;

    type Field = SectionField;

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
