use crate::entity::{Entity, EntityMeta};
use crate::errors::SdkResult;
use serde::{Deserialize, Serialize};

crate::query_fields! {
    pub enum MenuField {
        Id => "_id": [EQ | SORT],
        CreatedDate => "_createdDate": [EQ | RANGE | SORT],
        UpdatedDate => "_updatedDate": [EQ | RANGE | SORT],
        Name => "name": [EQ | SORT | TEXT],
        Visible => "visible": [EQ | SORT],
        SectionIds => "sectionIds": [EQ | ARRAY],
        BusinessLocationId => "businessLocationId": [EQ | SORT],
    }
}

/// A named, ordered collection of sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default)]
    pub section_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_query_param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_location_id: Option<String>,
}

impl Menu {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

impl Entity for Menu {
    const KIND: &'static str = "menus";
    const FQDN: &'static str = "restaurants.menus.v1.menu";
    const DEFAULT_LIMIT: usize = 500;
    const MAX_LIST: usize = 500;

    type Field = MenuField;

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
