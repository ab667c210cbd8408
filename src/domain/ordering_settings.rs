use crate::entity::{Entity, EntityMeta};
use crate::errors::{SdkError, SdkResult};
use serde::{Deserialize, Serialize};

crate::query_fields! {
    pub enum MenuOrderingSettingsField {
        Id => "_id": [EQ | SORT],
        CreatedDate => "_createdDate": [EQ | RANGE | SORT],
        UpdatedDate => "_updatedDate": [EQ | RANGE | SORT],
        MenuId => "menuId": [EQ | SORT],
        OnlineOrderingEnabled => "onlineOrderingEnabled": [EQ | SORT],
        BusinessLocationId => "businessLocationId": [EQ | SORT],
    }
}

/// Per-menu online ordering switches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOrderingSettings {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(default)]
    pub menu_id: String,
    #[serde(default)]
    pub online_ordering_enabled: bool,
    #[serde(default)]
    pub operation_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_location_id: Option<String>,
}

impl Entity for MenuOrderingSettings {
    const KIND: &'static str = "menu-ordering-settings";
    const FQDN: &'static str = "restaurants.menus.v1.menu_ordering_settings";
    const DEFAULT_LIMIT: usize = 100;
    const MAX_LIST: usize = 100;

    type Field = MenuOrderingSettingsField;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate_new(&self) -> SdkResult<()> {
        if self.menu_id.is_empty() {
            return Err(SdkError::validation("menu-ordering-settings: menuId is required"));
        }
        Ok(())
    }
}
