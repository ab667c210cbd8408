//! Restaurant menu, operations and service-fee entities.

pub mod fulfillment;
pub mod item;
pub mod label;
pub mod menu;
pub mod modifier;
pub mod operation;
pub mod ordering_settings;
pub mod rule;
pub mod section;
pub mod variant;

pub use fulfillment::{DeliveryOptions, FulfillmentDetails, FulfillmentMethod, FulfillmentMethodField, PickupOptions};
pub use item::{Item, ItemField, OrderSettings, PriceInfo, PriceVariant};
pub use label::{Label, LabelField};
pub use menu::{Menu, MenuField};
pub use modifier::{Modifier, ModifierField, ModifierGroup, ModifierGroupEntry, ModifierGroupField, SelectionRule};
pub use operation::{
    AsapOptions, OnlineOrderingStatus, Operation, OperationField, OrderScheduling, PreorderOptions, TimeBounds,
};
pub use ordering_settings::{MenuOrderingSettings, MenuOrderingSettingsField};
pub use rule::{Condition, ConditionOperator, ConditionValue, Rule, RuleField, RuleValue};
pub use section::{Section, SectionField};
pub use variant::{Variant, VariantField};

use crate::entity::{Entity, EntityDescriptor};
use crate::errors::{SdkError, SdkResult};
use serde::{Deserialize, Serialize};

/// Media reference attached to sections, items and labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

/// Every entity kind served, in a stable order.
pub const KINDS: [&str; 11] = [
    Menu::KIND,
    Section::KIND,
    Item::KIND,
    Variant::KIND,
    Label::KIND,
    Modifier::KIND,
    ModifierGroup::KIND,
    Rule::KIND,
    Operation::KIND,
    FulfillmentMethod::KIND,
    MenuOrderingSettings::KIND,
];

/// Looks up the query surface of an entity by its wire kind.
#[must_use]
pub fn describe_kind(kind: &str) -> Option<EntityDescriptor> {
    Some(match kind {
        Menu::KIND => EntityDescriptor::of::<Menu>(),
        Section::KIND => EntityDescriptor::of::<Section>(),
        Item::KIND => EntityDescriptor::of::<Item>(),
        Variant::KIND => EntityDescriptor::of::<Variant>(),
        Label::KIND => EntityDescriptor::of::<Label>(),
        Modifier::KIND => EntityDescriptor::of::<Modifier>(),
        ModifierGroup::KIND => EntityDescriptor::of::<ModifierGroup>(),
        Rule::KIND => EntityDescriptor::of::<Rule>(),
        Operation::KIND => EntityDescriptor::of::<Operation>(),
        FulfillmentMethod::KIND => EntityDescriptor::of::<FulfillmentMethod>(),
        MenuOrderingSettings::KIND => EntityDescriptor::of::<MenuOrderingSettings>(),
        _ => return None,
    })
}

pub(crate) fn require_name(kind: &str, name: &str) -> SdkResult<()> {
    if name.trim().is_empty() {
        return Err(SdkError::Validation(format!("{kind}: name is required")));
    }
    Ok(())
}
