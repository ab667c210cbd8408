//! Service-fee rules.
//!
//! Older payloads carry the fee as a bare `amount` and a single `condition`.
//! Both are still accepted when decoding and are folded into
//! [`RuleValue::Fixed`] and [`Rule::conditions`]; only the current shape is
//! ever written back.

use crate::entity::{Entity, EntityMeta};
use crate::errors::{SdkError, SdkResult};
use serde::{Deserialize, Serialize};

crate::query_fields! {
    pub enum RuleField {
        Id => "_id": [EQ | SORT],
        CreatedDate => "_createdDate": [EQ | RANGE | SORT],
        UpdatedDate => "_updatedDate": [EQ | RANGE | SORT],
        Name => "name": [EQ | SORT | TEXT],
        AppId => "appId": [EQ | SORT],
        Enabled => "enabled": [EQ | SORT],
    }
}

/// How the fee is computed. Amounts are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValue {
    Fixed(String),
    Percentage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
    Contains,
}

/// Exactly one typed operand, e.g. `{"numberValue": 25}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionValue {
    StringValue(String),
    NumberValue(serde_json::Number),
    BooleanValue(bool),
    StringListValue(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Order attribute the condition looks at, e.g. `subtotal`.
    pub field_path: String,
    pub operator: ConditionOperator,
    pub value: ConditionValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleWire", into = "RuleWire")]
pub struct Rule {
    pub meta: EntityMeta,
    pub name: String,
    pub app_id: Option<String>,
    pub enabled: bool,
    pub value: Option<RuleValue>,
    /// All must hold for the fee to apply.
    pub conditions: Vec<Condition>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            meta: EntityMeta::default(),
            name: String::new(),
            app_id: None,
            enabled: true,
            value: None,
            conditions: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConditionOptions {
    #[serde(default)]
    conditions: Vec<Condition>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleWire {
    #[serde(flatten)]
    meta: EntityMeta,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    // Both always written: an update then clears whichever fee is unused.
    #[serde(default)]
    fixed_fee: Option<String>,
    #[serde(default)]
    percentage_fee: Option<String>,
    #[serde(default, skip_serializing)]
    amount: Option<String>,
    // Written even when empty so an update can drop every condition.
    #[serde(default)]
    condition_options: Option<ConditionOptions>,
    #[serde(default, skip_serializing)]
    condition: Option<Condition>,
}

impl TryFrom<RuleWire> for Rule {
    type Error = String;

    fn try_from(w: RuleWire) -> Result<Self, Self::Error> {
        let value = match (w.fixed_fee, w.percentage_fee, w.amount) {
            (Some(_), Some(_), _) => return Err("only one of fixedFee and percentageFee may be set".into()),
            (Some(fixed), None, _) => Some(RuleValue::Fixed(fixed)),
            (None, Some(pct), _) => Some(RuleValue::Percentage(pct)),
            (None, None, legacy) => legacy.map(RuleValue::Fixed),
        };
        let mut conditions = w.condition_options.map(|o| o.conditions).unwrap_or_default();
        if let Some(legacy) = w.condition {
            if !conditions.contains(&legacy) {
                conditions.push(legacy);
            }
        }
        Ok(Self {
            meta: w.meta,
            name: w.name,
            app_id: w.app_id,
            enabled: w.enabled.unwrap_or(true),
            value,
            conditions,
        })
    }
}

impl From<Rule> for RuleWire {
    fn from(r: Rule) -> Self {
        let (fixed_fee, percentage_fee) = match r.value {
            Some(RuleValue::Fixed(v)) => (Some(v), None),
            Some(RuleValue::Percentage(v)) => (None, Some(v)),
            None => (None, None),
        };
        Self {
            meta: r.meta,
            name: r.name,
            app_id: r.app_id,
            enabled: Some(r.enabled),
            fixed_fee,
            percentage_fee,
            amount: None,
            condition_options: Some(ConditionOptions { conditions: r.conditions }),
            condition: None,
        }
    }
}

impl Entity for Rule {
    const KIND: &'static str = "rules";
    const FQDN: &'static str = "restaurants.service_fees.v1.rule";
    const DEFAULT_LIMIT: usize = 100;
    const MAX_LIST: usize = 100;

    type Field = RuleField;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate_new(&self) -> SdkResult<()> {
        super::require_name(Self::KIND, &self.name)?;
        if self.value.is_none() {
            return Err(SdkError::validation("rules: a fixed or percentage fee is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subtotal_over(n: i64) -> Condition {
        Condition {
            field_path: "subtotal".into(),
            operator: ConditionOperator::GreaterThan,
            value: ConditionValue::NumberValue(n.into()),
        }
    }

    #[test]
    fn legacy_amount_becomes_fixed_fee() {
        let r: Rule = serde_json::from_value(json!({"name": "Service", "amount": "2.50"})).unwrap();
        assert_eq!(r.value, Some(RuleValue::Fixed("2.50".into())));
        let out = serde_json::to_value(&r).unwrap();
        assert_eq!(out["fixedFee"], json!("2.50"));
        assert_eq!(out["percentageFee"], json!(null));
        assert!(out.get("amount").is_none());
    }

    #[test]
    fn canonical_fee_wins_over_legacy_amount() {
        let r: Rule =
            serde_json::from_value(json!({"name": "S", "percentageFee": "10", "amount": "1.00"})).unwrap();
        assert_eq!(r.value, Some(RuleValue::Percentage("10".into())));
    }

    #[test]
    fn both_fees_is_an_error() {
        let res: Result<Rule, _> =
            serde_json::from_value(json!({"name": "S", "fixedFee": "1", "percentageFee": "10"}));
        assert!(res.is_err());
    }

    #[test]
    fn legacy_condition_is_folded_once() {
        let cond = serde_json::to_value(subtotal_over(25)).unwrap();
        let r: Rule = serde_json::from_value(json!({
            "name": "Large orders",
            "fixedFee": "3",
            "condition": cond,
            "conditionOptions": {"conditions": [cond]}
        }))
        .unwrap();
        assert_eq!(r.conditions, vec![subtotal_over(25)]);
        let out = serde_json::to_value(&r).unwrap();
        assert!(out.get("condition").is_none());
        assert_eq!(out["conditionOptions"]["conditions"][0]["value"], json!({"numberValue": 25}));
    }

    #[test]
    fn empty_conditions_are_still_written() {
        let r = Rule { name: "Flat".into(), value: Some(RuleValue::Fixed("1".into())), ..Rule::default() };
        let out = serde_json::to_value(&r).unwrap();
        assert_eq!(out["conditionOptions"], json!({"conditions": []}));
    }

    #[test]
    fn fee_is_required_on_create() {
        let r = Rule { name: "Empty".into(), ..Rule::default() };
        assert!(matches!(r.validate_new(), Err(SdkError::Validation(_))));
    }
}
