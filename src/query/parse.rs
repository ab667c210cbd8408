use crate::errors::{SdkError, SdkResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

use super::types::{CmpOp, CursorPaging, Filter, MAX_IN_SET, MAX_PATH_DEPTH, QueryDescriptor, SortSpec};

/// Renders a filter in the nested `{field: {"$op": value}}` wire form.
///
/// Distinct operators on one field share an operator object; an operator that
/// repeats on the same field forces the conjunction into `$and`.
#[must_use]
pub fn filter_to_json(filter: &Filter) -> Value {
    match filter {
        Filter::True => json!({}),
        Filter::And(fs) => merge_conjunction(fs)
            .unwrap_or_else(|| json!({ "$and": fs.iter().map(filter_to_json).collect::<Vec<_>>() })),
        Filter::Or(fs) => json!({ "$or": fs.iter().map(filter_to_json).collect::<Vec<_>>() }),
        Filter::Not(f) => json!({ "$not": filter_to_json(f) }),
        leaf => match leaf_parts(leaf) {
            Some((path, op, value)) => {
                let mut ops = Map::new();
                ops.insert(op.to_string(), value);
                let mut out = Map::new();
                out.insert(path, Value::Object(ops));
                Value::Object(out)
            }
            None => json!({}),
        },
    }
}

fn leaf_parts(leaf: &Filter) -> Option<(String, &'static str, Value)> {
    Some(match leaf {
        Filter::Exists { path, exists } => (path.clone(), "$exists", Value::Bool(*exists)),
        Filter::In { path, values } => (path.clone(), "$in", Value::Array(values.clone())),
        Filter::Nin { path, values } => (path.clone(), "$nin", Value::Array(values.clone())),
        Filter::HasSome { path, values } => (path.clone(), "$hasSome", Value::Array(values.clone())),
        Filter::HasAll { path, values } => (path.clone(), "$hasAll", Value::Array(values.clone())),
        Filter::StartsWith { path, prefix } => {
            (path.clone(), "$startsWith", Value::String(prefix.clone()))
        }
        Filter::Contains { path, needle } => (path.clone(), "$contains", Value::String(needle.clone())),
        Filter::Cmp { path, op, value } => (path.clone(), op.wire(), value.clone()),
        Filter::True | Filter::And(_) | Filter::Or(_) | Filter::Not(_) => return None,
    })
}

// Returns None when the children cannot share one object without losing a predicate.
fn merge_conjunction(fs: &[Filter]) -> Option<Value> {
    let mut out = Map::new();
    for f in fs {
        match f {
            Filter::True => {}
            Filter::And(_) | Filter::Or(_) | Filter::Not(_) => return None,
            leaf => {
                let (path, op, value) = leaf_parts(leaf)?;
                let slot = out.entry(path).or_insert_with(|| Value::Object(Map::new()));
                let ops = slot.as_object_mut()?;
                if ops.contains_key(op) {
                    return None;
                }
                ops.insert(op.to_string(), value);
            }
        }
    }
    Some(Value::Object(out))
}

/// Parses the wire form. A bare value under a field name means `$eq`.
///
/// # Errors
/// Returns a validation error for unknown operators or malformed operands.
pub fn filter_from_json(v: &Value) -> SdkResult<Filter> {
    parse_node(v, 0)
}

fn parse_node(v: &Value, depth: usize) -> SdkResult<Filter> {
    if depth > MAX_PATH_DEPTH {
        return Err(SdkError::validation("filter nested too deeply"));
    }
    let obj = v.as_object().ok_or_else(|| SdkError::validation("filter must be a JSON object"))?;
    let mut preds = Vec::with_capacity(obj.len());
    for (key, val) in obj {
        match key.as_str() {
            "$and" | "$or" => {
                let items = val
                    .as_array()
                    .ok_or_else(|| SdkError::validation(format!("{key} expects an array")))?;
                let children =
                    items.iter().map(|i| parse_node(i, depth + 1)).collect::<SdkResult<Vec<_>>>()?;
                preds.push(if key == "$and" { Filter::all_of(children) } else { Filter::Or(children) });
            }
            "$not" => preds.push(Filter::Not(Box::new(parse_node(val, depth + 1)?))),
            k if k.starts_with('$') => {
                return Err(SdkError::validation(format!("unknown top-level operator {k}")));
            }
            field => preds.extend(parse_field(field, val)?),
        }
    }
    Ok(Filter::all_of(preds))
}

fn parse_field(field: &str, val: &Value) -> SdkResult<Vec<Filter>> {
    let path = field.to_string();
    let ops = match val.as_object() {
        Some(o) if !o.is_empty() && o.keys().all(|k| k.starts_with('$')) => o,
        _ => return Ok(vec![Filter::Cmp { path, op: CmpOp::Eq, value: val.clone() }]),
    };
    let mut out = Vec::with_capacity(ops.len());
    for (op, operand) in ops {
        let path = path.clone();
        let f = match op.as_str() {
            "$eq" => Filter::Cmp { path, op: CmpOp::Eq, value: operand.clone() },
            "$ne" => Filter::Cmp { path, op: CmpOp::Ne, value: operand.clone() },
            "$gt" => Filter::Cmp { path, op: CmpOp::Gt, value: operand.clone() },
            "$gte" => Filter::Cmp { path, op: CmpOp::Gte, value: operand.clone() },
            "$lt" => Filter::Cmp { path, op: CmpOp::Lt, value: operand.clone() },
            "$lte" => Filter::Cmp { path, op: CmpOp::Lte, value: operand.clone() },
            "$in" => Filter::In { path, values: value_set(op, operand)? },
            "$nin" => Filter::Nin { path, values: value_set(op, operand)? },
            "$hasSome" => Filter::HasSome { path, values: value_set(op, operand)? },
            "$hasAll" => Filter::HasAll { path, values: value_set(op, operand)? },
            "$startsWith" => Filter::StartsWith {
                path,
                prefix: operand
                    .as_str()
                    .ok_or_else(|| SdkError::validation("$startsWith expects a string"))?
                    .to_string(),
            },
            "$contains" => Filter::Contains {
                path,
                needle: operand
                    .as_str()
                    .ok_or_else(|| SdkError::validation("$contains expects a string"))?
                    .to_string(),
            },
            "$exists" => Filter::Exists {
                path,
                exists: operand
                    .as_bool()
                    .ok_or_else(|| SdkError::validation("$exists expects a boolean"))?,
            },
            other => return Err(SdkError::validation(format!("unknown operator {other} on '{field}'"))),
        };
        out.push(f);
    }
    Ok(out)
}

fn value_set(op: &str, operand: &Value) -> SdkResult<Vec<Value>> {
    let items = operand
        .as_array()
        .ok_or_else(|| SdkError::validation(format!("{op} expects an array")))?;
    if items.len() > MAX_IN_SET {
        return Err(SdkError::validation(format!("{op} accepts at most {MAX_IN_SET} values")));
    }
    Ok(items.clone())
}

/// # Errors
/// Returns an error if the string is not JSON or not a valid filter.
pub fn parse_filter_json(json: &str) -> SdkResult<Filter> {
    let v: Value = serde_json::from_str(json)?;
    filter_from_json(&v)
}

// Wire envelope for a query request.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptorWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sort: Vec<SortSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cursor_paging: Option<CursorPaging>,
}

impl Serialize for QueryDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = DescriptorWire {
            filter: (!self.filter.is_true()).then(|| filter_to_json(&self.filter)),
            sort: self.sort.clone(),
            cursor_paging: (self.cursor_paging != CursorPaging::default())
                .then(|| self.cursor_paging.clone()),
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QueryDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = DescriptorWire::deserialize(deserializer)?;
        let filter = match wire.filter {
            Some(v) => filter_from_json(&v).map_err(D::Error::custom)?,
            None => Filter::True,
        };
        Ok(Self { filter, sort: wire.sort, cursor_paging: wire.cursor_paging.unwrap_or_default() })
    }
}
