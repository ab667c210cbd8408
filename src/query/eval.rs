use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

use super::types::{CmpOp, Filter, MAX_IN_SET, MAX_PATH_DEPTH, MAX_SORT_FIELDS, Order, SortSpec};

/// A document's sort key: one slot per sort field, `None` where missing or null.
pub type SortKey = Vec<Option<Value>>;

pub fn eval_filter(doc: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Or(fs) => fs.iter().any(|f| eval_filter(doc, f)),
        Filter::Not(f) => !eval_filter(doc, f),
        Filter::Exists { path, exists } => get_path(doc, path).is_some() == *exists,
        Filter::In { path, values } => get_path(doc, path).is_some_and(|v| matches_any(v, values)),
        Filter::Nin { path, values } => !get_path(doc, path).is_some_and(|v| matches_any(v, values)),
        Filter::HasSome { path, values } => match get_path(doc, path) {
            Some(Value::Array(items)) => {
                values.iter().take(MAX_IN_SET).any(|x| items.iter().any(|i| json_eq(i, x)))
            }
            _ => false,
        },
        Filter::HasAll { path, values } => match get_path(doc, path) {
            Some(Value::Array(items)) => {
                values.iter().take(MAX_IN_SET).all(|x| items.iter().any(|i| json_eq(i, x)))
            }
            _ => false,
        },
        Filter::StartsWith { path, prefix } => match get_path(doc, path) {
            Some(Value::String(s)) => s.to_lowercase().starts_with(&prefix.to_lowercase()),
            _ => false,
        },
        Filter::Contains { path, needle } => match get_path(doc, path) {
            Some(Value::String(s)) => s.to_lowercase().contains(&needle.to_lowercase()),
            _ => false,
        },
        Filter::Cmp { path, op, value } => match (get_path(doc, path), op) {
            (None, CmpOp::Ne) => true,
            (None, _) => false,
            (Some(v), CmpOp::Eq) => json_eq(v, value),
            (Some(v), CmpOp::Ne) => !json_eq(v, value),
            (Some(v), CmpOp::Gt) => compare_json(v, value) == Ordering::Greater,
            (Some(v), CmpOp::Gte) => compare_json(v, value) != Ordering::Less,
            (Some(v), CmpOp::Lt) => compare_json(v, value) == Ordering::Less,
            (Some(v), CmpOp::Lte) => compare_json(v, value) != Ordering::Greater,
        },
    }
}

/// Scalars match by value; arrays match when any element does.
fn matches_any(v: &Value, set: &[Value]) -> bool {
    let hit = |x: &Value| set.iter().take(MAX_IN_SET).any(|s| json_eq(x, s));
    match v {
        Value::Array(items) => items.iter().any(hit),
        other => hit(other),
    }
}

fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_json(a, b) == Ordering::Equal,
        _ => a == b,
    }
}

/// Resolves a dotted path. `null` counts as absent.
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut cur = doc;
    for (depth, part) in path.split('.').enumerate() {
        if depth >= MAX_PATH_DEPTH {
            return None;
        }
        cur = cur.as_object()?.get(part)?;
    }
    if cur.is_null() { None } else { Some(cur) }
}

pub fn sort_key(doc: &Value, sort: &[SortSpec]) -> SortKey {
    sort.iter().take(MAX_SORT_FIELDS).map(|s| get_path(doc, &s.field_name).cloned()).collect()
}

pub fn compare_keys(a: &[Option<Value>], b: &[Option<Value>], sort: &[SortSpec]) -> Ordering {
    for (i, s) in sort.iter().take(MAX_SORT_FIELDS).enumerate() {
        let va = a.get(i).and_then(Option::as_ref);
        let vb = b.get(i).and_then(Option::as_ref);
        let ord = match (va, vb) {
            (Some(x), Some(y)) => compare_json(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if s.order == Order::Asc { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

pub fn compare_docs(a: &Value, b: &Value, sort: &[SortSpec]) -> Ordering {
    compare_keys(&sort_key(a, sort), &sort_key(b, sort), sort)
}

pub fn compare_json(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(i), Some(j)) => i.cmp(&j),
                _ => {
                    let fx = x.as_f64().unwrap_or(f64::NAN);
                    let fy = y.as_f64().unwrap_or(f64::NAN);
                    fx.total_cmp(&fy)
                }
            }
        }
        (Value::String(x), Value::String(y)) => match (as_timestamp(x), as_timestamp(y)) {
            (Some(tx), Some(ty)) => tx.cmp(&ty),
            _ => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

// RFC 3339 strings with different fraction widths do not sort lexically.
fn as_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let b = s.as_bytes();
    if b.len() < 20 || b[4] != b'-' || b[10] != b'T' {
        return None;
    }
    DateTime::parse_from_rfc3339(s).ok().map(|d| d.with_timezone(&Utc))
}

const fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
