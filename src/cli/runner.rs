use crate::domain::{KINDS, describe_kind};
use crate::errors::{SdkError, SdkResult};
use crate::query::{CursorPaging, Filter, QueryDescriptor, parse_filter_json};
use crate::transport::Backend;
use serde_json::{Value, json};
use std::io::Write;
use std::path::Path;

use super::command::Command;
use super::util::parse_sort;

/// Loads a JSON array of documents into `kind`; returns how many were stored.
///
/// # Errors
/// Fails on unreadable files, non-array JSON, or the first rejected document.
pub async fn load_fixture(backend: &dyn Backend, kind: &str, path: &Path) -> SdkResult<usize> {
    let text = std::fs::read_to_string(path)?;
    let Value::Array(docs) = serde_json::from_str::<Value>(&text)? else {
        return Err(SdkError::validation(format!("{}: fixture must be a JSON array", path.display())));
    };
    let total = docs.len();
    let res = backend.bulk_create(kind, docs, false).await?;
    if let Some(bad) = res.failed().next() {
        let why = bad.item_metadata.error.as_ref().map_or("rejected", |e| e.description.as_str());
        return Err(SdkError::Validation(format!(
            "{}: document {} {why}",
            path.display(),
            bad.item_metadata.original_index
        )));
    }
    log::info!("loaded {total} {kind} from {}", path.display());
    Ok(total)
}

fn filter_arg(kind: &str, filter_json: Option<&str>) -> SdkResult<Filter> {
    let filter = filter_json.map(parse_filter_json).transpose()?.unwrap_or_default();
    let desc = describe_kind(kind).ok_or_else(|| SdkError::Validation(format!("unknown entity kind: {kind}")))?;
    crate::query::validate_filter(&filter, &desc)?;
    Ok(filter)
}

/// Executes `cmd`, writing NDJSON lines to `out`.
pub async fn run(backend: &dyn Backend, cmd: Command, out: &mut dyn Write) -> SdkResult<()> {
    match cmd {
        Command::Kinds => {
            for kind in KINDS {
                if let Some(d) = describe_kind(kind) {
                    let fields: Vec<&str> = d.fields.iter().map(|(p, _)| *p).collect();
                    writeln!(out, "{}", json!({"kind": kind, "defaultLimit": d.default_limit, "fields": fields}))?;
                }
            }
            Ok(())
        }
        Command::Query { kind, fixture, filter_json, sort, limit, pages } => {
            if let Some(p) = fixture {
                load_fixture(backend, &kind, &p).await?;
            }
            let mut request = QueryDescriptor {
                filter: filter_arg(&kind, filter_json.as_deref())?,
                sort: sort.as_deref().map(parse_sort).unwrap_or_default(),
                cursor_paging: CursorPaging { limit, cursor: None },
            };
            for _ in 0..pages.max(1) {
                let page = backend.query(&kind, &request).await?;
                writeln!(out, "{}", serde_json::to_string(&page)?)?;
                match page.paging_metadata.cursors.next {
                    Some(next) => request.cursor_paging.cursor = Some(next),
                    None => break,
                }
            }
            Ok(())
        }
        Command::Count { kind, fixture, filter_json } => {
            if let Some(p) = fixture {
                load_fixture(backend, &kind, &p).await?;
            }
            let filter = filter_arg(&kind, filter_json.as_deref())?;
            let n = backend.count(&kind, &filter).await?;
            writeln!(out, "{}", json!({"kind": kind, "count": n}))?;
            Ok(())
        }
    }
}
