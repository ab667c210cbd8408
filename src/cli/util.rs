use crate::query::{Order, SortSpec};

/// Parses `-price,+name,visible` into sort specs; no prefix means ascending.
pub fn parse_sort(s: &str) -> Vec<SortSpec> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|part| {
            if let Some(rest) = part.strip_prefix('-') {
                SortSpec { field_name: rest.to_string(), order: Order::Desc }
            } else {
                SortSpec::asc(part.strip_prefix('+').unwrap_or(part))
            }
        })
        .collect()
}
