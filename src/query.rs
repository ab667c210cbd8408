//! Filter model, wire codec, in-memory evaluation and the typed query builder.

mod builder;
mod eval;
mod page;
mod parse;
mod types;

pub use builder::{QueryBuilder, validate_filter, validate_sort};
pub use eval::{SortKey, compare_docs, compare_json, compare_keys, eval_filter, get_path, sort_key};
pub use page::ResultPage;
pub use parse::{filter_from_json, filter_to_json, parse_filter_json};
pub use types::{CmpOp, CursorPaging, Cursors, Filter, Order, PagingMetadata, QueryDescriptor, SortSpec};

pub(crate) use types::{MAX_LIMIT, MAX_SORT_FIELDS};
