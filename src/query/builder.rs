use crate::entity::{Entity, EntityDescriptor, FieldCaps, ID_PATH, QueryField};
use crate::errors::{SdkError, SdkResult};
use crate::transport::Backend;
use crate::types::CursorToken;
use crate::utils::bench::{self, Layer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::page::ResultPage;
use super::parse::filter_from_json;
use super::types::{
    CmpOp, CursorPaging, Filter, MAX_IN_SET, MAX_LIMIT, MAX_SORT_FIELDS, Order, QueryDescriptor, SortSpec,
};

/// Immutable query under construction for entity `E`.
///
/// Every chain call consumes the builder and returns a new one, so a partially
/// built query can be `clone()`d and extended in different directions. All
/// predicates are AND-combined, including repeated predicates on one field.
/// A field used with an operator it does not support makes `find()` fail
/// before anything is sent.
pub struct QueryBuilder<E: Entity> {
    backend: Arc<dyn Backend>,
    predicates: Vec<Filter>,
    sort: Vec<SortSpec>,
    limit: Option<usize>,
    default_limit: usize,
    cursor: Option<CursorToken>,
    invalid: Option<String>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for QueryBuilder<E> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            predicates: self.predicates.clone(),
            sort: self.sort.clone(),
            limit: self.limit,
            default_limit: self.default_limit,
            cursor: self.cursor.clone(),
            invalid: self.invalid.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for QueryBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("kind", &E::KIND)
            .field("predicates", &self.predicates)
            .field("sort", &self.sort)
            .field("limit", &self.limit)
            .field("cursor", &self.cursor)
            .field("invalid", &self.invalid)
            .finish()
    }
}

impl<E: Entity> QueryBuilder<E> {
    pub(crate) fn new(backend: Arc<dyn Backend>, default_limit: usize) -> Self {
        Self {
            backend,
            predicates: Vec::new(),
            sort: Vec::new(),
            limit: None,
            default_limit,
            cursor: None,
            invalid: None,
            _entity: PhantomData,
        }
    }

    fn reject(mut self, msg: String) -> Self {
        if self.invalid.is_none() {
            self.invalid = Some(msg);
        }
        self
    }

    fn push(self, field: E::Field, needed: FieldCaps, op: &str, pred: impl FnOnce(String) -> Filter) -> Self {
        if !field.caps().contains(needed) {
            let msg = format!("field '{}' of {} does not support {op}", field.path(), E::KIND);
            return self.reject(msg);
        }
        let mut next = self;
        next.predicates.push(pred(field.path().to_string()));
        next
    }

    fn cmp(self, field: E::Field, op: CmpOp, needed: FieldCaps, value: Value) -> Self {
        self.push(field, needed, op.wire(), |path| Filter::Cmp { path, op, value })
    }

    fn set(
        self,
        field: E::Field,
        needed: FieldCaps,
        op: &str,
        values: Vec<Value>,
        pred: impl FnOnce(String, Vec<Value>) -> Filter,
    ) -> Self {
        if values.len() > MAX_IN_SET {
            return self.reject(format!("{op} accepts at most {MAX_IN_SET} values"));
        }
        self.push(field, needed, op, |path| pred(path, values))
    }

    #[must_use]
    pub fn eq(self, field: E::Field, value: impl Into<Value>) -> Self {
        self.cmp(field, CmpOp::Eq, FieldCaps::EQ, value.into())
    }

    #[must_use]
    pub fn ne(self, field: E::Field, value: impl Into<Value>) -> Self {
        self.cmp(field, CmpOp::Ne, FieldCaps::EQ, value.into())
    }

    #[must_use]
    pub fn gt(self, field: E::Field, value: impl Into<Value>) -> Self {
        self.cmp(field, CmpOp::Gt, FieldCaps::RANGE, value.into())
    }

    #[must_use]
    pub fn ge(self, field: E::Field, value: impl Into<Value>) -> Self {
        self.cmp(field, CmpOp::Gte, FieldCaps::RANGE, value.into())
    }

    #[must_use]
    pub fn lt(self, field: E::Field, value: impl Into<Value>) -> Self {
        self.cmp(field, CmpOp::Lt, FieldCaps::RANGE, value.into())
    }

    #[must_use]
    pub fn le(self, field: E::Field, value: impl Into<Value>) -> Self {
        self.cmp(field, CmpOp::Lte, FieldCaps::RANGE, value.into())
    }

    /// Case-insensitive prefix match.
    #[must_use]
    pub fn starts_with(self, field: E::Field, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.push(field, FieldCaps::TEXT, "$startsWith", |path| Filter::StartsWith { path, prefix })
    }

    /// Case-insensitive substring match.
    #[must_use]
    pub fn contains(self, field: E::Field, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.push(field, FieldCaps::TEXT, "$contains", |path| Filter::Contains { path, needle })
    }

    #[must_use]
    pub fn is_in<V: Into<Value>>(self, field: E::Field, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.set(field, FieldCaps::EQ, "$in", values, |path, values| Filter::In { path, values })
    }

    #[must_use]
    pub fn not_in<V: Into<Value>>(self, field: E::Field, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.set(field, FieldCaps::EQ, "$nin", values, |path, values| Filter::Nin { path, values })
    }

    #[must_use]
    pub fn has_some<V: Into<Value>>(self, field: E::Field, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.set(field, FieldCaps::ARRAY, "$hasSome", values, |path, values| Filter::HasSome { path, values })
    }

    #[must_use]
    pub fn has_all<V: Into<Value>>(self, field: E::Field, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.set(field, FieldCaps::ARRAY, "$hasAll", values, |path, values| Filter::HasAll { path, values })
    }

    #[must_use]
    pub fn exists(self, field: E::Field, exists: bool) -> Self {
        self.push(field, FieldCaps::empty(), "$exists", |path| Filter::Exists { path, exists })
    }

    /// Appends a filter given in wire form, checked against `E`'s field set.
    #[must_use]
    pub fn filter_json(self, filter: &Value) -> Self {
        let parsed = filter_from_json(filter)
            .and_then(|f| validate_filter(&f, &EntityDescriptor::of::<E>()).map(|()| f));
        match parsed {
            Ok(f) if f.is_true() => self,
            Ok(f) => {
                let mut next = self;
                next.predicates.push(f);
                next
            }
            Err(e) => self.reject(e.to_string()),
        }
    }

    fn order_by(self, fields: impl IntoIterator<Item = E::Field>, order: Order) -> Self {
        let mut next = self;
        for field in fields {
            if !field.caps().contains(FieldCaps::SORT) {
                let msg = format!("field '{}' of {} is not sortable", field.path(), E::KIND);
                return next.reject(msg);
            }
            next.sort.push(SortSpec { field_name: field.path().to_string(), order });
        }
        next
    }

    /// Appends ascending sort keys after any already present.
    #[must_use]
    pub fn ascending(self, fields: impl IntoIterator<Item = E::Field>) -> Self {
        self.order_by(fields, Order::Asc)
    }

    #[must_use]
    pub fn descending(self, fields: impl IntoIterator<Item = E::Field>) -> Self {
        self.order_by(fields, Order::Desc)
    }

    /// Sort by a field named at runtime.
    #[must_use]
    pub fn sort_by(self, name: &str, order: Order) -> Self {
        match name.parse::<E::Field>() {
            Ok(field) => self.order_by([field], order),
            Err(e) => self.reject(e.to_string()),
        }
    }

    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Resumes from a cursor returned earlier; drops any filter and sort.
    #[must_use]
    pub fn skip_to(mut self, cursor: CursorToken) -> Self {
        self.predicates.clear();
        self.sort.clear();
        self.invalid = None;
        self.cursor = Some(cursor);
        self
    }

    /// Page size this builder asks for. A resumed cursor without an explicit
    /// limit keeps its own; [`ResultPage::page_size`] reports what was applied.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.limit.unwrap_or(self.default_limit)
    }

    /// The accumulated filter, or the first validation error.
    pub fn filter(&self) -> SdkResult<Filter> {
        if let Some(msg) = &self.invalid {
            return Err(SdkError::Validation(msg.clone()));
        }
        Ok(Filter::all_of(self.predicates.iter().cloned()))
    }

    /// Builds the request. Sort gets a trailing `_id` tie-break unless already present.
    pub fn descriptor(&self) -> SdkResult<QueryDescriptor> {
        let limit = self.page_size();
        if limit == 0 || limit > MAX_LIMIT {
            return Err(SdkError::Validation(format!("limit must be between 1 and {MAX_LIMIT}, got {limit}")));
        }
        // A cursor carries its own filter and sort, and its own page size unless one was set explicitly.
        if let Some(cursor) = &self.cursor {
            return Ok(QueryDescriptor {
                filter: Filter::True,
                sort: Vec::new(),
                cursor_paging: CursorPaging { limit: self.limit, cursor: Some(cursor.clone()) },
            });
        }
        let filter = self.filter()?;
        let mut sort = self.sort.clone();
        if !sort.iter().any(|s| s.field_name == ID_PATH) {
            sort.push(SortSpec::asc(ID_PATH));
        }
        if sort.len() > MAX_SORT_FIELDS {
            return Err(SdkError::Validation(format!("at most {MAX_SORT_FIELDS} sort fields are supported")));
        }
        Ok(QueryDescriptor { filter, sort, cursor_paging: CursorPaging { limit: Some(limit), cursor: None } })
    }

    /// Runs the query and returns the first page.
    pub async fn find(&self) -> SdkResult<ResultPage<E>> {
        let descriptor = self.descriptor()?;
        self.dispatch(descriptor).await
    }

    /// Fetches the page behind `cursor`; the returned page keeps this query attached.
    pub(crate) async fn resume(&self, cursor: CursorToken) -> SdkResult<ResultPage<E>> {
        let descriptor = QueryDescriptor {
            filter: Filter::True,
            sort: Vec::new(),
            cursor_paging: CursorPaging { limit: self.limit, cursor: Some(cursor) },
        };
        self.dispatch(descriptor).await
    }

    async fn dispatch(&self, descriptor: QueryDescriptor) -> SdkResult<ResultPage<E>> {
        let op = if descriptor.has_cursor() { "resume" } else { "find" };
        let timer = bench::start(Layer::Client, op, E::KIND);
        log::debug!("query {} {}", E::KIND, serde_json::to_string(&descriptor).unwrap_or_default());
        let raw = self.backend.query(E::KIND, &descriptor).await?;
        timer.finish(raw.items.len(), 0);
        ResultPage::from_raw(self.clone(), self.page_size(), raw)
    }
}

/// Checks every predicate of `filter` against the declared field set.
pub fn validate_filter(filter: &Filter, entity: &EntityDescriptor) -> SdkResult<()> {
    match filter {
        Filter::True => Ok(()),
        Filter::And(fs) | Filter::Or(fs) => fs.iter().try_for_each(|f| validate_filter(f, entity)),
        Filter::Not(f) => validate_filter(f, entity),
        Filter::Exists { path, .. } => entity.require(path, FieldCaps::empty(), "$exists"),
        Filter::In { path, .. } => entity.require(path, FieldCaps::EQ, "$in"),
        Filter::Nin { path, .. } => entity.require(path, FieldCaps::EQ, "$nin"),
        Filter::HasSome { path, .. } => entity.require(path, FieldCaps::ARRAY, "$hasSome"),
        Filter::HasAll { path, .. } => entity.require(path, FieldCaps::ARRAY, "$hasAll"),
        Filter::StartsWith { path, .. } => entity.require(path, FieldCaps::TEXT, "$startsWith"),
        Filter::Contains { path, .. } => entity.require(path, FieldCaps::TEXT, "$contains"),
        Filter::Cmp { path, op, .. } => {
            let needed = match op {
                CmpOp::Eq | CmpOp::Ne => FieldCaps::EQ,
                CmpOp::Gt | CmpOp::Gte | CmpOp::Lt | CmpOp::Lte => FieldCaps::RANGE,
            };
            entity.require(path, needed, op.wire())
        }
    }
}

/// Checks that every sort key names a sortable field.
pub fn validate_sort(sort: &[SortSpec], entity: &EntityDescriptor) -> SdkResult<()> {
    if sort.len() > MAX_SORT_FIELDS {
        return Err(SdkError::Validation(format!("at most {MAX_SORT_FIELDS} sort fields are supported")));
    }
    sort.iter().try_for_each(|s| entity.require(&s.field_name, FieldCaps::SORT, "sorting"))
}
