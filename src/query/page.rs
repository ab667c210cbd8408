use crate::entity::{Entity, decode};
use crate::errors::{SdkError, SdkResult};
use crate::transport::RawPage;

use super::builder::QueryBuilder;
use super::types::{Cursors, PagingMetadata};

/// One page of query results with the query that produced it attached.
#[derive(Debug, Clone)]
pub struct ResultPage<E: Entity> {
    items: Vec<E>,
    paging: PagingMetadata,
    page_size: usize,
    query: QueryBuilder<E>,
}

impl<E: Entity> ResultPage<E> {
    /// `requested` stands in when the backend does not report the limit it applied.
    pub(crate) fn from_raw(query: QueryBuilder<E>, requested: usize, raw: RawPage) -> SdkResult<Self> {
        let items = raw.items.into_iter().map(decode::<E>).collect::<SdkResult<Vec<_>>>()?;
        let page_size = raw.paging_metadata.page_size.unwrap_or(requested);
        Ok(Self { items, paging: raw.paging_metadata, page_size, query })
    }

    #[must_use]
    pub fn items(&self) -> &[E] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<E> {
        self.items
    }

    #[must_use]
    pub const fn cursors(&self) -> &Cursors {
        &self.paging.cursors
    }

    #[must_use]
    pub const fn paging_metadata(&self) -> &PagingMetadata {
        &self.paging
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.paging.has_next && self.paging.cursors.next.is_some()
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.paging.cursors.prev.is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// The query this page was fetched with.
    #[must_use]
    pub const fn query(&self) -> &QueryBuilder<E> {
        &self.query
    }

    /// Fetches the following page.
    ///
    /// # Errors
    /// Validation error when this is the last page; otherwise whatever the backend returns.
    pub async fn next(&self) -> SdkResult<Self> {
        match &self.paging.cursors.next {
            Some(cursor) => self.query.resume(cursor.clone()).await,
            None => Err(SdkError::validation("no next page")),
        }
    }

    /// Fetches the preceding page.
    pub async fn prev(&self) -> SdkResult<Self> {
        match &self.paging.cursors.prev {
            Some(cursor) => self.query.resume(cursor.clone()).await,
            None => Err(SdkError::validation("no previous page")),
        }
    }
}
