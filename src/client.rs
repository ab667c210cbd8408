//! Typed entry points over a [`Backend`].

use crate::bulk::{ApplicationError, BulkCollector, BulkResponse, codes};
use crate::config::ClientConfig;
use crate::domain::{
    FulfillmentMethod, Item, Label, Menu, MenuOrderingSettings, Modifier, ModifierGroup, Operation, Rule, Section,
    Variant,
};
use crate::entity::{Entity, EntityDescriptor, REVISION_PATH, decode};
use crate::errors::{SdkError, SdkResult};
use crate::memory::InMemoryBackend;
use crate::query::{CursorPaging, Filter, PagingMetadata, QueryBuilder, validate_filter};
use crate::transport::Backend;
use crate::types::{EntityId, Revision};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Entry point: one per backend connection.
#[derive(Clone)]
pub struct Client {
    backend: Arc<dyn Backend>,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Client {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, config: ClientConfig) -> Self {
        Self { backend, config: Arc::new(config) }
    }

    /// A client over a fresh [`InMemoryBackend`]; the backend handle is returned for event subscription.
    #[must_use]
    pub fn in_memory(config: ClientConfig) -> (Self, Arc<InMemoryBackend>) {
        let backend = Arc::new(InMemoryBackend::new(config.clone()));
        (Self::new(backend.clone(), config), backend)
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn collection<E: Entity>(&self) -> EntityClient<E> {
        EntityClient {
            backend: Arc::clone(&self.backend),
            default_limit: self.config.default_limit_for(E::KIND, E::DEFAULT_LIMIT),
            detail_limit: self.config.bulk_error_detail_limit,
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub fn menus(&self) -> EntityClient<Menu> {
        self.collection()
    }

    #[must_use]
    pub fn sections(&self) -> EntityClient<Section> {
        self.collection()
    }

    #[must_use]
    pub fn items(&self) -> EntityClient<Item> {
        self.collection()
    }

    #[must_use]
    pub fn variants(&self) -> EntityClient<Variant> {
        self.collection()
    }

    #[must_use]
    pub fn labels(&self) -> EntityClient<Label> {
        self.collection()
    }

    #[must_use]
    pub fn modifiers(&self) -> EntityClient<Modifier> {
        self.collection()
    }

    #[must_use]
    pub fn modifier_groups(&self) -> EntityClient<ModifierGroup> {
        self.collection()
    }

    #[must_use]
    pub fn rules(&self) -> EntityClient<Rule> {
        self.collection()
    }

    #[must_use]
    pub fn operations(&self) -> EntityClient<Operation> {
        self.collection()
    }

    #[must_use]
    pub fn fulfillment_methods(&self) -> EntityClient<FulfillmentMethod> {
        self.collection()
    }

    #[must_use]
    pub fn menu_ordering_settings(&self) -> EntityClient<MenuOrderingSettings> {
        self.collection()
    }
}

/// A page from `list`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<E> {
    pub items: Vec<E>,
    pub paging_metadata: PagingMetadata,
}

/// CRUD, list, query, count and bulk calls for one entity type.
pub struct EntityClient<E: Entity> {
    backend: Arc<dyn Backend>,
    default_limit: usize,
    detail_limit: usize,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityClient<E> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            default_limit: self.default_limit,
            detail_limit: self.detail_limit,
            _entity: PhantomData,
        }
    }
}

fn required_id<E: Entity>(entity: &E) -> SdkResult<&EntityId> {
    entity
        .meta()
        .id
        .as_ref()
        .ok_or_else(|| SdkError::Validation(format!("{}: _id is required for update", E::KIND)))
}

fn one_result_per_item<T>(res: &BulkResponse<T>, sent: usize) -> SdkResult<()> {
    if res.len() == sent {
        return Ok(());
    }
    Err(SdkError::Transport(format!("backend returned {} results for {sent} items", res.len()).into()))
}

fn required_revision<E: Entity>(entity: &E) -> SdkResult<Revision> {
    entity
        .meta()
        .revision
        .ok_or_else(|| SdkError::Validation(format!("{}: revision is required for update", E::KIND)))
}

impl<E: Entity> EntityClient<E> {
    /// Creates `entity`; id, revision and timestamps come back from the service.
    ///
    /// # Errors
    /// `Validation` if required fields are missing, before anything is sent.
    pub async fn create(&self, entity: &E) -> SdkResult<E> {
        entity.validate_new()?;
        let doc = serde_json::to_value(entity)?;
        let saved = self.backend.create(E::KIND, doc).await?;
        decode(saved)
    }

    pub async fn get(&self, id: &EntityId) -> SdkResult<E> {
        decode(self.backend.get(E::KIND, id).await?)
    }

    /// Sends `entity` as an update guarded by its current revision.
    ///
    /// Fields left unset keep their stored value; use [`patch`](Self::patch)
    /// with explicit `null`s to clear them.
    ///
    /// # Errors
    /// `Conflict` when the stored revision moved on. Re-read and reapply; this
    /// call never retries on its own.
    pub async fn update(&self, entity: &E) -> SdkResult<E> {
        let id = required_id(entity)?;
        required_revision(entity)?;
        let doc = serde_json::to_value(entity)?;
        let saved = self.backend.update(E::KIND, id, doc).await?;
        decode(saved)
    }

    /// Replaces the named top-level fields at `revision`; a `null` value clears the field.
    pub async fn patch(&self, id: &EntityId, revision: Revision, fields: Value) -> SdkResult<E> {
        let Value::Object(mut obj) = fields else {
            return Err(SdkError::validation("patch must be a JSON object"));
        };
        obj.insert(REVISION_PATH.to_string(), serde_json::to_value(revision)?);
        decode(self.backend.update(E::KIND, id, Value::Object(obj)).await?)
    }

    pub async fn delete(&self, id: &EntityId) -> SdkResult<()> {
        self.backend.delete(E::KIND, id).await
    }

    /// Lists by id, or everything when `ids` is `None`, in id order.
    pub async fn list(&self, ids: Option<&[EntityId]>, paging: CursorPaging) -> SdkResult<ListResponse<E>> {
        let raw = self.backend.list(E::KIND, ids.map(<[EntityId]>::to_vec), paging).await?;
        let items = raw.items.into_iter().map(decode::<E>).collect::<SdkResult<Vec<_>>>()?;
        Ok(ListResponse { items, paging_metadata: raw.paging_metadata })
    }

    #[must_use]
    pub fn query(&self) -> QueryBuilder<E> {
        QueryBuilder::new(Arc::clone(&self.backend), self.default_limit)
    }

    /// Counts entities matching `filter`, or all of them.
    pub async fn count(&self, filter: Option<&Filter>) -> SdkResult<u64> {
        let filter = filter.cloned().unwrap_or_default();
        validate_filter(&filter, &EntityDescriptor::of::<E>())?;
        self.backend.count(E::KIND, &filter).await
    }

    /// Counts what `query` would return across all pages.
    pub async fn count_matching(&self, query: &QueryBuilder<E>) -> SdkResult<u64> {
        let filter = query.filter()?;
        self.backend.count(E::KIND, &filter).await
    }

    pub async fn bulk_create(&self, entities: &[E], return_entity: bool) -> SdkResult<BulkResponse<E>> {
        let plan = entities.iter().map(|e| {
            e.validate_new()?;
            Ok(serde_json::to_value(e)?)
        });
        self.bulk_dispatch(entities, plan, BulkWrite::Create, return_entity).await
    }

    pub async fn bulk_update(&self, entities: &[E], return_entity: bool) -> SdkResult<BulkResponse<E>> {
        let plan = entities.iter().map(|e| {
            required_id(e)?;
            required_revision(e)?;
            Ok(serde_json::to_value(e)?)
        });
        self.bulk_dispatch(entities, plan, BulkWrite::Update, return_entity).await
    }

    pub async fn bulk_delete(&self, ids: &[EntityId]) -> SdkResult<BulkResponse<E>> {
        let res = self.backend.bulk_delete(E::KIND, ids.to_vec()).await?;
        one_result_per_item(&res, ids.len())?;
        res.typed::<E>()
    }

    async fn send(&self, op: BulkWrite, docs: Vec<Value>, return_entity: bool) -> SdkResult<BulkResponse<Value>> {
        let sent = docs.len();
        let res = match op {
            BulkWrite::Create => self.backend.bulk_create(E::KIND, docs, return_entity).await?,
            BulkWrite::Update => self.backend.bulk_update(E::KIND, docs, return_entity).await?,
        };
        one_result_per_item(&res, sent)?;
        Ok(res)
    }

    // Items that fail local checks are reported in place without being sent.
    async fn bulk_dispatch(
        &self,
        entities: &[E],
        plan: impl Iterator<Item = SdkResult<Value>>,
        op: BulkWrite,
        return_entity: bool,
    ) -> SdkResult<BulkResponse<E>> {
        let mut outgoing = Vec::with_capacity(entities.len());
        let mut rejected = Vec::with_capacity(entities.len());
        for step in plan {
            match step {
                Ok(doc) => {
                    outgoing.push(doc);
                    rejected.push(None);
                }
                Err(e) => rejected.push(Some(ApplicationError::new(codes::VALIDATION_ERROR, e.to_string()))),
            }
        }
        if rejected.iter().all(Option::is_none) {
            return self.send(op, outgoing, return_entity).await?.typed::<E>();
        }

        let remote = if outgoing.is_empty() { Vec::new() } else { self.send(op, outgoing, return_entity).await?.results };
        let mut remote = remote.into_iter();
        let mut out = BulkCollector::new(entities.len(), self.detail_limit);
        for (entity, local) in entities.iter().zip(rejected) {
            match local {
                Some(err) => out.failure(entity.meta().id.clone(), err),
                None => {
                    if let Some(r) = remote.next() {
                        out.forward(r);
                    }
                }
            }
        }
        out.finish().typed::<E>()
    }
}

#[derive(Debug, Clone, Copy)]
enum BulkWrite {
    Create,
    Update,
}
