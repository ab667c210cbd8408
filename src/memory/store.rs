use super::cursor::{CursorCodec, CursorState, Direction};
use crate::bulk::{ApplicationError, BulkCollector, BulkResponse, codes};
use crate::config::ClientConfig;
use crate::domain::describe_kind;
use crate::entity::{CREATED_PATH, EntityDescriptor, ID_PATH, READ_ONLY_PATHS, REVISION_PATH, UPDATED_PATH};
use crate::errors::{SdkError, SdkResult};
use crate::events::{DomainEvent, DomainEventBody};
use crate::query::{
    CursorPaging, Cursors, Filter, MAX_LIMIT, MAX_SORT_FIELDS, PagingMetadata, QueryDescriptor, SortKey, SortSpec,
    compare_keys, eval_filter, filter_from_json, filter_to_json, sort_key, validate_filter, validate_sort,
};
use crate::transport::{Backend, RawPage};
use crate::types::{EntityId, Revision};
use crate::utils::bench::{self, Layer};
use crate::utils::logger::AUDIT_TARGET;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Default)]
struct State {
    collections: HashMap<&'static str, BTreeMap<String, Value>>,
    // Survives deletion so a re-created id keeps counting up.
    sequences: HashMap<(&'static str, String), u64>,
}

/// In-process implementation of the remote menus service.
///
/// Documents are stored per entity kind in id order. Every mutation bumps the
/// revision, stamps `_updatedDate` and publishes a [`DomainEvent`].
pub struct InMemoryBackend {
    state: RwLock<State>,
    cursors: CursorCodec,
    config: ClientConfig,
    events: broadcast::Sender<DomainEvent>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.state.read();
        let sizes: BTreeMap<_, _> = st.collections.iter().map(|(k, c)| (*k, c.len())).collect();
        f.debug_struct("InMemoryBackend").field("collections", &sizes).finish_non_exhaustive()
    }
}

fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn describe(kind: &str) -> SdkResult<EntityDescriptor> {
    describe_kind(kind).ok_or_else(|| SdkError::Validation(format!("unknown entity kind '{kind}'")))
}

fn into_object(doc: Value) -> SdkResult<Map<String, Value>> {
    match doc {
        Value::Object(m) => Ok(m),
        other => Err(SdkError::Validation(format!("expected a JSON object, got {other}"))),
    }
}

fn revision_of(doc: &Value) -> Option<Revision> {
    doc.get(REVISION_PATH).and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Replaces each top-level field named in `patch`; `null` removes it.
///
/// Nested objects are swapped whole so a one-of field never keeps its old variant.
fn apply_fields(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (k, v) in patch {
        if v.is_null() {
            target.remove(&k);
        } else {
            target.insert(k, v);
        }
    }
}

fn application_error(e: &SdkError) -> ApplicationError {
    match e {
        SdkError::Conflict { current, .. } => ApplicationError::new(codes::REVISION_MISMATCH, e.to_string())
            .with_data(json!({ "currentRevision": current })),
        SdkError::NotFound { .. } => ApplicationError::new(codes::NOT_FOUND, e.to_string()),
        SdkError::AlreadyExists { .. } => ApplicationError::new(codes::ALREADY_EXISTS, e.to_string()),
        _ => ApplicationError::new(codes::VALIDATION_ERROR, e.to_string()),
    }
}

fn audit(op: &str, kind: &str, id: &EntityId, doc: Option<&Value>) {
    let rev = doc.and_then(revision_of).map(|r| r.to_string()).unwrap_or_else(|| "-".into());
    log::info!(target: AUDIT_TARGET, "op={op} kind={kind} id={id} revision={rev}");
}

impl State {
    fn event(&mut self, desc: &EntityDescriptor, id: &EntityId, slug: &str, body: DomainEventBody) -> DomainEvent {
        let seq = self.sequences.entry((desc.kind, id.0.clone())).or_insert(0);
        *seq += 1;
        DomainEvent {
            id: Uuid::new_v4().to_string(),
            entity_fqdn: desc.fqdn.to_string(),
            slug: slug.to_string(),
            entity_id: id.clone(),
            event_time: Utc::now(),
            entity_event_sequence: *seq,
            body,
        }
    }

    fn insert(&mut self, desc: &EntityDescriptor, doc: Value) -> SdkResult<(Value, DomainEvent)> {
        let mut obj = into_object(doc)?;
        let id = match obj.remove(ID_PATH) {
            Some(Value::String(s)) if !s.is_empty() => EntityId(s),
            None | Some(Value::Null) => EntityId::generate(),
            Some(other) => return Err(SdkError::Validation(format!("_id must be a string, got {other}"))),
        };
        let coll = self.collections.entry(desc.kind).or_default();
        if coll.contains_key(id.as_str()) {
            return Err(SdkError::AlreadyExists { kind: desc.kind.to_string(), id: id.0 });
        }
        for key in READ_ONLY_PATHS {
            obj.remove(key);
        }
        let now = now_ts();
        obj.insert(ID_PATH.to_string(), Value::String(id.0.clone()));
        obj.insert(REVISION_PATH.to_string(), Value::String(Revision::INITIAL.to_string()));
        obj.insert(CREATED_PATH.to_string(), Value::String(now.clone()));
        obj.insert(UPDATED_PATH.to_string(), Value::String(now));
        let doc = Value::Object(obj);
        coll.insert(id.0.clone(), doc.clone());
        audit("create", desc.kind, &id, Some(&doc));
        let event = self.event(desc, &id, "created", DomainEventBody::Created { entity: doc.clone(), restore_info: None });
        Ok((doc, event))
    }

    fn modify(&mut self, desc: &EntityDescriptor, id: &EntityId, patch: Value) -> SdkResult<(Value, DomainEvent)> {
        let mut patch = into_object(patch)?;
        let submitted: Revision = match patch.get(REVISION_PATH) {
            None | Some(Value::Null) => return Err(SdkError::validation("revision is required for update")),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|_| SdkError::validation("revision must be a non-negative integer"))?,
        };
        let not_found = || SdkError::NotFound { kind: desc.kind.to_string(), id: id.0.clone() };
        let stored = self
            .collections
            .get_mut(desc.kind)
            .and_then(|c| c.get_mut(id.as_str()))
            .ok_or_else(not_found)?;
        let current = revision_of(stored).unwrap_or(Revision::INITIAL);
        if current != submitted {
            return Err(SdkError::Conflict {
                id: id.0.clone(),
                submitted: submitted.to_string(),
                current: current.to_string(),
            });
        }
        for key in READ_ONLY_PATHS {
            patch.remove(key);
        }
        if let Value::Object(obj) = stored {
            apply_fields(obj, patch);
            obj.insert(REVISION_PATH.to_string(), Value::String(current.next().to_string()));
            obj.insert(UPDATED_PATH.to_string(), Value::String(now_ts()));
        }
        let doc = stored.clone();
        audit("update", desc.kind, id, Some(&doc));
        let event = self.event(desc, id, "updated", DomainEventBody::Updated { current_entity: doc.clone() });
        Ok((doc, event))
    }

    fn remove(&mut self, desc: &EntityDescriptor, id: &EntityId) -> SdkResult<DomainEvent> {
        let doc = self
            .collections
            .get_mut(desc.kind)
            .and_then(|c| c.remove(id.as_str()))
            .ok_or_else(|| SdkError::NotFound { kind: desc.kind.to_string(), id: id.0.clone() })?;
        audit("delete", desc.kind, id, Some(&doc));
        Ok(self.event(desc, id, "deleted", DomainEventBody::Deleted { deleted_entity: Some(doc) }))
    }
}

impl InMemoryBackend {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer.max(1));
        Self { state: RwLock::new(State::default()), cursors: CursorCodec::new(config.cursor_ttl_secs), config, events }
    }

    /// Domain events for every successful mutation, in commit order.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    /// Number of stored documents of `kind`.
    #[must_use]
    pub fn len(&self, kind: &str) -> usize {
        self.state.read().collections.get(kind).map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn is_empty(&self, kind: &str) -> bool {
        self.len(kind) == 0
    }

    fn publish(&self, events: Vec<DomainEvent>) {
        for e in events {
            // No subscribers is fine.
            let _ = self.events.send(e);
        }
    }

    fn collector(&self, len: usize) -> BulkCollector {
        BulkCollector::new(len, self.config.bulk_error_detail_limit)
    }

    fn run_query(&self, desc: &EntityDescriptor, request: &QueryDescriptor) -> SdkResult<RawPage> {
        self.run_query_at(desc, request, Utc::now())
    }

    fn run_query_at(&self, desc: &EntityDescriptor, request: &QueryDescriptor, now: DateTime<Utc>) -> SdkResult<RawPage> {
        let fallback_limit = self.config.default_limit_for(desc.kind, desc.default_limit);
        let (filter, sort, anchor, limit) = match &request.cursor_paging.cursor {
            Some(token) => {
                let state = self.cursors.decode(desc.kind, token, now)?;
                let filter = filter_from_json(&state.filter).map_err(|e| SdkError::InvalidCursor(e.to_string()))?;
                let limit = request.cursor_paging.limit.unwrap_or(state.limit);
                (filter, state.sort, Some((state.anchor, state.direction)), limit)
            }
            None => {
                validate_filter(&request.filter, desc)?;
                validate_sort(&request.sort, desc)?;
                let mut sort = request.sort.clone();
                if !sort.iter().any(|s| s.field_name == ID_PATH) {
                    sort.push(SortSpec::asc(ID_PATH));
                }
                if sort.len() > MAX_SORT_FIELDS {
                    return Err(SdkError::Validation(format!("at most {MAX_SORT_FIELDS} sort fields are supported")));
                }
                let limit = request.cursor_paging.limit.unwrap_or(fallback_limit);
                (request.filter.clone(), sort, None, limit)
            }
        };
        if limit == 0 || limit > MAX_LIMIT {
            return Err(SdkError::Validation(format!("limit must be between 1 and {MAX_LIMIT}, got {limit}")));
        }

        let mut rows: Vec<(SortKey, Value)> = {
            let st = self.state.read();
            st.collections
                .get(desc.kind)
                .map(|c| {
                    c.values()
                        .filter(|d| eval_filter(d, &filter))
                        .map(|d| (sort_key(d, &sort), d.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };
        rows.sort_by(|a, b| compare_keys(&a.0, &b.0, &sort));

        let (start, end) = match &anchor {
            None => (0, limit.min(rows.len())),
            Some((key, Direction::Next)) => {
                let s = rows.partition_point(|r| compare_keys(&r.0, key, &sort) != Ordering::Greater);
                (s, (s + limit).min(rows.len()))
            }
            Some((key, Direction::Prev)) => {
                let e = rows.partition_point(|r| compare_keys(&r.0, key, &sort) == Ordering::Less);
                (e.saturating_sub(limit), e)
            }
        };

        // An empty page carries no cursors.
        let wire_filter = filter_to_json(&filter);
        let cursor_at = |idx: usize, direction: Direction| {
            self.cursors.encode(&CursorState {
                kind: desc.kind.to_string(),
                filter: wire_filter.clone(),
                sort: sort.clone(),
                anchor: rows[idx].0.clone(),
                direction,
                limit,
                issued_at: now,
            })
        };
        let non_empty = end > start;
        let next = if non_empty && end < rows.len() { Some(cursor_at(end - 1, Direction::Next)?) } else { None };
        let prev = if non_empty && start > 0 { Some(cursor_at(start, Direction::Prev)?) } else { None };

        let items: Vec<Value> = rows.drain(start..end).map(|(_, d)| d).collect();
        Ok(RawPage {
            paging_metadata: PagingMetadata {
                count: items.len(),
                has_next: next.is_some(),
                cursors: Cursors { next, prev },
                page_size: Some(limit),
            },
            items,
        })
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn create(&self, kind: &str, doc: Value) -> SdkResult<Value> {
        let desc = describe(kind)?;
        let (saved, event) = self.state.write().insert(&desc, doc)?;
        self.publish(vec![event]);
        Ok(saved)
    }

    async fn get(&self, kind: &str, id: &EntityId) -> SdkResult<Value> {
        let desc = describe(kind)?;
        self.state
            .read()
            .collections
            .get(desc.kind)
            .and_then(|c| c.get(id.as_str()))
            .cloned()
            .ok_or_else(|| SdkError::NotFound { kind: desc.kind.to_string(), id: id.0.clone() })
    }

    async fn update(&self, kind: &str, id: &EntityId, patch: Value) -> SdkResult<Value> {
        let desc = describe(kind)?;
        let (saved, event) = self.state.write().modify(&desc, id, patch)?;
        self.publish(vec![event]);
        Ok(saved)
    }

    async fn delete(&self, kind: &str, id: &EntityId) -> SdkResult<()> {
        let desc = describe(kind)?;
        let event = self.state.write().remove(&desc, id)?;
        self.publish(vec![event]);
        Ok(())
    }

    async fn list(&self, kind: &str, ids: Option<Vec<EntityId>>, paging: CursorPaging) -> SdkResult<RawPage> {
        let desc = describe(kind)?;
        if paging.limit.is_some_and(|l| l > desc.max_list) {
            return Err(SdkError::Validation(format!("{kind}: list returns at most {} items", desc.max_list)));
        }
        let filter = match ids {
            Some(ids) if ids.len() > desc.max_list => {
                return Err(SdkError::Validation(format!("{kind}: at most {} ids per list", desc.max_list)));
            }
            Some(ids) => Filter::In { path: ID_PATH.to_string(), values: ids.into_iter().map(|i| Value::String(i.0)).collect() },
            None => Filter::True,
        };
        let request = QueryDescriptor {
            filter,
            sort: vec![SortSpec::asc(ID_PATH)],
            cursor_paging: CursorPaging {
                limit: paging.limit.or_else(|| paging.cursor.is_none().then_some(desc.max_list)),
                cursor: paging.cursor,
            },
        };
        self.run_query(&desc, &request)
    }

    async fn query(&self, kind: &str, descriptor: &QueryDescriptor) -> SdkResult<RawPage> {
        let desc = describe(kind)?;
        self.run_query(&desc, descriptor)
    }

    async fn count(&self, kind: &str, filter: &Filter) -> SdkResult<u64> {
        let timer = bench::start(Layer::Backend, "count", kind);
        let desc = describe(kind)?;
        validate_filter(filter, &desc)?;
        let n = self
            .state
            .read()
            .collections
            .get(desc.kind)
            .map_or(0, |c| c.values().filter(|d| eval_filter(d, filter)).count());
        timer.finish(n, 0);
        Ok(n as u64)
    }

    async fn bulk_create(&self, kind: &str, docs: Vec<Value>, return_entity: bool) -> SdkResult<BulkResponse<Value>> {
        let timer = bench::start(Layer::Backend, "bulk_create", kind);
        let desc = describe(kind)?;
        let mut out = self.collector(docs.len());
        let mut events = Vec::with_capacity(docs.len());
        {
            let mut st = self.state.write();
            for doc in docs {
                let hint = doc.get(ID_PATH).and_then(Value::as_str).map(EntityId::from);
                match st.insert(&desc, doc) {
                    Ok((saved, event)) => {
                        out.success(event.entity_id.clone(), return_entity.then_some(saved));
                        events.push(event);
                    }
                    Err(e) => out.failure(hint, application_error(&e)),
                }
            }
        }
        self.publish(events);
        let res = out.finish();
        timer.finish(res.len(), res.bulk_action_metadata.total_failures);
        Ok(res)
    }

    async fn bulk_update(&self, kind: &str, patches: Vec<Value>, return_entity: bool) -> SdkResult<BulkResponse<Value>> {
        let timer = bench::start(Layer::Backend, "bulk_update", kind);
        let desc = describe(kind)?;
        let mut out = self.collector(patches.len());
        let mut events = Vec::with_capacity(patches.len());
        {
            let mut st = self.state.write();
            for patch in patches {
                let Some(id) = patch.get(ID_PATH).and_then(Value::as_str).map(EntityId::from) else {
                    out.failure(None, ApplicationError::new(codes::VALIDATION_ERROR, "_id is required for update"));
                    continue;
                };
                match st.modify(&desc, &id, patch) {
                    Ok((saved, event)) => {
                        out.success(id, return_entity.then_some(saved));
                        events.push(event);
                    }
                    Err(e) => out.failure(Some(id), application_error(&e)),
                }
            }
        }
        self.publish(events);
        let res = out.finish();
        timer.finish(res.len(), res.bulk_action_metadata.total_failures);
        Ok(res)
    }

    async fn bulk_delete(&self, kind: &str, ids: Vec<EntityId>) -> SdkResult<BulkResponse<Value>> {
        let timer = bench::start(Layer::Backend, "bulk_delete", kind);
        let desc = describe(kind)?;
        let mut out = self.collector(ids.len());
        let mut events = Vec::with_capacity(ids.len());
        {
            let mut st = self.state.write();
            for id in ids {
                match st.remove(&desc, &id) {
                    Ok(event) => {
                        out.success(id, None);
                        events.push(event);
                    }
                    Err(e) => out.failure(Some(id), application_error(&e)),
                }
            }
        }
        self.publish(events);
        let res = out.finish();
        timer.finish(res.len(), res.bulk_action_metadata.total_failures);
        Ok(res)
    }
}
