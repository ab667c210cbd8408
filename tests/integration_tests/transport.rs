use async_trait::async_trait;
use menukit::domain::{Menu, MenuField};
use menukit::query::{CursorPaging, Filter, QueryDescriptor};
use menukit::{Backend, BulkResponse, Client, ClientConfig, EntityId, InMemoryBackend, RawPage, SdkError, SdkResult};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
struct Offline;

impl std::fmt::Display for Offline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("connection refused")
    }
}

impl std::error::Error for Offline {}

/// Fails every call and counts how many reached it.
#[derive(Default)]
struct DownBackend {
    calls: AtomicUsize,
}

impl DownBackend {
    fn fail<T>(&self) -> SdkResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SdkError::Transport(Box::new(Offline)))
    }
}

#[async_trait]
impl Backend for DownBackend {
    async fn create(&self, _: &str, _: Value) -> SdkResult<Value> {
        self.fail()
    }
    async fn get(&self, _: &str, _: &EntityId) -> SdkResult<Value> {
        self.fail()
    }
    async fn update(&self, _: &str, _: &EntityId, _: Value) -> SdkResult<Value> {
        self.fail()
    }
    async fn delete(&self, _: &str, _: &EntityId) -> SdkResult<()> {
        self.fail()
    }
    async fn list(&self, _: &str, _: Option<Vec<EntityId>>, _: CursorPaging) -> SdkResult<RawPage> {
        self.fail()
    }
    async fn query(&self, _: &str, _: &QueryDescriptor) -> SdkResult<RawPage> {
        self.fail()
    }
    async fn count(&self, _: &str, _: &Filter) -> SdkResult<u64> {
        self.fail()
    }
    async fn bulk_create(&self, _: &str, _: Vec<Value>, _: bool) -> SdkResult<BulkResponse<Value>> {
        self.fail()
    }
    async fn bulk_update(&self, _: &str, _: Vec<Value>, _: bool) -> SdkResult<BulkResponse<Value>> {
        self.fail()
    }
    async fn bulk_delete(&self, _: &str, _: Vec<EntityId>) -> SdkResult<BulkResponse<Value>> {
        self.fail()
    }
}

#[tokio::test]
async fn transport_errors_pass_through_unchanged() {
    let backend = Arc::new(DownBackend::default());
    let client = Client::new(backend.clone(), ClientConfig::default());

    let err = client.menus().create(&Menu::named("Dinner")).await.unwrap_err();
    match err {
        SdkError::Transport(inner) => assert_eq!(inner.to_string(), "connection refused"),
        other => panic!("expected transport error, got {other:?}"),
    }
    let err = client.menus().query().eq(MenuField::Visible, true).find().await.unwrap_err();
    assert!(matches!(err, SdkError::Transport(_)));
    assert!(!err.requires_restart());
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn validation_happens_before_any_call() {
    let backend = Arc::new(DownBackend::default());
    let client = Client::new(backend.clone(), ClientConfig::default());

    assert!(matches!(client.menus().create(&Menu::named("")).await, Err(SdkError::Validation(_))));
    let bad = client.menus().query().filter_json(&serde_json::json!({"nope": 1}));
    assert!(matches!(bad.find().await, Err(SdkError::Validation(_))));
    assert!(matches!(client.menus().count_matching(&bad).await, Err(SdkError::Validation(_))));
    // Every item rejected locally: nothing is sent.
    let res = client.menus().bulk_create(&[Menu::named("")], false).await.unwrap();
    assert_eq!(res.bulk_action_metadata.total_failures, 1);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

/// Forwards to an in-memory store but drops the last result of every bulk call.
#[derive(Default)]
struct LossyBackend {
    inner: InMemoryBackend,
}

fn drop_last(mut res: BulkResponse<Value>) -> SdkResult<BulkResponse<Value>> {
    res.results.pop();
    Ok(res)
}

#[async_trait]
impl Backend for LossyBackend {
    async fn create(&self, kind: &str, doc: Value) -> SdkResult<Value> {
        self.inner.create(kind, doc).await
    }
    async fn get(&self, kind: &str, id: &EntityId) -> SdkResult<Value> {
        self.inner.get(kind, id).await
    }
    async fn update(&self, kind: &str, id: &EntityId, patch: Value) -> SdkResult<Value> {
        self.inner.update(kind, id, patch).await
    }
    async fn delete(&self, kind: &str, id: &EntityId) -> SdkResult<()> {
        self.inner.delete(kind, id).await
    }
    async fn list(&self, kind: &str, ids: Option<Vec<EntityId>>, paging: CursorPaging) -> SdkResult<RawPage> {
        self.inner.list(kind, ids, paging).await
    }
    async fn query(&self, kind: &str, descriptor: &QueryDescriptor) -> SdkResult<RawPage> {
        self.inner.query(kind, descriptor).await
    }
    async fn count(&self, kind: &str, filter: &Filter) -> SdkResult<u64> {
        self.inner.count(kind, filter).await
    }
    async fn bulk_create(&self, kind: &str, docs: Vec<Value>, ret: bool) -> SdkResult<BulkResponse<Value>> {
        drop_last(self.inner.bulk_create(kind, docs, ret).await?)
    }
    async fn bulk_update(&self, kind: &str, patches: Vec<Value>, ret: bool) -> SdkResult<BulkResponse<Value>> {
        drop_last(self.inner.bulk_update(kind, patches, ret).await?)
    }
    async fn bulk_delete(&self, kind: &str, ids: Vec<EntityId>) -> SdkResult<BulkResponse<Value>> {
        drop_last(self.inner.bulk_delete(kind, ids).await?)
    }
}

#[tokio::test]
async fn short_bulk_responses_are_transport_errors() {
    let client = Client::new(Arc::new(LossyBackend::default()), ClientConfig::default());
    let menus = client.menus();
    let valid = [Menu::named("Lunch"), Menu::named("Dinner"), Menu::named("Brunch")];

    let err = menus.bulk_create(&valid, false).await.unwrap_err();
    assert!(matches!(err, SdkError::Transport(_)), "{err:?}");

    let mixed = [Menu::named("Lunch"), Menu::named(""), Menu::named("Dinner")];
    let err = menus.bulk_create(&mixed, false).await.unwrap_err();
    assert!(matches!(err, SdkError::Transport(_)), "{err:?}");

    let saved = menus.create(&Menu::named("Tea")).await.unwrap();
    let err = menus.bulk_update(&[saved.clone()], false).await.unwrap_err();
    assert!(matches!(err, SdkError::Transport(_)), "{err:?}");

    let ids = [saved.meta.id.clone().unwrap(), EntityId::from("missing")];
    let err = menus.bulk_delete(&ids).await.unwrap_err();
    assert!(matches!(err, SdkError::Transport(_)), "{err:?}");
}
