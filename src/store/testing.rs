//! Test doubles for exercising degraded store paths.

use super::{ObjectEntry, ObjectStore, PutOptions, StoreError, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;

/// A store whose every request fails as if the endpoint were unreachable.
pub struct UnreachableStore;

fn unreachable(op: &'static str) -> StoreError {
    StoreError::Request {
        op,
        message: "dispatch failure: connection refused".into(),
    }
}

#[async_trait]
impl ObjectStore for UnreachableStore {
    async fn list_objects(&self) -> StoreResult<Vec<ObjectEntry>> {
        Err(unreachable("ListObjectsV2"))
    }

    async fn get_object(&self, _key: &str) -> StoreResult<Option<Bytes>> {
        Err(unreachable("GetObject"))
    }

    async fn put_object(&self, _key: &str, _body: Bytes, _opts: PutOptions) -> StoreResult<()> {
        Err(unreachable("PutObject"))
    }

    fn describe(&self) -> String {
        "unreachable".into()
    }
}

/// Wraps a store and holds `list_objects` open until `release` is notified.
///
/// `entered` fires once the listing has started and `read` after each
/// `get_object` completes, so a test can interleave other work with an
/// in-flight render.
pub struct GatedListStore<S> {
    inner: S,
    pub entered: Notify,
    pub read: Notify,
    pub release: Notify,
}

impl<S> GatedListStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entered: Notify::new(),
            read: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl<S: ObjectStore> ObjectStore for GatedListStore<S> {
    async fn list_objects(&self) -> StoreResult<Vec<ObjectEntry>> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.list_objects().await
    }

    async fn get_object(&self, key: &str) -> StoreResult<Option<Bytes>> {
        let result = self.inner.get_object(key).await;
        self.read.notify_one();
        result
    }

    async fn put_object(&self, key: &str, body: Bytes, opts: PutOptions) -> StoreResult<()> {
        self.inner.put_object(key, body, opts).await
    }

    fn describe(&self) -> String {
        format!("gated:{}", self.inner.describe())
    }
}
