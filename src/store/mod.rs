//! Object-store abstraction shared by the listing and note paths.
//!
//! The service only ever needs three operations against one bucket, so the
//! trait stays that small. `S3ObjectStore` talks to any S3-compatible API;
//! `LocalObjectStore` maps keys onto a directory for development and tests.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::io;
use thiserror::Error;

pub mod local;
pub mod s3;
#[cfg(test)]
pub mod testing;

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

/// One entry of a bucket listing, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Headers stored alongside an object body.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{op} failed: {message}")]
    Request { op: &'static str, message: String },
    #[error("invalid object key `{0}`")]
    InvalidKey(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every object in the bucket, in backend order.
    async fn list_objects(&self) -> StoreResult<Vec<ObjectEntry>>;

    /// Object body, or `None` when the key does not exist.
    async fn get_object(&self, key: &str) -> StoreResult<Option<Bytes>>;

    /// Create or overwrite an object.
    async fn put_object(&self, key: &str, body: Bytes, opts: PutOptions) -> StoreResult<()>;

    /// Short backend label used in logs and diagnostics.
    fn describe(&self) -> String;
}
