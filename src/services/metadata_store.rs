//! MetadataStore — notes persisted as one JSON document inside the bucket.
//!
//! The document lives at [`METADATA_KEY`] and maps object key → note. Writes
//! are read-modify-write of the whole document with no locking; concurrent
//! writers race and the last one wins.

use crate::{
    models::note::NoteMap,
    services::page_cache::PageCache,
    store::{ObjectStore, PutOptions, StoreError},
};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Reserved object key holding the notes document. Never listed.
pub const METADATA_KEY: &str = "_metadata.json";

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("object key must not be empty")]
    EmptyKey,
    #[error("`{0}` is reserved for the notes document")]
    ReservedKey(String),
    #[error("encoding notes document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct MetadataStore {
    store: Arc<dyn ObjectStore>,
    page_cache: Arc<PageCache>,
}

impl MetadataStore {
    pub fn new(store: Arc<dyn ObjectStore>, page_cache: Arc<PageCache>) -> Self {
        Self { store, page_cache }
    }

    /// Read the notes document.
    ///
    /// A missing, unreadable or malformed document reads as "no notes".
    pub async fn get(&self) -> NoteMap {
        let body = match self.store.get_object(METADATA_KEY).await {
            Ok(Some(body)) => body,
            Ok(None) => {
                debug!("no notes document yet");
                return NoteMap::new();
            }
            Err(err) => {
                warn!("reading notes document failed, treating as empty: {}", err);
                return NoteMap::new();
            }
        };

        match serde_json::from_slice::<NoteMap>(&body) {
            Ok(notes) => notes,
            Err(err) => {
                warn!("notes document is not a string map, treating as empty: {}", err);
                NoteMap::new()
            }
        }
    }

    /// Attach `note` to `key`, or remove the entry when `note` is blank.
    ///
    /// Writes the full document back and invalidates the page cache.
    pub async fn set(&self, key: &str, note: &str) -> Result<NoteMap, NoteError> {
        if key.is_empty() {
            return Err(NoteError::EmptyKey);
        }
        if key == METADATA_KEY {
            return Err(NoteError::ReservedKey(key.to_string()));
        }

        let mut notes = self.get().await;
        if note.trim().is_empty() {
            notes.remove(key);
        } else {
            notes.insert(key.to_string(), note.to_string());
        }

        let body = serde_json::to_vec_pretty(&notes)?;
        self.store
            .put_object(
                METADATA_KEY,
                Bytes::from(body),
                PutOptions {
                    content_type: Some("application/json".into()),
                    cache_control: Some("no-cache".into()),
                },
            )
            .await?;

        self.page_cache.invalidate().await;
        info!(key, cleared = note.trim().is_empty(), "saved note");
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LocalObjectStore, testing::UnreachableStore};
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};

    fn local_notes() -> (TempDir, Arc<LocalObjectStore>, Arc<PageCache>, MetadataStore) {
        let dir = tempdir().unwrap();
        let store = Arc::new(LocalObjectStore::new(dir.path()));
        let cache = Arc::new(PageCache::new(Duration::from_secs(60)));
        let notes = MetadataStore::new(store.clone(), cache.clone());
        (dir, store, cache, notes)
    }

    #[tokio::test]
    async fn missing_document_reads_as_empty() {
        let (_dir, _store, _cache, notes) = local_notes();
        assert!(notes.get().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_document_reads_as_empty() {
        let (_dir, store, _cache, notes) = local_notes();
        for body in [
            &b"{not json"[..],
            &b"[1, 2, 3]"[..],
            &b"{\"a.txt\": 5}"[..],
        ] {
            store
                .put_object(METADATA_KEY, Bytes::copy_from_slice(body), PutOptions::default())
                .await
                .unwrap();
            assert!(notes.get().await.is_empty());
        }
    }

    #[tokio::test]
    async fn unreachable_store_reads_as_empty() {
        let notes = MetadataStore::new(
            Arc::new(UnreachableStore),
            Arc::new(PageCache::new(Duration::ZERO)),
        );
        assert!(notes.get().await.is_empty());
    }

    #[tokio::test]
    async fn saved_note_round_trips() {
        let (_dir, _store, _cache, notes) = local_notes();
        notes.set("report.pdf", "x").await.unwrap();
        assert_eq!(notes.get().await.get("report.pdf").map(String::as_str), Some("x"));
    }

    #[tokio::test]
    async fn upsert_keeps_other_entries() {
        let (_dir, _store, _cache, notes) = local_notes();
        notes.set("a.txt", "first").await.unwrap();
        notes.set("b.txt", "second").await.unwrap();
        notes.set("a.txt", "  edited  ").await.unwrap();

        let map = notes.get().await;
        assert_eq!(map.len(), 2);
        assert_eq!(map["a.txt"], "  edited  ");
        assert_eq!(map["b.txt"], "second");
    }

    #[tokio::test]
    async fn blank_note_removes_entry() {
        let (_dir, store, _cache, notes) = local_notes();
        notes.set("a.txt", "keep me").await.unwrap();
        notes.set("b.txt", "drop me").await.unwrap();
        notes.set("b.txt", " \n\t ").await.unwrap();
        notes.set("never-noted.txt", "").await.unwrap();

        let raw = store.get_object(METADATA_KEY).await.unwrap().unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(doc, serde_json::json!({ "a.txt": "keep me" }));
    }

    #[tokio::test]
    async fn document_is_pretty_printed() {
        let (_dir, store, _cache, notes) = local_notes();
        notes.set("a.txt", "hello").await.unwrap();

        let raw = store.get_object(METADATA_KEY).await.unwrap().unwrap();
        assert_eq!(
            std::str::from_utf8(&raw).unwrap(),
            "{\n  \"a.txt\": \"hello\"\n}"
        );
    }

    #[tokio::test]
    async fn save_invalidates_page_cache() {
        let (_dir, _store, cache, notes) = local_notes();
        let generation = cache.generation().await;
        cache
            .store_if_current(generation, "<html>stale</html>".into())
            .await;
        notes.set("a.txt", "note").await.unwrap();
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn reserved_and_empty_keys_are_rejected() {
        let (_dir, _store, _cache, notes) = local_notes();
        assert!(matches!(notes.set("", "x").await, Err(NoteError::EmptyKey)));
        assert!(matches!(
            notes.set(METADATA_KEY, "x").await,
            Err(NoteError::ReservedKey(_))
        ));
    }

    #[tokio::test]
    async fn failed_write_surfaces_store_error_and_keeps_cache() {
        let cache = Arc::new(PageCache::new(Duration::from_secs(60)));
        let generation = cache.generation().await;
        cache.store_if_current(generation, "<html/>".into()).await;
        let notes = MetadataStore::new(Arc::new(UnreachableStore), cache.clone());

        assert!(matches!(notes.set("a.txt", "x").await, Err(NoteError::Store(_))));
        assert!(cache.get().await.is_some());
    }
}
