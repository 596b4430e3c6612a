//! Directory-backed object store.
//!
//! Keys map to relative paths beneath `root` (`photos/2025/img.jpg` lives at
//! `root/photos/2025/img.jpg`). Writes land in a `.tmp-*` sibling first and
//! are renamed into place.

use super::{ObjectEntry, ObjectStore, PutOptions, StoreError, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

const MAX_OBJECT_KEY_LEN: usize = 1024;
const TMP_PREFIX: &str = ".tmp-";

#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reject keys that could escape `root`.
    fn ensure_key_safe(key: &str) -> StoreResult<()> {
        let invalid = key.is_empty()
            || key.len() > MAX_OBJECT_KEY_LEN
            || key.starts_with('/')
            || key.ends_with('/')
            || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..")
            || key
                .bytes()
                .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0');
        if invalid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    fn object_path(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            path.push(segment);
        }
        path
    }

    /// Rebuild the object key for a file found under `root`.
    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;
        Some(segments.join("/"))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn list_objects(&self) -> StoreResult<Vec<ObjectEntry>> {
        let mut entries = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut reader = match fs::read_dir(&dir).await {
                Ok(reader) => reader,
                // a bucket that was never written to is simply empty
                Err(err) if err.kind() == ErrorKind::NotFound && dir == self.root => {
                    return Ok(entries);
                }
                Err(err) => return Err(err.into()),
            };

            while let Some(entry) = reader.next_entry().await? {
                let file_type = entry.file_type().await?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }
                if !file_type.is_file() {
                    continue;
                }
                if entry.file_name().to_string_lossy().starts_with(TMP_PREFIX) {
                    continue;
                }
                let Some(key) = self.key_for(&path) else {
                    debug!("skipping non UTF-8 path {}", path.display());
                    continue;
                };
                let meta = entry.metadata().await?;
                entries.push(ObjectEntry {
                    key,
                    size: meta.len() as i64,
                    last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
                });
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    async fn get_object(&self, key: &str) -> StoreResult<Option<Bytes>> {
        Self::ensure_key_safe(key)?;
        match fs::read(self.object_path(key)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn put_object(&self, key: &str, body: Bytes, opts: PutOptions) -> StoreResult<()> {
        Self::ensure_key_safe(key)?;
        debug!(
            key,
            content_type = ?opts.content_type,
            cache_control = ?opts.cache_control,
            "local backend ignores object headers"
        );

        let file_path = self.object_path(key);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StoreError::Io(io::Error::new(
                ErrorKind::Other,
                "object path missing parent directory",
            ))
        })?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!("{}{}", TMP_PREFIX, Uuid::new_v4()));
        if let Err(err) = write_synced(&tmp_path, &body).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("local:{}", self.root.display())
    }
}

async fn write_synced(path: &Path, body: &[u8]) -> io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(body).await?;
    file.flush().await?;
    file.sync_all().await
}
