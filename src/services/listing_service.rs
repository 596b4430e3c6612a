//! ListingService — joins the bucket listing with the notes document.
//!
//! The object listing and the notes read are issued together; the notes
//! side never fails (see [`MetadataStore::get`]), so only the listing can
//! turn the outcome into a failure.

use crate::{
    models::{
        file::{FileDescriptor, ListingOutcome},
        note::NoteMap,
    },
    services::metadata_store::{METADATA_KEY, MetadataStore},
    store::{ObjectEntry, ObjectStore},
};
use std::{cmp::Reverse, sync::Arc};
use tracing::{debug, error};

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn ObjectStore>,
    notes: MetadataStore,
    public_url: String,
}

impl ListingService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        notes: MetadataStore,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notes,
            public_url: public_url.into(),
        }
    }

    /// List every file in the bucket, newest first, with notes attached.
    pub async fn list(&self) -> ListingOutcome {
        let (listing, notes) = tokio::join!(self.store.list_objects(), self.notes.get());

        match listing {
            Ok(entries) => {
                let files = merge_listing(entries, &notes, &self.public_url);
                debug!(count = files.len(), "listing complete");
                ListingOutcome::ok(files)
            }
            Err(err) => {
                error!(backend = %self.store.describe(), "listing bucket failed: {}", err);
                ListingOutcome::failed(
                    format!("could not list bucket: {}", err),
                    format!("backend: {}\n{:#?}", self.store.describe(), err),
                )
            }
        }
    }
}

/// Drop the notes document, attach notes and sort newest first.
///
/// Entries without a timestamp sort last; ties keep key order.
pub fn merge_listing(
    mut entries: Vec<ObjectEntry>,
    notes: &NoteMap,
    public_url: &str,
) -> Vec<FileDescriptor> {
    entries.retain(|entry| entry.key != METADATA_KEY);
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    entries.sort_by_key(|entry| Reverse(entry.last_modified));

    entries
        .into_iter()
        .map(|entry| FileDescriptor {
            url: public_url_for(public_url, &entry.key),
            note: notes.get(&entry.key).cloned(),
            key: entry.key,
            size: entry.size,
            last_modified: entry.last_modified,
        })
        .collect()
}

/// Case-insensitive substring match over key and note. An empty query matches everything;
/// whitespace is matched literally.
pub fn search(files: &[FileDescriptor], query: &str) -> Vec<FileDescriptor> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return files.to_vec();
    }
    files
        .iter()
        .filter(|file| {
            file.key.to_lowercase().contains(&needle)
                || file
                    .note
                    .as_deref()
                    .is_some_and(|note| note.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// `{base}/{key}` with each key segment percent-encoded.
pub fn public_url_for(base: &str, key: &str) -> String {
    let encoded = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", base.trim_end_matches('/'), encoded)
}
