//! Notes attached to objects and the document that stores them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Object key → note. Sorted so the stored document is stable across saves.
pub type NoteMap = BTreeMap<String, String>;

/// Body of `PUT /api/notes/{*key}`.
#[derive(Deserialize, Debug)]
pub struct SaveNoteRequest {
    #[serde(default)]
    pub note: String,
}

#[derive(Serialize, Debug)]
pub struct SaveNoteResponse {
    pub success: bool,
}
