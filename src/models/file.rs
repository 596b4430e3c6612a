//! Represents a file shown in the browser: one bucket object plus its note.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single object as presented to the UI.
///
/// Rebuilt on every listing; nothing here is persisted except `note`, which
/// lives in the metadata document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Size in bytes.
    pub size: i64,

    /// Timestamp when the object was last modified, if the backend reports one.
    pub last_modified: Option<DateTime<Utc>>,

    /// Public URL the object can be downloaded from.
    pub url: String,

    /// Free-text note attached by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Result of a listing request. Failures are carried as data, never raised.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ListingOutcome {
    pub success: bool,

    pub files: Vec<FileDescriptor>,

    /// Short, user-facing reason the listing failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Full error chain for troubleshooting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl ListingOutcome {
    pub fn ok(files: Vec<FileDescriptor>) -> Self {
        Self {
            success: true,
            files,
            message: None,
            diagnostic: None,
        }
    }

    pub fn failed(message: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            files: Vec::new(),
            message: Some(message.into()),
            diagnostic: Some(diagnostic.into()),
        }
    }
}
