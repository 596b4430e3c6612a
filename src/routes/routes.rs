//! Defines routes for the file browser and its JSON API.
//!
//! ## Structure
//! - **Page**
//!   - `GET /` — server-rendered file browser
//!
//! - **API**
//!   - `GET /api/files?q=` — listing merged with notes, optionally filtered
//!   - `GET /api/notes` — the raw notes document
//!   - `PUT /api/notes/{*key}` — set or clear the note on one object
//!
//! The wildcard `*key` allows nested keys like `photos/2025/img.jpg`.

use crate::{
    handlers::{
        file_handlers::{get_notes, list_files, save_note},
        health_handlers::{healthz, readyz},
        page_handlers::index,
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, put},
};

/// Build and return the router for the page, the API and the health checks.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/", get(index))
        .route("/api/files", get(list_files))
        .route("/api/notes", get(get_notes))
        .route("/api/notes/{*key}", put(save_note))
}
