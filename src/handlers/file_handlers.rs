//! JSON API over the listing and the notes document.

use crate::{
    errors::AppError,
    models::{
        file::ListingOutcome,
        note::{NoteMap, SaveNoteRequest, SaveNoteResponse},
    },
    services::listing_service::search,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

/// Query params accepted by `GET /api/files`.
#[derive(Debug, Deserialize, Default)]
pub struct FilesQuery {
    /// Search text matched against keys and notes.
    pub q: Option<String>,
}

/// GET `/api/files` — listing with notes, optionally filtered by `?q=`.
///
/// Store failures are reported in the body (`success: false`) with 502.
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<FilesQuery>,
) -> impl IntoResponse {
    let mut outcome = state.listing.list().await;
    if !outcome.success {
        return (StatusCode::BAD_GATEWAY, Json(outcome));
    }
    if let Some(q) = query.q.as_deref() {
        outcome = ListingOutcome::ok(search(&outcome.files, q));
    }
    (StatusCode::OK, Json(outcome))
}

/// GET `/api/notes` — the raw notes document (empty when unreadable).
pub async fn get_notes(State(state): State<AppState>) -> Json<NoteMap> {
    Json(state.notes.get().await)
}

/// PUT `/api/notes/{*key}` — set or clear the note on one object.
pub async fn save_note(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<SaveNoteRequest>,
) -> Result<Json<SaveNoteResponse>, AppError> {
    state.notes.set(&key, &payload.note).await?;
    Ok(Json(SaveNoteResponse { success: true }))
}
