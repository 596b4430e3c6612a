//! Handler for the browser page itself.

use crate::{
    state::AppState,
    views::page::{render_error_page, render_page},
};
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use tracing::debug;

/// `GET /` — render the file browser, reusing the cached render when fresh.
///
/// A failed listing renders a troubleshooting page with `502 Bad Gateway`
/// and is never cached. A render that overlaps a note save is served but
/// not cached, so the save is visible on the next request.
pub async fn index(State(state): State<AppState>) -> Response {
    if let Some(html) = state.page_cache.get().await {
        debug!("serving cached page");
        return page_response(StatusCode::OK, html);
    }

    let generation = state.page_cache.generation().await;
    let outcome = state.listing.list().await;
    if !outcome.success {
        let html = render_error_page(&state.settings, &outcome);
        return page_response(StatusCode::BAD_GATEWAY, html);
    }

    let html = render_page(&state.settings, &outcome.files);
    state
        .page_cache
        .store_if_current(generation, html.clone())
        .await;
    page_response(StatusCode::OK, html)
}

fn page_response(status: StatusCode, html: String) -> Response {
    let mut response = (status, Html(html)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        state::test_state,
        store::{
            LocalObjectStore, ObjectStore, PutOptions,
            testing::{GatedListStore, UnreachableStore},
        },
    };
    use axum::body::to_bytes;
    use bytes::Bytes;
    use std::sync::Arc;
    use tempfile::tempdir;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn renders_files_with_notes() {
        let dir = tempdir().unwrap();
        let store = Arc::new(LocalObjectStore::new(dir.path()));
        store
            .put_object("report.pdf", Bytes::from_static(b"%PDF"), PutOptions::default())
            .await
            .unwrap();
        let state = test_state(store, 0);
        state.notes.set("report.pdf", "quarterly").await.unwrap();

        let response = index(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"data-key="report.pdf" data-note="quarterly""#));
        assert!(html.contains("https://cdn.example.com/report.pdf"));
        assert!(!html.contains("_metadata.json"));
    }

    #[tokio::test]
    async fn cached_page_is_reused_until_a_note_is_saved() {
        let dir = tempdir().unwrap();
        let store = Arc::new(LocalObjectStore::new(dir.path()));
        store
            .put_object("first.txt", Bytes::from_static(b"1"), PutOptions::default())
            .await
            .unwrap();
        let state = test_state(store.clone(), 300);

        let first = body_text(index(State(state.clone())).await).await;
        assert!(first.contains("first.txt"));

        store
            .put_object("second.txt", Bytes::from_static(b"2"), PutOptions::default())
            .await
            .unwrap();
        let cached = body_text(index(State(state.clone())).await).await;
        assert!(!cached.contains("second.txt"));

        state.notes.set("first.txt", "seen").await.unwrap();
        let fresh = body_text(index(State(state)).await).await;
        assert!(fresh.contains("second.txt"));
        assert!(fresh.contains(r#"data-note="seen""#));
    }

    #[tokio::test]
    async fn store_failure_renders_error_page_uncached() {
        let state = test_state(Arc::new(UnreachableStore) as Arc<dyn ObjectStore>, 300);
        let response = index(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let html = body_text(response).await;
        assert!(html.contains("Could not connect to the object store"));
        assert!(state.page_cache.get().await.is_none());
    }

    #[tokio::test]
    async fn note_saved_during_render_is_not_hidden_by_cache() {
        let dir = tempdir().unwrap();
        let local = LocalObjectStore::new(dir.path());
        local
            .put_object("a.txt", Bytes::from_static(b"a"), PutOptions::default())
            .await
            .unwrap();
        let gated = Arc::new(GatedListStore::new(local));
        let state = test_state(gated.clone(), 300);

        let render = tokio::spawn(index(State(state.clone())));
        gated.entered.notified().await;
        gated.read.notified().await;
        state.notes.set("a.txt", "fresh-note").await.unwrap();
        gated.release.notify_one();
        let stale = body_text(render.await.unwrap()).await;
        assert!(!stale.contains("fresh-note"));

        let next = body_text(index(State(state)).await).await;
        assert!(next.contains(r#"data-note="fresh-note""#));
    }
}
