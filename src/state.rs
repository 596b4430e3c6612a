//! Shared state handed to every handler through axum `State`.

use crate::{
    config::AppConfig,
    services::{
        listing_service::ListingService, metadata_store::MetadataStore, page_cache::PageCache,
    },
    store::ObjectStore,
};
use std::{sync::Arc, time::Duration};

/// Presentation settings fixed at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub site_title: String,
    pub accent_color: String,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub listing: ListingService,
    pub notes: MetadataStore,
    pub page_cache: Arc<PageCache>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the services together around one object store.
    pub fn new(store: Arc<dyn ObjectStore>, cfg: &AppConfig) -> Self {
        let page_cache = Arc::new(PageCache::new(Duration::from_secs(cfg.page_cache_ttl_secs)));
        let notes = MetadataStore::new(store.clone(), page_cache.clone());
        let listing = ListingService::new(store.clone(), notes.clone(), cfg.public_url.clone());
        Self {
            store,
            listing,
            notes,
            page_cache,
            settings: Arc::new(Settings {
                site_title: cfg.site_title.clone(),
                accent_color: cfg.accent_color.clone(),
            }),
        }
    }
}

/// State over `store` with a local-backend config and a fixed public URL.
#[cfg(test)]
pub fn test_state(store: Arc<dyn ObjectStore>, page_cache_ttl_secs: u64) -> AppState {
    use crate::config::{Args, Backend};

    let args = Args {
        backend: Some(Backend::Local),
        public_url: Some("https://cdn.example.com".into()),
        page_cache_ttl_secs: Some(page_cache_ttl_secs),
        ..Args::default()
    };
    let cfg = AppConfig::from_args(args, |_| None).expect("test config is valid");
    AppState::new(store, &cfg)
}
