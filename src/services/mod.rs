pub mod listing_service;
pub mod metadata_store;
pub mod page_cache;
