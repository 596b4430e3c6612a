//! Process-wide cache of the last rendered browser page.
//!
//! Note writes call [`PageCache::invalidate`] so the next request re-reads
//! the bucket instead of serving a stale render. Each invalidation bumps a
//! generation counter; a render only lands in the cache if no invalidation
//! happened between reading the generation and storing the HTML.

use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct CachedPage {
    html: String,
    rendered_at: Instant,
}

#[derive(Default)]
struct CacheState {
    page: Option<CachedPage>,
    generation: u64,
}

pub struct PageCache {
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl PageCache {
    /// A zero `ttl` disables caching entirely.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Cached HTML if it is still fresh.
    pub async fn get(&self) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        let guard = self.state.read().await;
        guard
            .page
            .as_ref()
            .filter(|page| page.rendered_at.elapsed() < self.ttl)
            .map(|page| page.html.clone())
    }

    /// Generation to hand back to [`PageCache::store_if_current`]. Read it
    /// before gathering the data a render is built from.
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Cache `html` unless the cache was invalidated since `generation` was read.
    ///
    /// Returns whether the render was kept.
    pub async fn store_if_current(&self, generation: u64, html: String) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let mut guard = self.state.write().await;
        if guard.generation != generation {
            debug!(
                rendered_at = generation,
                current = guard.generation,
                "dropping render that raced an invalidation"
            );
            return false;
        }
        guard.page = Some(CachedPage {
            html,
            rendered_at: Instant::now(),
        });
        true
    }

    pub async fn invalidate(&self) {
        let mut guard = self.state.write().await;
        guard.generation = guard.generation.wrapping_add(1);
        if guard.page.take().is_some() {
            debug!("page cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_invalidates() {
        let cache = PageCache::new(Duration::from_secs(60));
        assert!(cache.get().await.is_none());

        let generation = cache.generation().await;
        assert!(cache.store_if_current(generation, "<html>v1</html>".into()).await);
        assert_eq!(cache.get().await.as_deref(), Some("<html>v1</html>"));

        cache.invalidate().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn render_started_before_invalidation_is_dropped() {
        let cache = PageCache::new(Duration::from_secs(60));
        let before = cache.generation().await;
        cache.invalidate().await;

        assert!(!cache.store_if_current(before, "<html>stale</html>".into()).await);
        assert!(cache.get().await.is_none());

        let after = cache.generation().await;
        assert_ne!(before, after);
        assert!(cache.store_if_current(after, "<html>fresh</html>".into()).await);
        assert_eq!(cache.get().await.as_deref(), Some("<html>fresh</html>"));
    }

    #[tokio::test]
    async fn zero_ttl_never_caches() {
        let cache = PageCache::new(Duration::ZERO);
        let generation = cache.generation().await;
        assert!(!cache.store_if_current(generation, "<html/>".into()).await);
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_not_served() {
        let cache = PageCache::new(Duration::from_millis(20));
        let generation = cache.generation().await;
        cache.store_if_current(generation, "<html/>".into()).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get().await.is_none());
    }
}
