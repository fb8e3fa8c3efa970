//! In-process cache of rendered pages, keyed by request path.
//!
//! Each path carries a generation counter. Writers bump it with
//! [`FeedCache::invalidate`]; a page rendered against an older generation is
//! refused by [`FeedCache::store`], so a slow render can never overwrite the
//! result of a newer write.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CachedPage {
    pub body: Bytes,
    pub generation: u64,
    /// Weak validator, e.g. `W/"3-1a2b"`.
    pub etag: String,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct PathSlot {
    generation: u64,
    page: Option<CachedPage>,
}

#[derive(Clone, Debug)]
pub struct FeedCache {
    slots: Arc<RwLock<HashMap<String, PathSlot>>>,
    ttl: Duration,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Current page for `path`, unless it was invalidated or has aged out.
    pub async fn get(&self, path: &str) -> Option<CachedPage> {
        let slots = self.slots.read().await;
        let slot = slots.get(path)?;
        let page = slot.page.as_ref()?;

        if page.generation != slot.generation {
            return None;
        }
        if !self.ttl.is_zero() && page.stored_at.elapsed() >= self.ttl {
            debug!("Cached page for {} expired", path);
            return None;
        }
        Some(page.clone())
    }

    pub async fn generation(&self, path: &str) -> u64 {
        self.slots
            .read()
            .await
            .get(path)
            .map(|slot| slot.generation)
            .unwrap_or(0)
    }

    /// Store a page rendered at `generation`. Returns `false` when the path
    /// has been invalidated since the render started.
    pub async fn store(&self, path: &str, body: Bytes, generation: u64) -> bool {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(path.to_string()).or_default();

        if slot.generation != generation {
            debug!(
                "Discarding stale render of {} (gen {} < {})",
                path, generation, slot.generation
            );
            return false;
        }

        slot.page = Some(CachedPage {
            etag: weak_etag(generation, &body),
            body,
            generation,
            stored_at: Instant::now(),
        });
        true
    }

    /// Drop the cached page for `path` and bump its generation.
    pub async fn invalidate(&self, path: &str) -> u64 {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(path.to_string()).or_default();
        slot.generation += 1;
        slot.page = None;
        debug!("Invalidated {} (gen {})", path, slot.generation);
        slot.generation
    }
}

fn weak_etag(generation: u64, body: &[u8]) -> String {
    // FNV-1a
    let hash = body
        .iter()
        .fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
            (acc ^ u64::from(*b)).wrapping_mul(0x0000_0100_0000_01b3)
        });
    format!("W/\"{}-{:x}\"", generation, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_page_is_served_until_invalidated() {
        let cache = FeedCache::new(Duration::from_secs(60));
        let generation = cache.generation("/").await;
        assert!(cache.store("/", Bytes::from_static(b"feed"), generation).await);

        let page = cache.get("/").await.unwrap();
        assert_eq!(page.body, Bytes::from_static(b"feed"));
        assert!(page.etag.starts_with("W/\"0-"));

        assert_eq!(cache.invalidate("/").await, 1);
        assert!(cache.get("/").await.is_none());
    }

    #[tokio::test]
    async fn stale_render_is_refused() {
        let cache = FeedCache::new(Duration::from_secs(60));
        let before = cache.generation("/").await;
        cache.invalidate("/").await;

        assert!(!cache.store("/", Bytes::from_static(b"old"), before).await);
        assert!(cache.get("/").await.is_none());
    }

    #[tokio::test]
    async fn paths_are_independent() {
        let cache = FeedCache::new(Duration::from_secs(60));
        cache.store("/a", Bytes::from_static(b"a"), 0).await;
        cache.invalidate("/b").await;
        assert!(cache.get("/a").await.is_some());
        assert_eq!(cache.generation("/b").await, 1);
    }

    #[test]
    fn pages_expire_after_ttl() {
        tokio_test::block_on(async {
            let cache = FeedCache::new(Duration::from_millis(1));
            cache.store("/", Bytes::from_static(b"x"), 0).await;
            tokio::time::sleep(Duration::from_millis(5)).await;
            assert!(cache.get("/").await.is_none());
        });
    }

    #[test]
    fn etag_changes_with_body_and_generation() {
        assert_ne!(weak_etag(0, b"a"), weak_etag(0, b"b"));
        assert_ne!(weak_etag(0, b"a"), weak_etag(1, b"a"));
    }
}
