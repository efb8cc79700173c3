//! The per-area graph cache: a reader-writer map keyed by quantized bounding box,
//! with TTL-based eviction swept opportunistically on insert.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use waypath_common::{QuantizedBoundingBox, CACHE_TTL_SECS};
use waypath_routing::Graph;

struct Entry {
    graph: Arc<Graph>,
    inserted_at: Instant,
}

/// Whether a cache probe found a usable entry, a stale one, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Stale,
    Miss,
}

/// Shared, read-mostly cache of built graphs. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct GraphCache {
    entries: Arc<RwLock<HashMap<QuantizedBoundingBox, Entry>>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key`, returning the graph plus whether it was a live hit, a
    /// TTL-expired stale entry (treated as a miss by the caller), or absent.
    pub async fn get(&self, key: QuantizedBoundingBox) -> (CacheOutcome, Option<Arc<Graph>>) {
        let entries = self.entries.read().await;
        match entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed().as_secs() < CACHE_TTL_SECS => {
                (CacheOutcome::Hit, Some(entry.graph.clone()))
            }
            Some(_) => (CacheOutcome::Stale, None),
            None => (CacheOutcome::Miss, None),
        }
    }

    /// Inserts a freshly built graph under `key`, then sweeps every entry whose
    /// TTL has expired. The last writer for a given key wins; concurrent misses
    /// on the same key may each build and race to insert.
    pub async fn insert(&self, key: QuantizedBoundingBox, graph: Arc<Graph>) {
        let mut entries = self.entries.write().await;
        entries.insert(key, Entry { graph, inserted_at: Instant::now() });
        entries.retain(|_, entry| entry.inserted_at.elapsed().as_secs() < CACHE_TTL_SECS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: i64) -> QuantizedBoundingBox {
        use waypath_common::BoundingBox;
        let n = n as f64;
        BoundingBox { south: n, west: n, north: n + 1.0, east: n + 1.0 }.quantize(1.0)
    }

    #[tokio::test]
    async fn miss_on_empty_cache() {
        let cache = GraphCache::new();
        let (outcome, graph) = cache.get(key(1)).await;
        assert_eq!(outcome, CacheOutcome::Miss);
        assert!(graph.is_none());
    }

    #[tokio::test]
    async fn hit_after_insert() {
        let cache = GraphCache::new();
        cache.insert(key(1), Arc::new(Graph::default())).await;
        let (outcome, graph) = cache.get(key(1)).await;
        assert_eq!(outcome, CacheOutcome::Hit);
        assert!(graph.is_some());
    }

    #[tokio::test]
    async fn distinct_keys_do_not_collide() {
        let cache = GraphCache::new();
        cache.insert(key(1), Arc::new(Graph::default())).await;
        let (outcome, _) = cache.get(key(2)).await;
        assert_eq!(outcome, CacheOutcome::Miss);
    }
}
