//! Fingerprint-keyed cache of rendered page sequences.
//!
//! Rasterising a multi-page PDF at 2× is by far the most expensive stage, and
//! users re-run the pipeline over the same upload whenever they tweak a form.
//! The cache memoizes the full page sequence per upload identity
//! ([`Fingerprint`]) so a repeat run skips straight to recognition.
//!
//! Entries are read-only once inserted and always complete: a document either
//! has all of its pages cached or none (partial renders are rejected at the
//! call site). Eviction is least-recently-used over document fingerprints,
//! bounded by [`crate::config::PipelineConfig::cache_capacity`].

use crate::pipeline::raster::RenderedPage;
use crate::source::Fingerprint;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// LRU cache: `Fingerprint` → complete rendered page sequence.
///
/// Interior mutability keeps the call sites simple: the pipeline holds one
/// `PageCache` and both readers and the inserter go through `&self`.
pub struct PageCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

struct CacheInner {
    entries: HashMap<Fingerprint, Arc<Vec<RenderedPage>>>,
    /// Access order, least-recently-used first.
    order: Vec<Fingerprint>,
}

impl PageCache {
    /// Create a cache bounded to `capacity` documents (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: Vec::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    /// Look up a document's page sequence, refreshing its LRU position.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<Vec<RenderedPage>>> {
        let mut inner = self.inner.lock().expect("page cache poisoned");
        let pages = inner.entries.get(fingerprint).cloned()?;
        inner.touch(fingerprint);
        Some(pages)
    }

    /// Insert a *complete* page sequence, evicting the least-recently-used
    /// entry when over capacity.
    ///
    /// Inserting an existing fingerprint replaces the entry; callers only do
    /// this when the previous render never made it into the cache.
    pub fn insert(&self, fingerprint: Fingerprint, pages: Arc<Vec<RenderedPage>>) {
        let mut inner = self.inner.lock().expect("page cache poisoned");

        if inner.entries.insert(fingerprint.clone(), pages).is_none() {
            inner.order.push(fingerprint.clone());
        } else {
            inner.touch(&fingerprint);
        }

        while inner.entries.len() > self.capacity {
            let evicted = inner.order.remove(0);
            inner.entries.remove(&evicted);
            debug!("evicted cached pages for {evicted}");
        }
    }

    /// Number of documents currently cached.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("page cache poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("page cache poisoned");
        inner.entries.clear();
        inner.order.clear();
    }
}

impl CacheInner {
    fn touch(&mut self, fingerprint: &Fingerprint) {
        if let Some(pos) = self.order.iter().position(|f| f == fingerprint) {
            let f = self.order.remove(pos);
            self.order.push(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(name: &str) -> Fingerprint {
        Fingerprint {
            name: name.to_string(),
            byte_size: 10,
            last_modified_ms: 0,
        }
    }

    fn pages() -> Arc<Vec<RenderedPage>> {
        Arc::new(Vec::new())
    }

    #[test]
    fn get_returns_inserted_sequence() {
        let cache = PageCache::new(2);
        let seq = pages();
        cache.insert(fp("a"), Arc::clone(&seq));
        let got = cache.get(&fp("a")).unwrap();
        assert!(Arc::ptr_eq(&seq, &got));
    }

    #[test]
    fn miss_returns_none() {
        let cache = PageCache::new(2);
        assert!(cache.get(&fp("nope")).is_none());
    }

    #[test]
    fn lru_evicts_oldest() {
        let cache = PageCache::new(2);
        cache.insert(fp("a"), pages());
        cache.insert(fp("b"), pages());
        cache.insert(fp("c"), pages());

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&fp("a")).is_none(), "a should be evicted");
        assert!(cache.get(&fp("b")).is_some());
        assert!(cache.get(&fp("c")).is_some());
    }

    #[test]
    fn get_refreshes_lru_position() {
        let cache = PageCache::new(2);
        cache.insert(fp("a"), pages());
        cache.insert(fp("b"), pages());

        // Touch "a" so "b" becomes the eviction candidate.
        cache.get(&fp("a"));
        cache.insert(fp("c"), pages());

        assert!(cache.get(&fp("a")).is_some());
        assert!(cache.get(&fp("b")).is_none(), "b should be evicted");
    }

    #[test]
    fn clear_empties_cache() {
        let cache = PageCache::new(2);
        cache.insert(fp("a"), pages());
        cache.clear();
        assert!(cache.is_empty());
    }
}
