//! Memoized renderings, one per `(target, slot)`.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;

use crate::target::Slot;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Rendered bytes keyed by target identity and slot.
///
/// Entries are filled lazily and only removed through
/// [`RenderCache::invalidate_all`].
#[derive(Debug)]
pub struct RenderCache<K> {
    entries: HashMap<(K, Slot), Vec<u8>>,
    stats: CacheStats,
}

impl<K> Default for RenderCache<K> {
    fn default() -> Self {
        RenderCache {
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }
}

impl<K: Clone + Eq + Hash + Debug> RenderCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K, slot: Slot) -> Option<&[u8]> {
        self.entries
            .get(&(key.clone(), slot))
            .map(Vec::as_slice)
    }

    pub fn contains(&self, key: &K, slot: Slot) -> bool {
        self.entries.contains_key(&(key.clone(), slot))
    }

    pub fn insert(&mut self, key: K, slot: Slot, bytes: Vec<u8>) {
        self.entries.insert((key, slot), bytes);
    }

    /// Return the cached bytes for `(key, slot)`, producing them with
    /// `render` on a miss. A failed render leaves the slot empty.
    pub async fn get_or_render<F, Fut, E>(
        &mut self,
        key: &K,
        slot: Slot,
        render: F,
    ) -> Result<Vec<u8>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, E>>,
    {
        if let Some(bytes) = self.entries.get(&(key.clone(), slot)) {
            self.stats.hits += 1;
            tracing::debug!(?key, ?slot, "Render cache hit");
            return Ok(bytes.clone());
        }

        self.stats.misses += 1;
        tracing::debug!(?key, ?slot, "Render cache miss");
        let bytes = render().await?;
        self.entries.insert((key.clone(), slot), bytes.clone());
        Ok(bytes)
    }

    /// Drop every entry matching `predicate`; returns how many were removed.
    pub fn invalidate_all<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&K, Slot) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|(key, slot), _| !predicate(key, *slot));
        let removed = before - self.entries.len();
        tracing::debug!(removed, remaining = self.entries.len(), "Invalidated renderings");
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_renders_once() {
        let mut cache = RenderCache::new();
        let mut calls = 0;

        for _ in 0..3 {
            let bytes = cache
                .get_or_render(&"a", Slot::Primary, || {
                    calls += 1;
                    async { Ok::<_, std::io::Error>(vec![1, 2, 3]) }
                })
                .await
                .unwrap();
            assert_eq!(bytes, vec![1, 2, 3]);
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.stats(), CacheStats { hits: 2, misses: 1 });
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let mut cache: RenderCache<&str> = RenderCache::new();
        let result = cache
            .get_or_render(&"a", Slot::Primary, || async {
                Err::<Vec<u8>, _>("boom")
            })
            .await;
        assert_eq!(result, Err("boom"));
        assert!(!cache.contains(&"a", Slot::Primary));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut cache = RenderCache::new();
        cache.insert("a", Slot::Primary, vec![1]);
        cache.insert("a", Slot::Upscaled128, vec![4]);
        assert_eq!(cache.get(&"a", Slot::Primary), Some(&[1u8][..]));
        assert_eq!(cache.get(&"a", Slot::Upscaled128), Some(&[4u8][..]));
        assert_eq!(cache.get(&"b", Slot::Primary), None);
    }

    #[test]
    fn test_invalidate_all() {
        let mut cache = RenderCache::new();
        cache.insert("a", Slot::Primary, vec![1]);
        cache.insert("a", Slot::Upscaled128, vec![2]);
        cache.insert("b", Slot::Primary, vec![3]);

        assert_eq!(cache.invalidate_all(|_, slot| slot == Slot::Upscaled128), 1);
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.invalidate_all(|_, _| true), 2);
        assert!(cache.is_empty());
    }
}
