//! Bounded, concurrency-safe memoization of translation results.

use std::sync::atomic::{AtomicU64, Ordering};

use moka::sync::Cache;

use crate::tracker::similarity;

/// Key: normalized source text plus the language pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text: String,
    source: String,
    target: String,
}

/// Shared translation cache.
///
/// Explicitly owned and passed by handle to whichever contexts need it; the
/// inner map is internally synchronized, so `get`/`put` are safe from the
/// frame path and from concurrent translation completions alike, and neither
/// blocks beyond a short critical section. Lookups for the same key return
/// the same value until eviction or `clear`.
pub struct TranslationCache {
    inner: Cache<CacheKey, String>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TranslationCache {
    /// Create a cache bounded to `capacity` entries (LRU-style eviction).
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, text: &str, source: &str, target: &str) -> Option<String> {
        let result = self.inner.get(&key(text, source, target));
        match result {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        result
    }

    pub fn put(&self, text: &str, source: &str, target: &str, translation: String) {
        self.inner.insert(key(text, source, target), translation);
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Approximate number of cached entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

fn key(text: &str, source: &str, target: &str) -> CacheKey {
    CacheKey {
        text: similarity::normalize(text),
        source: source.to_string(),
        target: target.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_get_after_put() {
        let cache = TranslationCache::new(16);
        assert_eq!(cache.get("メニュー", "ja", "en"), None);

        cache.put("メニュー", "ja", "en", "Menu".to_string());
        assert_eq!(cache.get("メニュー", "ja", "en"), Some("Menu".to_string()));

        // Language pair is part of the key.
        assert_eq!(cache.get("メニュー", "ja", "de"), None);

        assert_eq!(cache.hit_count(), 1);
        assert_eq!(cache.miss_count(), 2);
    }

    #[test]
    fn test_key_normalization() {
        let cache = TranslationCache::new(16);
        cache.put("  Exit ", "en", "ja", "出口".to_string());
        assert_eq!(cache.get("exit", "en", "ja"), Some("出口".to_string()));

        // Tab and space separators key identically.
        cache.put("last\texit", "en", "ja", "出口はこちら".to_string());
        assert_eq!(
            cache.get("last exit", "en", "ja"),
            Some("出口はこちら".to_string())
        );
    }

    #[test]
    fn test_clear() {
        let cache = TranslationCache::new(16);
        cache.put("exit", "en", "ja", "出口".to_string());
        cache.clear();
        assert_eq!(cache.get("exit", "en", "ja"), None);
    }

    #[test]
    fn test_bounded_capacity() {
        let cache = TranslationCache::new(4);
        for i in 0..100 {
            cache.put(&format!("text {i}"), "en", "ja", format!("t{i}"));
        }
        assert!(cache.entry_count() <= 4);
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let cache = Arc::new(TranslationCache::new(64));
        cache.put("stable", "en", "ja", "安定".to_string());

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    assert_eq!(cache.get("stable", "en", "ja"), Some("安定".to_string()));
                }
            }));
        }
        let writer = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for i in 0..1000 {
                    cache.put(&format!("other {i}"), "en", "ja", "x".to_string());
                }
            })
        };

        for handle in handles {
            handle.join().unwrap();
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_no_lost_updates_on_same_key() {
        let cache = Arc::new(TranslationCache::new(64));

        let writers: Vec<_> = ["Menu", "The menu"]
            .into_iter()
            .map(|value| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        cache.put("メニュー", "ja", "en", value.to_string());
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        // The final value is one of the two complete writes, never a blend.
        let value = cache.get("メニュー", "ja", "en").unwrap();
        assert!(value == "Menu" || value == "The menu");
    }
}
