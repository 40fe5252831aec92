/// Translation cache
///
/// An LRU cache of finished translations, so repeated queries skip
/// resolution, dialect processing and rendering. Only SQL text and bindings
/// are cached, never query results.
///
/// # Cache key
///
/// SHA-256 over the query description exactly as given, the entity,
/// the dialect name and the canonical JSON of the parameters. Parameters are
/// part of the key because they shape the SQL (list expansion, `#if`
/// sections, null comparisons).
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use sha2::{Digest, Sha256};

use crate::sql_generator::TranslatedQuery;
use crate::translator::QueryParameters;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationCacheKey(String);

impl TranslationCacheKey {
    pub fn new(description: &str, entity: &str, dialect: &str, parameters: &QueryParameters) -> Self {
        // Whitespace is significant: it may sit inside literals or template text
        let parameters = serde_json::to_string(parameters).unwrap_or_default();

        let mut hasher = Sha256::new();
        for part in [description, entity, dialect, parameters.as_str()] {
            hasher.update(part.as_bytes());
            // separator so ("ab", "c") and ("a", "bc") differ
            hasher.update([0u8]);
        }
        TranslationCacheKey(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    query: TranslatedQuery,
    /// Logical clock value of the last access, for LRU
    last_accessed: u64,
    access_count: u64,
}

#[derive(Debug, Clone)]
pub struct TranslationCacheConfig {
    pub enabled: bool,
    /// Maximum number of entries (LRU eviction)
    pub max_entries: usize,
}

impl Default for TranslationCacheConfig {
    fn default() -> Self {
        TranslationCacheConfig {
            enabled: true,
            max_entries: 1000,
        }
    }
}

/// Translation cache with LRU eviction
pub struct TranslationCache {
    cache: Arc<Mutex<HashMap<TranslationCacheKey, CacheEntry>>>,
    config: TranslationCacheConfig,
    clock: AtomicU64,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    evictions: Arc<AtomicU64>,
}

impl TranslationCache {
    pub fn new(config: TranslationCacheConfig) -> Self {
        TranslationCache {
            cache: Arc::new(Mutex::new(HashMap::new())),
            config,
            clock: AtomicU64::new(0),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(TranslationCacheConfig::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TranslationCacheKey, CacheEntry>> {
        // A panic while holding the lock cannot leave an entry half-written
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the cached translation for `key`, if any
    pub fn get(&self, key: &TranslationCacheKey) -> Option<TranslatedQuery> {
        if !self.config.enabled {
            return None;
        }

        let now = self.tick();
        let mut cache = self.lock();
        if let Some(entry) = cache.get_mut(key) {
            entry.last_accessed = now;
            entry.access_count += 1;
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Translation cache hit for {}", &key.as_str()[..12]);
            Some(entry.query.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("Translation cache miss for {}", &key.as_str()[..12]);
            None
        }
    }

    /// Stores a translation, evicting the least recently used entry when full
    pub fn insert(&self, key: TranslationCacheKey, query: TranslatedQuery) {
        if !self.config.enabled || self.config.max_entries == 0 {
            return;
        }

        let entry = CacheEntry {
            query,
            last_accessed: self.tick(),
            access_count: 0,
        };

        let mut cache = self.lock();
        if !cache.contains_key(&key) && cache.len() >= self.config.max_entries {
            self.evict_lru(&mut cache);
        }
        cache.insert(key, entry);
    }

    fn evict_lru(&self, cache: &mut HashMap<TranslationCacheKey, CacheEntry>) {
        if let Some((key, _)) = cache.iter().min_by_key(|(_, entry)| entry.last_accessed) {
            let key = key.clone();
            cache.remove(&key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn metrics(&self) -> CacheMetrics {
        let cache = self.lock();
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: cache.len(),
            max_entries: self.config.max_entries,
        }
    }
}

/// Cache metrics for monitoring
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub max_entries: usize,
}

impl CacheMetrics {
    /// Calculate cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
