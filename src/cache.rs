//! Bounded, time-expiring cache for query embeddings.
//!
//! Maps normalized query text to its embedding vector so repeated
//! queries skip the embedding provider. Normalization (trim +
//! case-fold) happens before hashing, so `"Hello World"` and
//! `" hello world "` share one entry.
//!
//! Eviction policy: before every insert, all expired entries are
//! purged; if the cache is still full, the single oldest remaining
//! entry by creation order is dropped. Strictly insertion-ordered, not
//! LRU-by-access.
//!
//! The cache is the only cross-request state in the engine. A single
//! mutex guards the map; the provider call on a miss happens outside
//! the lock so a slow embedding service never blocks unrelated lookups.
//! Two concurrent misses for the same key may both call the provider;
//! the later insert wins, which is harmless. Failures are never cached.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::provider::{EmbeddingProvider, ProviderError};

/// Errors that can occur during cache resolution.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Embedding provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

struct CacheEntry {
    vector: Vec<f32>,
    created_at: Instant,
    /// Monotonic insertion counter; orders evictions when timestamps tie.
    seq: u64,
}

/// Bounded TTL cache from normalized query text to embedding vector.
pub struct VectorCache {
    capacity: usize,
    ttl: Duration,
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    entries: HashMap<[u8; 32], CacheEntry>,
    next_seq: u64,
}

impl VectorCache {
    /// Create a cache holding at most `capacity` entries, each expiring
    /// `ttl` after insertion.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Resolve the embedding for `text`, consulting the cache first.
    ///
    /// On a hit with an unexpired entry the cached vector is returned
    /// and the provider is not called. On a miss or expiry the provider
    /// embeds the normalized text and the result is stored with a fresh
    /// timestamp. Provider failures propagate uncached.
    pub fn resolve(
        &self,
        text: &str,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Vec<f32>, CacheError> {
        let normalized = normalize(text);
        let key = cache_key(&normalized);

        {
            let inner = self.lock()?;
            if let Some(entry) = inner.entries.get(&key) {
                if entry.created_at.elapsed() <= self.ttl {
                    log::debug!("Embedding cache hit for query ({} chars)", normalized.len());
                    return Ok(entry.vector.clone());
                }
            }
        }

        // Provider I/O happens with the lock released.
        let vector = provider.embed(&normalized)?;

        let mut inner = self.lock()?;
        Self::purge_expired(&mut inner.entries, self.ttl);
        if inner.entries.len() >= self.capacity && !inner.entries.contains_key(&key) {
            Self::evict_oldest(&mut inner.entries);
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key,
            CacheEntry {
                vector: vector.clone(),
                created_at: Instant::now(),
                seq,
            },
        );

        Ok(vector)
    }

    /// Number of cached entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. Intended for test isolation and operational reset.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.clear();
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CacheInner>, CacheError> {
        self.inner
            .lock()
            .map_err(|e| CacheError::Internal(format!("Lock poisoned: {}", e)))
    }

    fn purge_expired(entries: &mut HashMap<[u8; 32], CacheEntry>, ttl: Duration) {
        entries.retain(|_, entry| entry.created_at.elapsed() <= ttl);
    }

    fn evict_oldest(entries: &mut HashMap<[u8; 32], CacheEntry>) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| (entry.created_at, entry.seq))
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            entries.remove(&key);
        }
    }
}

/// Normalize query text before hashing: trim and case-fold.
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// SHA-256 digest of the normalized query text.
fn cache_key(normalized: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.finalize().into()
}
