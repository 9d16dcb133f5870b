use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use gap_common::CandidateConcept;
use gap_common::api::ScoreResponse;
use lru::LruCache;

struct CachedEntry {
    response: ScoreResponse,
    cached_at: Instant,
}

/// Bounded LRU of score responses; entries older than the TTL are treated
/// as misses and evicted on access.
pub struct ScoreCache {
    entries: Mutex<LruCache<String, CachedEntry>>,
    capacity: NonZeroUsize,
    ttl: Duration,
}

impl ScoreCache {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
            ttl,
        }
    }

    /// Scoring is deterministic per candidate and corpus snapshot, so the pair
    /// identifies a result.
    pub fn key(candidate: &CandidateConcept, corpus_version: &str) -> String {
        let candidate = serde_json::to_string(candidate).unwrap_or_default();
        format!("{corpus_version}:{candidate}")
    }

    pub fn get(&self, key: &str) -> Option<ScoreResponse> {
        let mut entries = self.entries.lock().ok()?;
        let fresh = entries
            .get(key)
            .map(|entry| entry.cached_at.elapsed() < self.ttl)?;
        if fresh {
            entries.get(key).map(|entry| entry.response.clone())
        } else {
            entries.pop(key);
            None
        }
    }

    pub fn insert(&self, key: String, response: ScoreResponse) {
        if self.ttl.is_zero() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(
                key,
                CachedEntry {
                    response,
                    cached_at: Instant::now(),
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
