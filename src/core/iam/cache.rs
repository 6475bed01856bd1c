//! LRU cache for access decisions
//!
//! Caller-side cache used by the route guard. Entries are tagged with the rule
//! store revision they were computed against; a newer revision empties the
//! cache, and lookups or inserts carrying an older revision are ignored.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::debug;

/// Cache key for an access decision
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    roles: String,
    resource: String,
    action: String,
}

struct Inner {
    entries: LruCache<CacheKey, bool>,
    revision: u64,
}

/// Thread-safe LRU cache of access decisions
pub struct DecisionCache {
    inner: Mutex<Inner>,
}

impl DecisionCache {
    /// Create a cache with the given capacity. Returns `None` for zero,
    /// which callers treat as caching disabled.
    pub fn new(capacity: usize) -> Option<Self> {
        let capacity = NonZeroUsize::new(capacity)?;
        Some(DecisionCache {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                revision: 0,
            }),
        })
    }

    /// Get a cached decision computed at `revision`
    pub fn get(&self, revision: u64, roles: &str, resource: &str, action: &str) -> Option<bool> {
        let mut inner = self.inner.lock();
        if !Self::sync_revision(&mut inner, revision) {
            return None;
        }
        let key = CacheKey {
            roles: roles.to_string(),
            resource: resource.to_string(),
            action: action.to_string(),
        };
        inner.entries.get(&key).copied()
    }

    /// Store a decision computed at `revision`
    pub fn put(&self, revision: u64, roles: &str, resource: &str, action: &str, allowed: bool) {
        let mut inner = self.inner.lock();
        if !Self::sync_revision(&mut inner, revision) {
            return;
        }
        let key = CacheKey {
            roles: roles.to_string(),
            resource: resource.to_string(),
            action: action.to_string(),
        };
        inner.entries.put(key, allowed);
    }

    /// Advance to `revision` if it is newer. Returns false for a stale
    /// revision, whose decisions must be neither served nor stored.
    fn sync_revision(inner: &mut Inner, revision: u64) -> bool {
        if revision > inner.revision {
            debug!(
                "Rule revision changed ({} -> {}), dropping {} cached decisions",
                inner.revision,
                revision,
                inner.entries.len()
            );
            inner.entries.clear();
            inner.revision = revision;
        }
        revision == inner.revision
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().entries.cap().get()
    }
}
