//! Per-key TTL cache backing the marketplace's expensive fetches.
//!
//! The cache is an accelerator, never a correctness mechanism: a logically
//! expired entry is treated as absent on read but stays physically stored
//! until overwritten or invalidated (lazy expiry, no sweep thread). Two
//! concurrent misses may both fetch and both write; last write wins, which
//! is fine because fetches are idempotent re-reads of ledger state.
//!
//! A cache can also be constructed disabled, for deployments with no
//! backing store configured: reads report absent and writes are no-ops, so
//! every caller degrades to "always fetch fresh" instead of failing.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub mod policy;

pub use policy::{invalidate_listing_caches, invalidate_user_caches, keys, ttl};

struct Entry<T> {
    data: T,
    stored_at: Instant,
    ttl: Duration,
}

impl<T> Entry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) > self.ttl
    }
}

enum Backing<T> {
    Memory(RwLock<HashMap<String, Entry<T>>>),
    Disabled,
}

/// Introspection snapshot; no behavioral contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// String-keyed cache with a per-entry time-to-live.
pub struct TtlCache<T> {
    backing: Backing<T>,
}

impl<T: Clone> TtlCache<T> {
    /// An enabled, empty, in-process cache.
    pub fn new() -> Self {
        Self {
            backing: Backing::Memory(RwLock::new(HashMap::new())),
        }
    }

    /// A cache with no backing store: `get` is always absent, `set` a no-op.
    pub fn disabled() -> Self {
        Self {
            backing: Backing::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.backing, Backing::Memory(_))
    }

    /// Look up a live entry. Absent if never set, invalidated, or expired.
    ///
    /// Expired entries are not removed here; `get` never takes the write
    /// lock.
    pub fn get(&self, key: &str) -> Option<T> {
        let Backing::Memory(map) = &self.backing else {
            return None;
        };

        let guard = unwrap_poison(map.read());
        let entry = guard.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.data.clone())
    }

    /// Unconditional overwrite; resets the expiry clock.
    pub fn set(&self, key: impl Into<String>, data: T, ttl: Duration) {
        let Backing::Memory(map) = &self.backing else {
            return;
        };

        let mut guard = unwrap_poison(map.write());
        guard.insert(
            key.into(),
            Entry {
                data,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        if let Backing::Memory(map) = &self.backing {
            unwrap_poison(map.write()).remove(key);
        }
    }

    /// Remove every entry whose key starts with the literal `prefix`.
    ///
    /// Used to burst-invalidate a family of derived keys after a write
    /// elsewhere mutates ledger state.
    pub fn invalidate_prefix(&self, prefix: &str) {
        if let Backing::Memory(map) = &self.backing {
            unwrap_poison(map.write()).retain(|key, _| !key.starts_with(prefix));
        }
    }

    pub fn clear(&self) {
        if let Backing::Memory(map) = &self.backing {
            unwrap_poison(map.write()).clear();
        }
    }

    /// Physical contents, expired entries included.
    pub fn stats(&self) -> CacheStats {
        match &self.backing {
            Backing::Memory(map) => {
                let guard = unwrap_poison(map.read());
                CacheStats {
                    size: guard.len(),
                    keys: guard.keys().cloned().collect(),
                }
            }
            Backing::Disabled => CacheStats {
                size: 0,
                keys: Vec::new(),
            },
        }
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn unwrap_poison<G>(lock: std::sync::LockResult<G>) -> G {
    match lock {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
