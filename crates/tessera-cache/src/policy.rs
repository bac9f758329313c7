//! Cache key namespace and TTL classes.
//!
//! TTLs are tuned per data volatility, not per call site: listing sets
//! change with every trade, platform configuration almost never does.

use crate::TtlCache;

/// Key builders for every cached family. Keys sharing a namespace prefix
/// can be burst-invalidated together.
pub mod keys {
    pub const ALL_LISTINGS: &str = "listings:all";
    pub const ALL_RESALE_LISTINGS: &str = "listings:resale";
    pub const PLATFORM_CONFIG: &str = "platform:config";

    pub fn listing(address: &str) -> String {
        format!("listing:{address}")
    }

    pub fn metadata(uri: &str) -> String {
        format!("metadata:{uri}")
    }

    pub fn user_owned(wallet: &str) -> String {
        format!("user:owned:{wallet}")
    }

    pub fn user_created(wallet: &str) -> String {
        format!("user:created:{wallet}")
    }
}

/// TTL classes per fetch kind.
pub mod ttl {
    use std::time::Duration;

    /// Full listing sets; refreshed often enough to bound staleness.
    pub const LISTINGS: Duration = Duration::from_secs(30);

    /// A single listing looked up by address.
    pub const SINGLE_LISTING: Duration = Duration::from_secs(15);

    /// Resolved metadata; the URI contents are effectively immutable.
    pub const METADATA: Duration = Duration::from_secs(5 * 60);

    /// Platform configuration; almost never changes.
    pub const PLATFORM_CONFIG: Duration = Duration::from_secs(5 * 60);

    /// Per-wallet views.
    pub const USER_DATA: Duration = Duration::from_secs(15);
}

/// Drop every listing-derived entry. Call after anything that mutates
/// listing state on the ledger (create, buy, cancel, resale).
pub fn invalidate_listing_caches<T: Clone>(cache: &TtlCache<T>) {
    cache.invalidate_prefix("listings:");
    cache.invalidate_prefix("listing:");
    cache.invalidate_prefix("user:");
    tracing::debug!("invalidated listing-derived cache entries");
}

/// Drop the per-wallet entries for one wallet.
pub fn invalidate_user_caches<T: Clone>(cache: &TtlCache<T>, wallet: &str) {
    cache.invalidate(&keys::user_owned(wallet));
    cache.invalidate(&keys::user_created(wallet));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_invalidation_spares_unrelated_namespaces() {
        let cache = TtlCache::new();
        cache.set(keys::ALL_LISTINGS, 1u64, ttl::LISTINGS);
        cache.set(keys::listing("abc"), 2u64, ttl::SINGLE_LISTING);
        cache.set(keys::user_owned("w1"), 3u64, ttl::USER_DATA);
        cache.set(keys::PLATFORM_CONFIG, 4u64, ttl::PLATFORM_CONFIG);
        cache.set(keys::metadata("ipfs://x"), 5u64, ttl::METADATA);

        invalidate_listing_caches(&cache);

        assert_eq!(cache.get(keys::ALL_LISTINGS), None);
        assert_eq!(cache.get(&keys::listing("abc")), None);
        assert_eq!(cache.get(&keys::user_owned("w1")), None);
        assert_eq!(cache.get(keys::PLATFORM_CONFIG), Some(4));
        assert_eq!(cache.get(&keys::metadata("ipfs://x")), Some(5));
    }

    #[test]
    fn user_invalidation_targets_one_wallet() {
        let cache = TtlCache::new();
        cache.set(keys::user_owned("w1"), 1u64, ttl::USER_DATA);
        cache.set(keys::user_owned("w2"), 2u64, ttl::USER_DATA);

        invalidate_user_caches(&cache, "w1");

        assert_eq!(cache.get(&keys::user_owned("w1")), None);
        assert_eq!(cache.get(&keys::user_owned("w2")), Some(2));
    }
}
