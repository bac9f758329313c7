//! Tessera public API facade wrapping the lower-level crates.
//!
//! One `Marketplace` is constructed at process start and handed by
//! reference to everything that needs it; it owns the caches, the RPC
//! client, and the quote/metadata clients. There is no ambient global
//! state.
//!
//! Expected-absence is data, not an error: an unconfigured program id
//! yields an empty listing set, an unavailable swap route yields `None`,
//! an unreachable metadata host yields degraded fields. Only a failing
//! ledger RPC propagates, wrapped, for the embedding application to turn
//! into a "try again" at its boundary.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use solana_client::client_error::ClientError;
use solana_client::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;
use tracing::{debug, warn};

use tessera_cache::{keys, policy, ttl, CacheStats, TtlCache};
use tessera_ledger::fetch_active_listings;
use tessera_metadata::{MetadataFields, MetadataResolver};
use tessera_quote::{
    check_balance_with_buffer, BalanceCheck, QuoteClient, QuoteConfig, SwapPlan, VolatileQuote,
};

pub use tessera_cache::invalidate_user_caches;
pub use tessera_decode::{ListingRecord, PrimaryListingRecord, ResaleListingRecord};
pub use tessera_quote::NetworkClass;

#[cfg(feature = "logging")]
pub fn init_logging() {
    use tracing_subscriber::fmt::Subscriber;
    let subscriber = Subscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Top-level configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    pub rpc_url: String,
    /// Listing program to scan. Absent means the listings feature is
    /// unconfigured and degrades to empty results.
    pub program_id: Option<Pubkey>,
    /// Disable to run without any cache backing; every read fetches fresh.
    pub cache_enabled: bool,
    pub quote: QuoteConfig,
    /// Same-origin proxy for metadata hosts that block direct reads.
    pub metadata_proxy: Option<String>,
}

impl MarketplaceConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        let rpc_url = rpc_url.into();
        Self {
            quote: QuoteConfig::for_rpc_url(&rpc_url),
            rpc_url,
            program_id: None,
            cache_enabled: true,
            metadata_proxy: None,
        }
    }

    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = Some(program_id);
        self
    }
}

/// Public error surface. Reserved for top-level fatal problems such as an
/// unreachable ledger RPC endpoint; everything expected is modeled as data.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    #[error("RPC error: {0}")]
    Rpc(#[from] ClientError),
}

/// A fetch result with cache observability attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fetched<T> {
    pub data: T,
    /// Whether this answer was served from cache.
    pub cached: bool,
    pub fetched_at_millis: u64,
}

impl<T> Fetched<T> {
    fn fresh(data: T) -> Self {
        Self {
            data,
            cached: false,
            fetched_at_millis: now_millis(),
        }
    }

    fn from_cache(data: T) -> Self {
        Self {
            data,
            cached: true,
            fetched_at_millis: now_millis(),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The marketplace read/pricing surface.
pub struct Marketplace {
    rpc: RpcClient,
    program_id: Option<Pubkey>,
    listings: TtlCache<Vec<ListingRecord>>,
    metadata: TtlCache<MetadataFields>,
    quotes: QuoteClient,
    resolver: MetadataResolver,
}

impl Marketplace {
    pub fn new(config: MarketplaceConfig) -> Self {
        let (listings, metadata) = if config.cache_enabled {
            (TtlCache::new(), TtlCache::new())
        } else {
            (TtlCache::disabled(), TtlCache::disabled())
        };

        Self {
            rpc: RpcClient::new(config.rpc_url),
            program_id: config.program_id,
            listings,
            metadata,
            quotes: QuoteClient::new(config.quote),
            resolver: MetadataResolver::new(config.metadata_proxy),
        }
    }

    /// Access the underlying RpcClient for lower-level queries.
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Current active listings, cache-aside.
    ///
    /// `skip_cache` bypasses the cache read (a "refresh" action) but the
    /// fresh result is still written back for the next caller.
    pub fn list_active_listings(
        &self,
        skip_cache: bool,
    ) -> Result<Fetched<Vec<ListingRecord>>, MarketplaceError> {
        let Some(program_id) = self.program_id else {
            warn!("no listing program configured, serving empty listing set");
            return Ok(Fetched::fresh(Vec::new()));
        };

        if !skip_cache {
            if let Some(records) = self.listings.get(keys::ALL_LISTINGS) {
                debug!(count = records.len(), "serving listings from cache");
                return Ok(Fetched::from_cache(records));
            }
        }

        let records = fetch_active_listings(&self.rpc, &program_id)?;
        self.listings
            .set(keys::ALL_LISTINGS, records.clone(), ttl::LISTINGS);

        Ok(Fetched::fresh(records))
    }

    /// Price a purchase: how much of the volatile asset covers
    /// `stable_minor_units`. Not cached; quotes are time-sensitive.
    pub async fn quote_purchase(&self, stable_minor_units: u64) -> VolatileQuote {
        self.quotes
            .quote_volatile_for_stable(stable_minor_units)
            .await
    }

    /// Construct an unsigned swap transaction for the caller to sign.
    /// `None` is the normal "swap unavailable now" outcome.
    pub async fn build_swap_transaction(
        &self,
        payer: &Pubkey,
        stable_minor_units: u64,
        slippage_bps: u16,
    ) -> Option<SwapPlan> {
        self.quotes
            .build_swap(payer, stable_minor_units, slippage_bps)
            .await
    }

    /// Resolve a listing's metadata URI, cache-backed.
    pub async fn resolve_metadata(&self, uri: &str) -> Fetched<MetadataFields> {
        let key = keys::metadata(uri);
        if let Some(fields) = self.metadata.get(&key) {
            return Fetched::from_cache(fields);
        }

        let fields = self.resolver.resolve(uri).await;
        self.metadata.set(key, fields.clone(), ttl::METADATA);

        Fetched::fresh(fields)
    }

    /// Buffered balance check against the payer's on-chain balance.
    pub fn check_payer_balance(
        &self,
        payer: &Pubkey,
        required_lamports: u64,
    ) -> Result<BalanceCheck, MarketplaceError> {
        let balance = self.rpc.get_balance(payer)?;
        Ok(check_balance_with_buffer(balance, required_lamports))
    }

    /// Drop every listing-derived cache entry. Call after a ledger write
    /// elsewhere mutates listing state.
    pub fn invalidate_listing_caches(&self) {
        policy::invalidate_listing_caches(&self.listings);
    }

    pub fn listing_cache_stats(&self) -> CacheStats {
        self.listings.stats()
    }
}
