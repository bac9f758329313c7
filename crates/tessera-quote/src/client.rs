use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::VersionedTransaction;
use tracing::{debug, warn};

use crate::types::{QuoteError, SwapPlan, SwapQuote, VolatileQuote};
use crate::{
    implied_rate_minor_units, lamports_for_stable_at_rate, FALLBACK_RATE_MINOR_UNITS, SOL_MINT,
    USDC_MINT,
};

/// Aggregator quote/swap API base.
pub const QUOTE_API_BASE: &str = "https://quote-api.jup.ag/v6";

/// Timeout for quote lookups. Tight: a quote is only useful fresh.
pub const QUOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for swap-transaction construction. Looser: it is a heavier call
/// and the result is signed and submitted by the caller afterwards.
pub const SWAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default slippage tolerance in basis points (1%).
pub const DEFAULT_SLIPPAGE_BPS: u16 = 100;

/// Operating network class. The aggregator only routes on mainnet; every
/// other network gets the fallback-estimate path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkClass {
    Mainnet,
    Devnet,
}

impl NetworkClass {
    /// Classify from an RPC URL. Anything not clearly mainnet is treated
    /// as a test network so we never hit the live aggregator by accident.
    pub fn from_rpc_url(rpc_url: &str) -> Self {
        if rpc_url.contains("devnet") || !rpc_url.contains("mainnet") {
            Self::Devnet
        } else {
            Self::Mainnet
        }
    }

    pub fn supports_swaps(&self) -> bool {
        matches!(self, Self::Mainnet)
    }
}

/// Tuning knobs for the quote client.
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    pub network: NetworkClass,
    pub api_base: String,
    /// Stable minor units per whole SOL used on the estimate path.
    pub fallback_rate_minor_units: u64,
    pub quote_timeout: Duration,
    pub swap_timeout: Duration,
}

impl QuoteConfig {
    pub fn for_rpc_url(rpc_url: &str) -> Self {
        Self {
            network: NetworkClass::from_rpc_url(rpc_url),
            ..Self::default()
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            network: NetworkClass::Devnet,
            api_base: QUOTE_API_BASE.to_owned(),
            fallback_rate_minor_units: FALLBACK_RATE_MINOR_UNITS,
            quote_timeout: QUOTE_TIMEOUT,
            swap_timeout: SWAP_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
    swap_transaction: String,
}

/// Client for the aggregator's quote and swap-construction endpoints.
///
/// Per call, stateless: each request classifies the network, runs the
/// bounded network exchange, and recovers failures locally. Nothing here
/// signs or submits anything.
pub struct QuoteClient {
    http: reqwest::Client,
    config: QuoteConfig,
}

impl QuoteClient {
    pub fn new(config: QuoteConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn network(&self) -> NetworkClass {
        self.config.network
    }

    /// Whether swap construction can work at all on this network.
    pub fn swap_supported(&self) -> bool {
        self.config.network.supports_swaps()
    }

    /// How much SOL covers `stable_minor_units`, exact-output mode.
    ///
    /// Never fails: any problem on the live path degrades to the
    /// configured fixed-rate estimate.
    pub async fn quote_volatile_for_stable(&self, stable_minor_units: u64) -> VolatileQuote {
        if !self.swap_supported() {
            debug!("quoting service unsupported on this network, serving estimate");
            return self.fallback_quote(stable_minor_units);
        }

        let quote = match self
            .request_quote(
                stable_minor_units,
                "ExactOut",
                DEFAULT_SLIPPAGE_BPS,
                self.config.quote_timeout,
            )
            .await
        {
            Ok(quote) => quote,
            Err(err) => {
                warn!(error = %err, "quote request failed, serving fallback estimate");
                return self.fallback_quote(stable_minor_units);
            }
        };

        match quote.in_amount_lamports() {
            Some(lamports) if lamports > 0 => VolatileQuote {
                volatile_lamports: lamports,
                rate_minor_units_per_sol: implied_rate_minor_units(stable_minor_units, lamports),
                price_impact_pct: Some(quote.price_impact_pct.clone())
                    .filter(|pct| !pct.is_empty()),
                is_estimate: false,
                quote: Some(quote),
            },
            _ => {
                warn!("quote reported an unusable input amount, serving fallback estimate");
                self.fallback_quote(stable_minor_units)
            }
        }
    }

    /// Current rate in stable minor units per whole SOL, via a 1-SOL
    /// exact-input probe. Falls back to the configured constant.
    pub async fn current_rate_minor_units(&self) -> u64 {
        if !self.swap_supported() {
            return self.config.fallback_rate_minor_units;
        }

        match self
            .request_quote(
                LAMPORTS_PER_SOL,
                "ExactIn",
                DEFAULT_SLIPPAGE_BPS,
                self.config.quote_timeout,
            )
            .await
        {
            Ok(quote) => quote
                .out_amount_minor_units()
                .filter(|units| *units > 0)
                .unwrap_or(self.config.fallback_rate_minor_units),
            Err(err) => {
                warn!(error = %err, "rate probe failed, serving fallback rate");
                self.config.fallback_rate_minor_units
            }
        }
    }

    /// Build an unsigned swap transaction delivering exactly
    /// `stable_minor_units` of the stable asset to the payer.
    ///
    /// `None` means "swap unavailable now" and is a normal condition: test
    /// networks, a degraded quoting service, or an undecodable payload all
    /// land here. The caller signs and submits elsewhere.
    pub async fn build_swap(
        &self,
        payer: &Pubkey,
        stable_minor_units: u64,
        slippage_bps: u16,
    ) -> Option<SwapPlan> {
        if !self.swap_supported() {
            warn!("swap construction requested on a network without aggregator support");
            return None;
        }

        let quote = match self
            .request_quote(
                stable_minor_units,
                "ExactOut",
                slippage_bps,
                self.config.swap_timeout,
            )
            .await
        {
            Ok(quote) => quote,
            Err(err) => {
                warn!(error = %err, "swap quote failed");
                return None;
            }
        };

        match self.request_swap_transaction(&quote, payer).await {
            Ok(transaction) => Some(SwapPlan { transaction, quote }),
            Err(err) => {
                warn!(error = %err, "swap transaction construction failed");
                None
            }
        }
    }

    fn fallback_quote(&self, stable_minor_units: u64) -> VolatileQuote {
        let rate = self.config.fallback_rate_minor_units;
        VolatileQuote {
            volatile_lamports: lamports_for_stable_at_rate(stable_minor_units, rate),
            rate_minor_units_per_sol: rate,
            price_impact_pct: None,
            is_estimate: true,
            quote: None,
        }
    }

    async fn request_quote(
        &self,
        amount: u64,
        swap_mode: &str,
        slippage_bps: u16,
        timeout: Duration,
    ) -> Result<SwapQuote, QuoteError> {
        let response = self
            .http
            .get(format!("{}/quote", self.config.api_base))
            .query(&[
                ("inputMint", SOL_MINT.to_string()),
                ("outputMint", USDC_MINT.to_string()),
                ("amount", amount.to_string()),
                ("swapMode", swap_mode.to_owned()),
                ("slippageBps", slippage_bps.to_string()),
            ])
            .timeout(timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuoteError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    async fn request_swap_transaction(
        &self,
        quote: &SwapQuote,
        payer: &Pubkey,
    ) -> Result<VersionedTransaction, QuoteError> {
        let body = serde_json::json!({
            "quoteResponse": quote,
            "userPublicKey": payer.to_string(),
            "wrapAndUnwrapSol": true,
            "dynamicComputeUnitLimit": true,
            "prioritizationFeeLamports": "auto",
        });

        let response = self
            .http
            .post(format!("{}/swap", self.config.api_base))
            .json(&body)
            .timeout(self.config.swap_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuoteError::Status(response.status()));
        }

        let payload: SwapResponse = response.json().await?;
        let bytes = general_purpose::STANDARD.decode(payload.swap_transaction)?;
        Ok(bincode::deserialize(&bytes)?)
    }
}
