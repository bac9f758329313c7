use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use solana_sdk::transaction::VersionedTransaction;
use thiserror::Error;

/// Errors on the quote/swap network paths.
///
/// These never reach quote callers directly; the client recovers every one
/// of them into a fallback estimate or an absent swap. They exist so the
/// recovery sites can log what actually went wrong.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("quote service returned status {0}")]
    Status(StatusCode),

    #[error("swap transaction payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("swap transaction failed to deserialize: {0}")]
    Transaction(#[from] bincode::Error),
}

/// A quote as returned by the aggregator's quote endpoint.
///
/// Amounts come over the wire as decimal strings because they are 64-bit
/// values that would not survive a JSON consumer's native number type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: String,
    pub out_amount: String,
    #[serde(default)]
    pub other_amount_threshold: String,
    #[serde(default)]
    pub swap_mode: String,
    #[serde(default)]
    pub slippage_bps: u16,
    #[serde(default)]
    pub price_impact_pct: String,
    /// Route hops; passed back verbatim when requesting a swap transaction.
    #[serde(default)]
    pub route_plan: serde_json::Value,
}

impl SwapQuote {
    pub fn in_amount_lamports(&self) -> Option<u64> {
        self.in_amount.parse().ok()
    }

    pub fn out_amount_minor_units(&self) -> Option<u64> {
        self.out_amount.parse().ok()
    }
}

/// The answer to "how much SOL covers this stable amount".
///
/// `is_estimate = true` marks a fallback-rate answer (quote service down,
/// or a network class it does not serve); treat those as non-binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatileQuote {
    /// Lamports the buyer must provide.
    pub volatile_lamports: u64,
    /// Implied price in stable minor units per whole SOL.
    pub rate_minor_units_per_sol: u64,
    /// Aggregator-reported price impact, when a live quote produced this.
    pub price_impact_pct: Option<String>,
    pub is_estimate: bool,
    /// The live quote backing this answer, absent on the fallback path.
    pub quote: Option<SwapQuote>,
}

/// An unsigned, ready-to-sign swap transaction with the quote behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapPlan {
    pub transaction: VersionedTransaction,
    pub quote: SwapQuote,
}

/// Result of a buffered balance comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceCheck {
    pub sufficient: bool,
    pub balance_lamports: u64,
    pub required_with_buffer: u64,
}
