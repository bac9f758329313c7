//! Price quoting between the volatile settlement asset (SOL) and the stable
//! unit (USDC minor units), plus unsigned swap-transaction construction.
//!
//! Pricing must always produce *a* usable number: when the quoting service
//! is unavailable, times out, or the operating network does not support it
//! (the aggregator only routes on mainnet), callers get a fixed-rate
//! estimate flagged `is_estimate = true` instead of an error. Estimated
//! quotes are non-binding; consumers widen slippage accordingly.
//!
//! All asset amounts stay in integer smallest-unit form (lamports, USDC
//! minor units) through every calculation. Decimal strings exist only at
//! the display boundary ([`format_sol`]).

use solana_client::client_error::ClientError;
use solana_client::rpc_client::RpcClient;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;

mod client;
mod types;

pub use client::{
    NetworkClass, QuoteClient, QuoteConfig, DEFAULT_SLIPPAGE_BPS, QUOTE_API_BASE, QUOTE_TIMEOUT,
    SWAP_TIMEOUT,
};
pub use types::{BalanceCheck, QuoteError, SwapPlan, SwapQuote, VolatileQuote};

/// Wrapped SOL mint.
pub const SOL_MINT: Pubkey = solana_sdk::pubkey!("So11111111111111111111111111111111111111112");

/// Mainnet USDC mint; the aggregator only routes against mainnet mints.
pub const USDC_MINT: Pubkey = solana_sdk::pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");

/// Fixed-rate estimate used when no live quote is available:
/// stable minor units per whole SOL (USDC has six decimals).
pub const FALLBACK_RATE_MINOR_UNITS: u64 = 180_000_000;

/// Safety margin added on top of a computed requirement to cover
/// transaction fees before comparing against a payer's balance.
pub const FEE_BUFFER_LAMPORTS: u64 = 10_000_000;

/// Implied rate from a quote's reported amounts, in stable minor units per
/// whole SOL. Zero lamports would make the rate meaningless; callers guard.
pub fn implied_rate_minor_units(stable_minor_units: u64, volatile_lamports: u64) -> u64 {
    if volatile_lamports == 0 {
        return 0;
    }
    let rate = (stable_minor_units as u128 * LAMPORTS_PER_SOL as u128) / volatile_lamports as u128;
    u64::try_from(rate).unwrap_or(u64::MAX)
}

/// Lamports needed to cover `stable_minor_units` at a fixed rate, rounded
/// up so the buyer never comes in short.
pub fn lamports_for_stable_at_rate(stable_minor_units: u64, rate_minor_units_per_sol: u64) -> u64 {
    if rate_minor_units_per_sol == 0 {
        return 0;
    }
    let rate = rate_minor_units_per_sol as u128;
    let numerator = stable_minor_units as u128 * LAMPORTS_PER_SOL as u128;
    let lamports = (numerator + rate - 1) / rate;
    u64::try_from(lamports).unwrap_or(u64::MAX)
}

/// Compare a payer's balance against a requirement plus the fee buffer.
/// The boundary is inclusive: balance == required + buffer is sufficient.
pub fn check_balance_with_buffer(balance_lamports: u64, required_lamports: u64) -> BalanceCheck {
    let required_with_buffer = required_lamports.saturating_add(FEE_BUFFER_LAMPORTS);
    BalanceCheck {
        sufficient: balance_lamports >= required_with_buffer,
        balance_lamports,
        required_with_buffer,
    }
}

/// Fetch the payer's balance and run the buffered comparison.
pub fn check_payer_balance(
    rpc: &RpcClient,
    payer: &Pubkey,
    required_lamports: u64,
) -> Result<BalanceCheck, ClientError> {
    let balance = rpc.get_balance(payer)?;
    Ok(check_balance_with_buffer(balance, required_lamports))
}

/// Display-boundary formatting of a lamport amount as SOL with four
/// decimal places. Integer math throughout.
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = (lamports % LAMPORTS_PER_SOL) / 100_000;
    format!("{whole}.{frac:04}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implied_rate_from_reported_amounts() {
        // $180 for exactly one SOL.
        assert_eq!(
            implied_rate_minor_units(180_000_000, LAMPORTS_PER_SOL),
            180_000_000
        );
        // $90 for half a SOL is still $180/SOL.
        assert_eq!(
            implied_rate_minor_units(90_000_000, LAMPORTS_PER_SOL / 2),
            180_000_000
        );
        assert_eq!(implied_rate_minor_units(100, 0), 0);
    }

    #[test]
    fn fallback_lamports_round_up() {
        // $100 at $180/SOL = 0.5555... SOL; must round up.
        let lamports = lamports_for_stable_at_rate(100_000_000, FALLBACK_RATE_MINOR_UNITS);
        assert_eq!(lamports, 555_555_556);

        // An exact division stays exact.
        assert_eq!(
            lamports_for_stable_at_rate(90_000_000, FALLBACK_RATE_MINOR_UNITS),
            LAMPORTS_PER_SOL / 2
        );
    }

    #[test]
    fn balance_buffer_boundary_is_inclusive() {
        let required = 555_555_556u64;

        let short = check_balance_with_buffer(required + FEE_BUFFER_LAMPORTS - 1, required);
        assert!(!short.sufficient);
        assert_eq!(short.required_with_buffer, required + FEE_BUFFER_LAMPORTS);

        let exact = check_balance_with_buffer(required + FEE_BUFFER_LAMPORTS, required);
        assert!(exact.sufficient);
    }

    #[test]
    fn sol_formatting_is_display_only() {
        assert_eq!(format_sol(0), "0.0000");
        assert_eq!(format_sol(500_000), "0.0050");
        assert_eq!(format_sol(1_234_567_890), "1.2345");
        assert_eq!(format_sol(2 * LAMPORTS_PER_SOL), "2.0000");
    }
}
