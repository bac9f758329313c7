//! Ledger reads for the marketplace: fetch every account owned by the
//! listing program, decode each one independently, keep the active records.
//!
//! The collection functions are pure and take already-fetched
//! `(address, bytes)` pairs, so higher layers (and tests) can drive them
//! without a node. `fetch_active_listings` is the one function here that
//! performs a network round trip.
//!
//! A program's address space holds more than listing records, so most
//! accounts in a scan are expected not to decode. A malformed or foreign
//! account is dropped silently; it must never fail the whole scan. Ordering
//! follows whatever the node returned; callers wanting determinism sort
//! explicitly.

use solana_client::client_error::ClientError;
use solana_client::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};

use tessera_decode::{decode_listing_account, ListingRecord};

/// Decode a batch of program accounts and keep only active listing records.
pub fn collect_active_listings<I>(accounts: I) -> Vec<ListingRecord>
where
    I: IntoIterator<Item = (Pubkey, Vec<u8>)>,
{
    let mut scanned = 0usize;
    let mut listings = Vec::new();

    for (address, data) in accounts {
        scanned += 1;
        match decode_listing_account(address, &data) {
            Some(record) if record.is_active() => listings.push(record),
            Some(_) => debug!(%address, "skipping inactive listing"),
            None => {}
        }
    }

    debug!(scanned, kept = listings.len(), "collected listing records");
    listings
}

/// Fetch all accounts owned by `program_id` and return the active listings.
///
/// One bulk `getProgramAccounts` round trip; no server-side filtering is
/// assumed, all shape checks happen locally during decode.
pub fn fetch_active_listings(
    rpc: &RpcClient,
    program_id: &Pubkey,
) -> Result<Vec<ListingRecord>, ClientError> {
    let accounts = rpc.get_program_accounts(program_id)?;
    let fetched = accounts.len();

    let listings = collect_active_listings(
        accounts
            .into_iter()
            .map(|(address, account)| (address, account.data)),
    );

    info!(
        program = %program_id,
        fetched,
        active = listings.len(),
        "scanned program accounts"
    );

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    fn discriminator(name: &str) -> [u8; 8] {
        let mut hasher = Sha256::new();
        hasher.update(b"account:");
        hasher.update(name.as_bytes());
        let hash = hasher.finalize();
        let mut disc = [0u8; 8];
        disc.copy_from_slice(&hash[..8]);
        disc
    }

    fn valid_resale_bytes(price: u64, listed_at: i64) -> Vec<u8> {
        let mut buf = Vec::with_capacity(121);
        buf.extend_from_slice(&discriminator("ResaleListing"));
        buf.extend_from_slice(Pubkey::new_unique().as_ref()); // seller
        buf.extend_from_slice(Pubkey::new_unique().as_ref()); // origin listing
        buf.extend_from_slice(Pubkey::new_unique().as_ref()); // asset mint
        buf.extend_from_slice(&price.to_le_bytes());
        buf.extend_from_slice(&listed_at.to_le_bytes());
        buf.push(255);
        buf
    }

    fn foreign_bytes(len: usize, fill: u8) -> Vec<u8> {
        vec![fill; len]
    }

    #[test]
    fn mixed_scan_keeps_only_valid_records() {
        let mut accounts = Vec::new();

        // 47 foreign-shaped accounts of assorted sizes, none of them listings.
        for i in 0..47usize {
            accounts.push((
                Pubkey::new_unique(),
                foreign_bytes(3 + (i * 11) % 300, i as u8),
            ));
        }

        // 3 valid resale records interleaved at arbitrary positions.
        accounts.insert(5, (Pubkey::new_unique(), valid_resale_bytes(10, 100)));
        accounts.insert(20, (Pubkey::new_unique(), valid_resale_bytes(20, 200)));
        accounts.push((Pubkey::new_unique(), valid_resale_bytes(30, 300)));

        let listings = collect_active_listings(accounts);
        assert_eq!(listings.len(), 3);
        assert!(listings.iter().all(|l| l.is_active()));

        let mut prices: Vec<u64> = listings.iter().map(|l| l.price_minor_units()).collect();
        prices.sort_unstable();
        assert_eq!(prices, vec![10, 20, 30]);
    }

    #[test]
    fn empty_scan_yields_empty_list() {
        assert!(collect_active_listings(Vec::new()).is_empty());
    }

    #[test]
    fn truncated_listing_payload_is_dropped_not_fatal() {
        let mut bytes = valid_resale_bytes(10, 100);
        bytes.truncate(100); // right discriminator, wrong shape

        let listings = collect_active_listings(vec![(Pubkey::new_unique(), bytes)]);
        assert!(listings.is_empty());
    }
}
