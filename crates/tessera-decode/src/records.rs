//! Typed listing records and their decoders.
//!
//! Decoders return `Option`: `None` means "not this record kind", which is
//! the common case when scanning a shared program address space. The raw
//! account bytes are the sole source of truth; records are rebuilt fresh on
//! every scan and never mutated in place. For resale listings the account's
//! existence *is* the active flag: cancel and fulfil both close the account.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::layout::{
    account_discriminator, DISCRIMINATOR_LEN, PRIMARY_ASSET_MINT, PRIMARY_CREATED_AT,
    PRIMARY_CREATOR, PRIMARY_DURATION, PRIMARY_HEAD_LEN, PRIMARY_PRICE, PRIMARY_RESALE_ALLOWED,
    PRIMARY_RESALE_ROYALTY_BPS, PRIMARY_SHARE_BPS, PRIMARY_STATUS, PRIMARY_TAIL_LEN,
    PRIMARY_URI_LEN, RESALE_ASSET_MINT, RESALE_LISTED_AT, RESALE_LISTING_LEN,
    RESALE_ORIGIN_LISTING, RESALE_PRICE, RESALE_SELLER,
};
use crate::words::{read_i64_words, read_u16_le, read_u32_le, read_u64_words};

/// Account name of the resale listing kind, as registered on-chain.
pub const RESALE_LISTING_ACCOUNT: &str = "ResaleListing";

/// Account name of the primary listing kind.
pub const PRIMARY_LISTING_ACCOUNT: &str = "RoyaltyListing";

/// A secondary-market offer. Points back at the primary listing it resells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResaleListingRecord {
    /// Address of the listing account itself.
    pub address: Pubkey,
    /// Controlling party of the offer.
    pub seller: Pubkey,
    /// Back-reference to the originating primary listing.
    pub origin_listing: Pubkey,
    /// Tokenized asset being resold.
    pub asset_mint: Pubkey,
    /// Asking price in the stable unit's smallest denomination.
    pub price_minor_units: u64,
    /// Unix timestamp at which the offer was listed.
    pub listed_at: i64,
}

/// Lifecycle state stored on a primary listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    Active,
    Paused,
    Closed,
}

impl ListingStatus {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Active),
            1 => Some(Self::Paused),
            2 => Some(Self::Closed),
            _ => None,
        }
    }
}

/// A creator's primary revenue-share listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryListingRecord {
    pub address: Pubkey,
    pub creator: Pubkey,
    pub asset_mint: Pubkey,
    /// Opaque metadata URI; see `tessera-metadata` for the supported schemes.
    pub metadata_uri: String,
    pub price_minor_units: u64,
    /// Revenue share granted to the buyer, in basis points.
    pub share_bps: u16,
    pub duration_seconds: i64,
    pub created_at: i64,
    pub resale_allowed: bool,
    pub resale_royalty_bps: u16,
    pub status: ListingStatus,
}

/// Any listing record the marketplace knows how to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingRecord {
    Primary(PrimaryListingRecord),
    Resale(ResaleListingRecord),
}

impl ListingRecord {
    pub fn address(&self) -> Pubkey {
        match self {
            Self::Primary(p) => p.address,
            Self::Resale(r) => r.address,
        }
    }

    pub fn asset_mint(&self) -> Pubkey {
        match self {
            Self::Primary(p) => p.asset_mint,
            Self::Resale(r) => r.asset_mint,
        }
    }

    pub fn price_minor_units(&self) -> u64 {
        match self {
            Self::Primary(p) => p.price_minor_units,
            Self::Resale(r) => r.price_minor_units,
        }
    }

    /// Resale accounts are closed on cancel/fulfil, so existing means active.
    /// Primary listings carry an explicit status byte.
    pub fn is_active(&self) -> bool {
        match self {
            Self::Primary(p) => p.status == ListingStatus::Active,
            Self::Resale(_) => true,
        }
    }
}

fn read_pubkey(data: &[u8], offset: usize) -> Option<Pubkey> {
    let bytes = data.get(offset..offset.checked_add(32)?)?;
    let arr: [u8; 32] = bytes.try_into().ok()?;
    Some(Pubkey::new_from_array(arr))
}

fn resale_discriminator() -> &'static [u8; 8] {
    static DISC: OnceLock<[u8; 8]> = OnceLock::new();
    DISC.get_or_init(|| account_discriminator(RESALE_LISTING_ACCOUNT))
}

fn primary_discriminator() -> &'static [u8; 8] {
    static DISC: OnceLock<[u8; 8]> = OnceLock::new();
    DISC.get_or_init(|| account_discriminator(PRIMARY_LISTING_ACCOUNT))
}

/// Decode a resale listing payload, or `None` if the bytes are not one.
///
/// Assumes the caller already routed on the discriminator (or is probing
/// decoders in priority order); only the shape is validated here. A payload
/// whose length differs from the exact 121-byte layout is some other kind.
pub fn decode_resale_listing(address: Pubkey, data: &[u8]) -> Option<ResaleListingRecord> {
    if data.len() != RESALE_LISTING_LEN {
        return None;
    }

    Some(ResaleListingRecord {
        address,
        seller: read_pubkey(data, RESALE_SELLER.offset)?,
        origin_listing: read_pubkey(data, RESALE_ORIGIN_LISTING.offset)?,
        asset_mint: read_pubkey(data, RESALE_ASSET_MINT.offset)?,
        price_minor_units: read_u64_words(data, RESALE_PRICE.offset)?,
        listed_at: read_i64_words(data, RESALE_LISTED_AT.offset)?,
    })
}

/// Decode a primary listing payload, or `None` if the bytes are not one.
///
/// The layout carries a length-prefixed metadata URI between the fixed head
/// and tail, so the exact-size check becomes head + uri_len + tail.
pub fn decode_primary_listing(address: Pubkey, data: &[u8]) -> Option<PrimaryListingRecord> {
    if data.len() < PRIMARY_HEAD_LEN + PRIMARY_TAIL_LEN {
        return None;
    }

    let uri_len = read_u32_le(data, PRIMARY_URI_LEN.offset)? as usize;
    let expected = PRIMARY_HEAD_LEN
        .checked_add(uri_len)?
        .checked_add(PRIMARY_TAIL_LEN)?;
    if data.len() != expected {
        return None;
    }

    let uri_bytes = data.get(PRIMARY_HEAD_LEN..PRIMARY_HEAD_LEN + uri_len)?;
    let metadata_uri = std::str::from_utf8(uri_bytes).ok()?.to_owned();

    let tail = PRIMARY_HEAD_LEN + uri_len;
    let resale_allowed = match data.get(tail + PRIMARY_RESALE_ALLOWED.offset)? {
        0 => false,
        1 => true,
        _ => return None,
    };

    Some(PrimaryListingRecord {
        address,
        creator: read_pubkey(data, PRIMARY_CREATOR.offset)?,
        asset_mint: read_pubkey(data, PRIMARY_ASSET_MINT.offset)?,
        metadata_uri,
        price_minor_units: read_u64_words(data, tail + PRIMARY_PRICE.offset)?,
        share_bps: read_u16_le(data, tail + PRIMARY_SHARE_BPS.offset)?,
        duration_seconds: read_i64_words(data, tail + PRIMARY_DURATION.offset)?,
        created_at: read_i64_words(data, tail + PRIMARY_CREATED_AT.offset)?,
        resale_allowed,
        resale_royalty_bps: read_u16_le(data, tail + PRIMARY_RESALE_ROYALTY_BPS.offset)?,
        status: ListingStatus::from_byte(*data.get(tail + PRIMARY_STATUS.offset)?)?,
    })
}

/// Route a raw payload to the right decoder by its leading discriminator.
///
/// Resale is tried before primary; payloads with a foreign discriminator or
/// a shape mismatch are `None`, never an error.
pub fn decode_listing_account(address: Pubkey, data: &[u8]) -> Option<ListingRecord> {
    let disc = data.get(..DISCRIMINATOR_LEN)?;

    if disc == resale_discriminator() {
        decode_resale_listing(address, data).map(ListingRecord::Resale)
    } else if disc == primary_discriminator() {
        decode_primary_listing(address, data).map(ListingRecord::Primary)
    } else {
        None
    }
}

#[cfg(test)]
pub mod test_support {
    //! Byte-level encoders for building fixture payloads in tests.

    use super::*;

    pub fn encode_resale(record: &ResaleListingRecord, bump: u8) -> Vec<u8> {
        let mut buf = Vec::with_capacity(RESALE_LISTING_LEN);
        buf.extend_from_slice(resale_discriminator());
        buf.extend_from_slice(record.seller.as_ref());
        buf.extend_from_slice(record.origin_listing.as_ref());
        buf.extend_from_slice(record.asset_mint.as_ref());
        buf.extend_from_slice(&record.price_minor_units.to_le_bytes());
        buf.extend_from_slice(&record.listed_at.to_le_bytes());
        buf.push(bump);
        buf
    }

    pub fn encode_primary(record: &PrimaryListingRecord, bump: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(primary_discriminator());
        buf.extend_from_slice(record.creator.as_ref());
        buf.extend_from_slice(record.asset_mint.as_ref());
        buf.extend_from_slice(&(record.metadata_uri.len() as u32).to_le_bytes());
        buf.extend_from_slice(record.metadata_uri.as_bytes());
        buf.extend_from_slice(&record.price_minor_units.to_le_bytes());
        buf.extend_from_slice(&record.share_bps.to_le_bytes());
        buf.extend_from_slice(&record.duration_seconds.to_le_bytes());
        buf.extend_from_slice(&record.created_at.to_le_bytes());
        buf.push(record.resale_allowed as u8);
        buf.extend_from_slice(&record.resale_royalty_bps.to_le_bytes());
        buf.push(match record.status {
            ListingStatus::Active => 0,
            ListingStatus::Paused => 1,
            ListingStatus::Closed => 2,
        });
        buf.push(bump);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{encode_primary, encode_resale};
    use super::*;

    fn sample_resale() -> ResaleListingRecord {
        ResaleListingRecord {
            address: Pubkey::new_unique(),
            seller: Pubkey::new_unique(),
            origin_listing: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            price_minor_units: 250_000_000, // $250 at six decimals
            listed_at: 1_726_000_000,
        }
    }

    #[test]
    fn resale_round_trip() {
        let record = sample_resale();
        let bytes = encode_resale(&record, 254);
        assert_eq!(bytes.len(), RESALE_LISTING_LEN);

        let decoded = decode_resale_listing(record.address, &bytes).expect("valid payload");
        assert_eq!(decoded, record);

        // Re-encoding the decoded fields reproduces the original bytes.
        assert_eq!(encode_resale(&decoded, 254), bytes);
    }

    #[test]
    fn resale_price_past_native_safe_range() {
        let mut record = sample_resale();
        record.price_minor_units = (1u64 << 53) + 1;
        let bytes = encode_resale(&record, 0);

        let decoded = decode_resale_listing(record.address, &bytes).expect("valid payload");
        assert_eq!(decoded.price_minor_units, (1u64 << 53) + 1);
    }

    #[test]
    fn wrong_length_is_no_match_never_panic() {
        let address = Pubkey::new_unique();
        for len in [0usize, 1, 7, 8, 120, 122, 500] {
            let data = vec![0xABu8; len];
            assert!(decode_resale_listing(address, &data).is_none());
            assert!(decode_listing_account(address, &data).is_none());
        }
    }

    #[test]
    fn foreign_discriminator_is_no_match() {
        let record = sample_resale();
        let mut bytes = encode_resale(&record, 1);
        bytes[..8].copy_from_slice(&account_discriminator("EscrowVault"));

        // Correct length, wrong kind tag: the router skips it.
        assert!(decode_listing_account(record.address, &bytes).is_none());
    }

    #[test]
    fn primary_round_trip() {
        let record = PrimaryListingRecord {
            address: Pubkey::new_unique(),
            creator: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            metadata_uri: "https://example.com/meta/abc.json".to_owned(),
            price_minor_units: 1_000_000_000,
            share_bps: 500,
            duration_seconds: 86_400 * 365,
            created_at: 1_726_000_001,
            resale_allowed: true,
            resale_royalty_bps: 250,
            status: ListingStatus::Active,
        };
        let bytes = encode_primary(&record, 7);

        let decoded = decode_primary_listing(record.address, &bytes).expect("valid payload");
        assert_eq!(decoded, record);

        let routed = decode_listing_account(record.address, &bytes).expect("routed");
        assert!(matches!(routed, ListingRecord::Primary(_)));
        assert!(routed.is_active());
    }

    #[test]
    fn primary_with_truncated_uri_is_no_match() {
        let record = PrimaryListingRecord {
            address: Pubkey::new_unique(),
            creator: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            metadata_uri: "ipfs://bafy/meta.json".to_owned(),
            price_minor_units: 1,
            share_bps: 1,
            duration_seconds: 1,
            created_at: 1,
            resale_allowed: false,
            resale_royalty_bps: 0,
            status: ListingStatus::Active,
        };
        let mut bytes = encode_primary(&record, 0);
        bytes.truncate(bytes.len() - 3);

        assert!(decode_primary_listing(record.address, &bytes).is_none());
    }

    #[test]
    fn primary_with_unknown_status_is_no_match() {
        let record = PrimaryListingRecord {
            address: Pubkey::new_unique(),
            creator: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            metadata_uri: String::new(),
            price_minor_units: 1,
            share_bps: 1,
            duration_seconds: 1,
            created_at: 1,
            resale_allowed: false,
            resale_royalty_bps: 0,
            status: ListingStatus::Active,
        };
        let mut bytes = encode_primary(&record, 0);
        let status_index = bytes.len() - 2;
        bytes[status_index] = 99;

        assert!(decode_primary_listing(record.address, &bytes).is_none());
    }
}
