//! Byte-layout tables for the marketplace account kinds.
//!
//! Offsets live here, not scattered through the decoders: each record kind
//! is described by a table of `(name, offset, width)` entries, and
//! compile-time assertions keep the tables contiguous and tied to the
//! expected payload sizes. A decoder reads through the named entries, so a
//! field added to a layout fails the assertions instead of silently
//! shifting everything after it.

use sha2::{Digest, Sha256};

/// Width of the 8-byte kind discriminator at the start of every payload.
pub const DISCRIMINATOR_LEN: usize = 8;

/// One fixed-width field in an account layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

impl FieldSpec {
    pub const fn new(name: &'static str, offset: usize, width: usize) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.width
    }
}

const fn layout_end(fields: &[FieldSpec]) -> usize {
    let mut end = 0;
    let mut i = 0;
    while i < fields.len() {
        if fields[i].end() > end {
            end = fields[i].end();
        }
        i += 1;
    }
    end
}

const fn is_contiguous(fields: &[FieldSpec], start: usize) -> bool {
    let mut expected = start;
    let mut i = 0;
    while i < fields.len() {
        if fields[i].offset != expected {
            return false;
        }
        expected = fields[i].end();
        i += 1;
    }
    true
}

// ---------------------------------------------------------------------------
// Resale listing: a fully fixed 121-byte layout.
// ---------------------------------------------------------------------------

pub const RESALE_SELLER: FieldSpec = FieldSpec::new("seller", 8, 32);
pub const RESALE_ORIGIN_LISTING: FieldSpec = FieldSpec::new("origin_listing", 40, 32);
pub const RESALE_ASSET_MINT: FieldSpec = FieldSpec::new("asset_mint", 72, 32);
pub const RESALE_PRICE: FieldSpec = FieldSpec::new("price_minor_units", 104, 8);
pub const RESALE_LISTED_AT: FieldSpec = FieldSpec::new("listed_at", 112, 8);
pub const RESALE_BUMP: FieldSpec = FieldSpec::new("bump", 120, 1);

pub const RESALE_LISTING_FIELDS: [FieldSpec; 6] = [
    RESALE_SELLER,
    RESALE_ORIGIN_LISTING,
    RESALE_ASSET_MINT,
    RESALE_PRICE,
    RESALE_LISTED_AT,
    RESALE_BUMP,
];

/// Exact payload size of a resale listing account.
pub const RESALE_LISTING_LEN: usize = 121;

const _: () = assert!(layout_end(&RESALE_LISTING_FIELDS) == RESALE_LISTING_LEN);
const _: () = assert!(is_contiguous(&RESALE_LISTING_FIELDS, DISCRIMINATOR_LEN));

// ---------------------------------------------------------------------------
// Primary listing: fixed head, length-prefixed metadata URI, fixed tail.
// Total payload size is PRIMARY_HEAD_LEN + uri_len + PRIMARY_TAIL_LEN.
// ---------------------------------------------------------------------------

pub const PRIMARY_CREATOR: FieldSpec = FieldSpec::new("creator", 8, 32);
pub const PRIMARY_ASSET_MINT: FieldSpec = FieldSpec::new("asset_mint", 40, 32);
pub const PRIMARY_URI_LEN: FieldSpec = FieldSpec::new("metadata_uri_len", 72, 4);

pub const PRIMARY_LISTING_HEAD: [FieldSpec; 3] =
    [PRIMARY_CREATOR, PRIMARY_ASSET_MINT, PRIMARY_URI_LEN];

/// Bytes before the variable-length metadata URI.
pub const PRIMARY_HEAD_LEN: usize = 76;

// Tail offsets are relative to the first byte after the URI.
pub const PRIMARY_PRICE: FieldSpec = FieldSpec::new("price_minor_units", 0, 8);
pub const PRIMARY_SHARE_BPS: FieldSpec = FieldSpec::new("share_bps", 8, 2);
pub const PRIMARY_DURATION: FieldSpec = FieldSpec::new("duration_seconds", 10, 8);
pub const PRIMARY_CREATED_AT: FieldSpec = FieldSpec::new("created_at", 18, 8);
pub const PRIMARY_RESALE_ALLOWED: FieldSpec = FieldSpec::new("resale_allowed", 26, 1);
pub const PRIMARY_RESALE_ROYALTY_BPS: FieldSpec = FieldSpec::new("resale_royalty_bps", 27, 2);
pub const PRIMARY_STATUS: FieldSpec = FieldSpec::new("status", 29, 1);
pub const PRIMARY_BUMP: FieldSpec = FieldSpec::new("bump", 30, 1);

pub const PRIMARY_LISTING_TAIL: [FieldSpec; 8] = [
    PRIMARY_PRICE,
    PRIMARY_SHARE_BPS,
    PRIMARY_DURATION,
    PRIMARY_CREATED_AT,
    PRIMARY_RESALE_ALLOWED,
    PRIMARY_RESALE_ROYALTY_BPS,
    PRIMARY_STATUS,
    PRIMARY_BUMP,
];

/// Bytes after the variable-length metadata URI.
pub const PRIMARY_TAIL_LEN: usize = 31;

const _: () = assert!(layout_end(&PRIMARY_LISTING_HEAD) == PRIMARY_HEAD_LEN);
const _: () = assert!(is_contiguous(&PRIMARY_LISTING_HEAD, DISCRIMINATOR_LEN));
const _: () = assert!(layout_end(&PRIMARY_LISTING_TAIL) == PRIMARY_TAIL_LEN);
const _: () = assert!(is_contiguous(&PRIMARY_LISTING_TAIL, 0));

/// Anchor-style account discriminator: `sha256("account:<Name>")[..8]`.
///
/// Routes which decoder to try; the decoders themselves only validate shape.
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(b"account:");
    hasher.update(name.as_bytes());
    let hash = hasher.finalize();
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&hash[..8]);
    disc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminators_distinguish_record_kinds() {
        let resale = account_discriminator("ResaleListing");
        let primary = account_discriminator("RoyaltyListing");
        assert_ne!(resale, primary);
        assert_eq!(resale, account_discriminator("ResaleListing"));
    }

    #[test]
    fn resale_table_covers_expected_size() {
        let total: usize = RESALE_LISTING_FIELDS.iter().map(|f| f.width).sum();
        assert_eq!(DISCRIMINATOR_LEN + total, RESALE_LISTING_LEN);
    }
}
