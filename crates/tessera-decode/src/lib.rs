//! Tessera account decoding: raw ledger account bytes → typed listing records.
//!
//! This crate is intentionally "view-only":
//! - It does NOT perform RPC calls.
//! - It only parses account payloads already retrieved by the caller.
//!
//! The program's address space is shared by several record kinds, so most
//! payloads handed to a decoder are simply *not* the kind being decoded.
//! Structural mismatch (wrong length, wrong shape) is therefore `None`,
//! never an error, and nothing in here can panic on malformed input.
//!
//! Higher layers can:
//! - feed in `(address, bytes)` pairs from a program-accounts scan,
//! - keep the records that decode,
//! - cache the resulting listing sets.

pub mod layout;
pub mod records;
pub mod words;

pub use layout::{account_discriminator, FieldSpec, DISCRIMINATOR_LEN, RESALE_LISTING_LEN};
pub use records::{
    decode_listing_account, decode_primary_listing, decode_resale_listing, ListingRecord,
    ListingStatus, PrimaryListingRecord, ResaleListingRecord,
};
pub use words::{compose_u64, read_i64_words, read_u64_words};
