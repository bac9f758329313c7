//! Bounds-checked little-endian reads for fixed-layout account payloads.
//!
//! 64-bit fields are reconstructed from two 32-bit words,
//! `(high << 32) | low`, so prices survive round-tripping through
//! consumers whose native number type cannot hold a full u64. The full
//! range, including values past 2^53, must reconstruct exactly.

/// Compose a u64 from its little-endian 32-bit halves.
#[inline]
pub fn compose_u64(low: u32, high: u32) -> u64 {
    ((high as u64) << 32) | (low as u64)
}

/// Read a little-endian u32 at `offset`, or `None` if out of range.
pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

/// Read a little-endian u16 at `offset`, or `None` if out of range.
pub fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes(bytes.try_into().ok()?))
}

/// Read a little-endian u64 at `offset` as two 32-bit words.
pub fn read_u64_words(data: &[u8], offset: usize) -> Option<u64> {
    let low = read_u32_le(data, offset)?;
    let high = read_u32_le(data, offset.checked_add(4)?)?;
    Some(compose_u64(low, high))
}

/// Read a little-endian i64 at `offset`, interpreting the high word as the
/// sign-carrying half. Used for Unix timestamps.
pub fn read_i64_words(data: &[u8], offset: usize) -> Option<i64> {
    read_u64_words(data, offset).map(|v| v as i64)
}
