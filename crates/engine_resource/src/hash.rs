//! FNV-1a hashing for resource ids and render batching.
//!
//! FNV-1a is deterministic across runs and platforms, which keeps resource
//! id hashes and render sort keys stable between sessions.

/// FNV-1a 32-bit offset basis.
const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime.
const FNV_PRIME: u32 = 0x0100_0193;

/// Hash `bytes` with FNV-1a 32-bit.
///
/// ```text
/// hash = 0x811c9dc5
/// for each byte:
///     hash = hash XOR byte
///     hash = hash * 0x01000193
/// ```
#[must_use]
pub const fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Hash a sequence of words, each fed as little-endian bytes.
#[must_use]
pub fn fnv1a_32_words(words: &[u32]) -> u32 {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    fnv1a_32(&bytes)
}
