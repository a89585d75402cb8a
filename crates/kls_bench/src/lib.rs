//! Benchmark utilities.

use rand::Rng;

/// Generate random bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate `count` distinct keys of `len` bytes.
///
/// The leading bytes carry the index little-endian, so keys are unique
/// when `len >= 8`. Shorter keys keep only the low bytes of the index.
pub fn generate_keys(count: usize, len: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let mut key = random_data(len);
            let tag = (i as u64).to_le_bytes();
            let n = len.min(tag.len());
            key[..n].copy_from_slice(&tag[..n]);
            key
        })
        .collect()
}
