//! Bucket hashing.

use xxhash_rust::xxh3::xxh3_64;

/// Hash function used to place keys into buckets.
///
/// Both algorithms map equal keys to equal hashes, which is the only
/// property the table depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// Wrapping sum of byte values.
    ///
    /// One pass, no branches. Anagrams and other keys with equal byte sums
    /// share a bucket, so lookups degrade to a chain scan under
    /// adversarial input.
    #[default]
    ByteSum,
    /// XXH3 64-bit.
    Xxh3,
}

impl HashAlgorithm {
    /// Hashes `bytes`.
    #[inline]
    pub fn hash(self, bytes: &[u8]) -> u64 {
        match self {
            HashAlgorithm::ByteSum => u64::from(byte_sum(bytes)),
            HashAlgorithm::Xxh3 => xxh3_64(bytes),
        }
    }

    /// Maps `bytes` to a bucket in `0..bucket_count`.
    #[inline]
    pub fn bucket_index(self, bytes: &[u8], bucket_count: usize) -> usize {
        debug_assert!(bucket_count > 0);
        (self.hash(bytes) % bucket_count as u64) as usize
    }

    /// Returns the lowercase name used in configuration and the CLI.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::ByteSum => "byte-sum",
            HashAlgorithm::Xxh3 => "xxh3",
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "byte-sum" | "bytesum" | "sum" => Ok(HashAlgorithm::ByteSum),
            "xxh3" => Ok(HashAlgorithm::Xxh3),
            other => Err(format!("unknown hash algorithm: {other}")),
        }
    }
}

/// Sums the byte values, wrapping at 32 bits.
#[inline]
pub fn byte_sum(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |sum, &b| sum.wrapping_add(u32::from(b)))
}
