//! Type definitions for FFI.

use kls_core::{Config, HashAlgorithm, StatsSnapshot};

/// Hash algorithm selector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KlsHash {
    /// Wrapping byte sum.
    ByteSum = 0,
    /// XXH3 64-bit.
    Xxh3 = 1,
}

impl From<KlsHash> for HashAlgorithm {
    fn from(hash: KlsHash) -> Self {
        match hash {
            KlsHash::ByteSum => HashAlgorithm::ByteSum,
            KlsHash::Xxh3 => HashAlgorithm::Xxh3,
        }
    }
}

/// Configuration for initializing the store.
///
/// Zero in any numeric field selects the default.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct KlsConfig {
    /// Exclusive upper bound on key and value length (0 = 256).
    pub max_entry_size: usize,
    /// Number of buckets (0 = 256).
    pub bucket_count: usize,
    /// Bucket hash.
    pub hash: KlsHash,
    /// Maximum number of live keys (0 = unbounded).
    pub max_keys: usize,
}

impl Default for KlsConfig {
    fn default() -> Self {
        Self {
            max_entry_size: 0,
            bucket_count: 0,
            hash: KlsHash::ByteSum,
            max_keys: 0,
        }
    }
}

impl KlsConfig {
    /// Converts to a core configuration, substituting defaults for zeros.
    pub fn to_config(&self) -> Config {
        let mut config = Config::default().hash_algorithm(self.hash.into());
        if self.max_entry_size > 0 {
            config = config.max_entry_size(self.max_entry_size);
        }
        if self.bucket_count > 0 {
            config = config.bucket_count(self.bucket_count);
        }
        if self.max_keys > 0 {
            config = config.max_keys(Some(self.max_keys));
        }
        config
    }
}

/// Store statistics snapshot.
///
/// Use `kls_stats()` to get the current statistics.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KlsStats {
    /// Successful inserts.
    pub inserts: u64,
    /// Successful searches.
    pub searches: u64,
    /// Successful deletes.
    pub deletes: u64,
    /// Key records ever created.
    pub keys_created: u64,
    /// Key records currently in the table.
    pub live_keys: u64,
    /// Value bytes written.
    pub bytes_written: u64,
    /// Value bytes read.
    pub bytes_read: u64,
    /// Failed operations.
    pub errors: u64,
}

impl From<StatsSnapshot> for KlsStats {
    fn from(s: StatsSnapshot) -> Self {
        Self {
            inserts: s.inserts,
            searches: s.searches,
            deletes: s.deletes,
            keys_created: s.keys_created,
            live_keys: s.live_keys,
            bytes_written: s.bytes_written,
            bytes_read: s.bytes_read,
            errors: s.errors,
        }
    }
}
