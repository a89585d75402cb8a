//! Store configuration.

use crate::error::{StoreError, StoreResult};
use crate::hash::HashAlgorithm;

/// Default exclusive upper bound on key and value length.
pub const DEFAULT_MAX_ENTRY_SIZE: usize = 256;

/// Default number of buckets.
pub const DEFAULT_BUCKET_COUNT: usize = 256;

/// Configuration for creating a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Keys and values must be strictly shorter than this.
    pub max_entry_size: usize,

    /// Number of buckets. Fixed for the lifetime of the store.
    pub bucket_count: usize,

    /// Hash used to place keys into buckets.
    pub hash_algorithm: HashAlgorithm,

    /// Maximum number of live keys (`None` = unbounded).
    pub max_keys: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
            bucket_count: DEFAULT_BUCKET_COUNT,
            hash_algorithm: HashAlgorithm::ByteSum,
            max_keys: None,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the exclusive size bound for keys and values.
    #[must_use]
    pub const fn max_entry_size(mut self, size: usize) -> Self {
        self.max_entry_size = size;
        self
    }

    /// Sets the number of buckets.
    #[must_use]
    pub const fn bucket_count(mut self, count: usize) -> Self {
        self.bucket_count = count;
        self
    }

    /// Sets the bucket hash.
    #[must_use]
    pub const fn hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    /// Caps the number of live keys.
    #[must_use]
    pub const fn max_keys(mut self, limit: Option<usize>) -> Self {
        self.max_keys = limit;
        self
    }

    /// Checks that the configuration can back a store.
    pub fn validate(&self) -> StoreResult<()> {
        if self.max_entry_size == 0 {
            return Err(StoreError::invalid_config("max_entry_size must be non-zero"));
        }
        if self.bucket_count == 0 {
            return Err(StoreError::invalid_config("bucket_count must be non-zero"));
        }
        if self.max_keys == Some(0) {
            return Err(StoreError::invalid_config("max_keys must be non-zero"));
        }
        Ok(())
    }
}
