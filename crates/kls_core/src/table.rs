//! Bucket array with per-bucket locking.

use crate::bucket::Bucket;
use crate::hash::HashAlgorithm;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Fixed-size array of independently locked buckets.
///
/// An operation on a key only ever touches that key's bucket, so holding
/// the bucket's lock for the whole locate-scan-act sequence makes every
/// operation linearizable.
pub struct Table {
    buckets: Box<[RwLock<Bucket>]>,
    hash: HashAlgorithm,
}

impl Table {
    /// Creates a table with `bucket_count` empty buckets.
    pub fn new(bucket_count: usize, hash: HashAlgorithm) -> Self {
        let buckets = (0..bucket_count.max(1))
            .map(|_| RwLock::new(Bucket::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { buckets, hash }
    }

    /// Returns the bucket index for `key`.
    #[inline]
    pub fn bucket_index(&self, key: &[u8]) -> usize {
        self.hash.bucket_index(key, self.buckets.len())
    }

    /// Locks `key`'s bucket for reading.
    pub fn read(&self, key: &[u8]) -> RwLockReadGuard<'_, Bucket> {
        self.buckets[self.bucket_index(key)].read()
    }

    /// Locks `key`'s bucket for writing.
    pub fn write(&self, key: &[u8]) -> RwLockWriteGuard<'_, Bucket> {
        self.buckets[self.bucket_index(key)].write()
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Hash algorithm in use.
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    /// Length of the longest chain.
    pub fn longest_chain(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.read().len())
            .max()
            .unwrap_or(0)
    }

    /// Destroys every key record, returning how many were released.
    ///
    /// Buckets are locked one at a time; callers wanting an empty table
    /// must not run concurrent inserts.
    pub fn clear(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.write().clear())
            .sum()
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("bucket_count", &self.buckets.len())
            .field("hash", &self.hash)
            .finish()
    }
}
