//! Store statistics.
//!
//! Counters for monitoring store activity.
//!
//! # Usage
//!
//! ```rust
//! use kls_core::Store;
//!
//! let store = Store::default();
//! store.insert(b"user", b"alice").unwrap();
//!
//! let stats = store.stats();
//! assert_eq!(stats.inserts, 1);
//! assert_eq!(stats.live_keys, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Store statistics.
///
/// All counters are atomic and can be read while operations are in progress.
/// Values are monotonically increasing except the `live_keys` gauge.
#[derive(Debug, Default)]
pub struct StoreStats {
    // Operation counters
    /// Successful inserts.
    inserts: AtomicU64,
    /// Successful searches.
    searches: AtomicU64,
    /// Successful deletes.
    deletes: AtomicU64,

    // Key counters
    /// Key records created.
    keys_created: AtomicU64,
    /// Key records currently linked.
    live_keys: AtomicU64,

    // Bytes counters
    /// Value bytes accepted by inserts.
    bytes_written: AtomicU64,
    /// Value bytes returned by searches.
    bytes_read: AtomicU64,

    // Error counters
    /// Operations that returned an error.
    errors: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    // === Increment methods (internal use) ===

    pub(crate) fn record_insert(&self, bytes: u64) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_search(&self, bytes: u64) {
        self.searches.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_key_created(&self) {
        self.keys_created.fetch_add(1, Ordering::Relaxed);
        self.live_keys.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_keys_released(&self, count: u64) {
        self.live_keys.fetch_sub(count, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    // === Getter methods (public API) ===

    /// Returns the number of successful inserts.
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Returns the number of successful searches.
    pub fn searches(&self) -> u64 {
        self.searches.load(Ordering::Relaxed)
    }

    /// Returns the number of successful deletes.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Returns the number of key records ever created.
    pub fn keys_created(&self) -> u64 {
        self.keys_created.load(Ordering::Relaxed)
    }

    /// Returns the number of key records currently in the table.
    pub fn live_keys(&self) -> u64 {
        self.live_keys.load(Ordering::Relaxed)
    }

    /// Returns the total value bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns the total value bytes read.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// Returns the number of failed operations.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Takes a point-in-time copy of every counter.
    ///
    /// Counters are read individually, so a snapshot taken under load may
    /// mix values from slightly different instants.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            inserts: self.inserts(),
            searches: self.searches(),
            deletes: self.deletes(),
            keys_created: self.keys_created(),
            live_keys: self.live_keys(),
            bytes_written: self.bytes_written(),
            bytes_read: self.bytes_read(),
            errors: self.errors(),
        }
    }
}

/// Plain copy of [`StoreStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
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
