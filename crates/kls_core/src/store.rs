//! Store operations.

use crate::buffer::ByteString;
use crate::config::Config;
use crate::error::{EntryKind, InsertError, StoreError, StoreResult};
use crate::stats::{StatsSnapshot, StoreStats};
use crate::table::Table;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// A concurrent multi-valued key/list store.
///
/// Each key maps to an ordered sequence of values. Values are appended,
/// never changed in place, and a key is removed together with all of its
/// values.
///
/// `Store` is `Send + Sync`; share it behind an `Arc` or a `static`.
///
/// # Example
///
/// ```rust
/// use kls_core::{Store, StoreError};
///
/// let store = Store::default();
/// store.insert(b"user", b"alice").unwrap();
/// store.insert(b"user", b"bob").unwrap();
///
/// assert_eq!(store.search(b"user", 0).unwrap(), b"alice");
/// assert_eq!(store.search(b"user", 1).unwrap(), b"bob");
/// assert!(matches!(
///     store.search(b"user", 2),
///     Err(StoreError::IndexOutOfRange { .. })
/// ));
///
/// store.delete(b"user").unwrap();
/// assert_eq!(store.search(b"user", 0), Err(StoreError::KeyNotFound));
/// ```
#[derive(Debug)]
pub struct Store {
    config: Config,
    table: Table,
    stats: StoreStats,
    /// Reserved key slots, checked against `config.max_keys`.
    key_slots: AtomicUsize,
}

impl Store {
    /// Creates an empty store.
    pub fn new(config: Config) -> StoreResult<Self> {
        config.validate()?;
        let table = Table::new(config.bucket_count, config.hash_algorithm);
        debug!(
            buckets = config.bucket_count,
            hash = config.hash_algorithm.name(),
            max_entry_size = config.max_entry_size,
            "store created"
        );
        Ok(Self {
            config,
            table,
            stats: StoreStats::new(),
            key_slots: AtomicUsize::new(0),
        })
    }

    /// Appends `value` to `key`'s sequence, creating the key if needed.
    ///
    /// On success `value` is the key's last value and all earlier values
    /// are unchanged. On error the store is exactly as it was.
    pub fn insert(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let result = self.insert_inner(key, value);
        match &result {
            Ok(()) => self.stats.record_insert(value.len() as u64),
            Err(_) => self.stats.record_error(),
        }
        result
    }

    fn insert_inner(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.check_key(key)?;
        let max = self.config.max_entry_size;
        if value.len() >= max {
            return Err(InsertError::ValueTooLarge {
                len: value.len(),
                max,
            }
            .into());
        }

        let mut bucket = self.table.write(key);

        if let Some(entry) = bucket.find_mut(key) {
            entry.values_mut().append(value, max)?;
            trace!(key_len = key.len(), value_len = value.len(), "value appended");
            return Ok(());
        }

        self.reserve_key_slot()?;
        if let Err(e) = bucket.create_and_link(key, value, max) {
            self.release_key_slots(1);
            return Err(e.into());
        }
        drop(bucket);

        self.stats.record_key_created();
        debug!(key_len = key.len(), value_len = value.len(), "key created");
        Ok(())
    }

    /// Returns the value at 0-based `index` under `key`.
    pub fn search(&self, key: &[u8], index: usize) -> StoreResult<ByteString> {
        let result = self.search_inner(key, index);
        match &result {
            Ok(value) => self.stats.record_search(value.len() as u64),
            Err(_) => self.stats.record_error(),
        }
        result
    }

    fn search_inner(&self, key: &[u8], index: usize) -> StoreResult<ByteString> {
        self.check_key(key)?;
        let bucket = self.table.read(key);
        let entry = bucket.find(key).ok_or(StoreError::KeyNotFound)?;
        let value = entry.values().get(index)?;
        trace!(key_len = key.len(), index, "value found");
        Ok(value)
    }

    /// Removes `key` and every value stored under it.
    pub fn delete(&self, key: &[u8]) -> StoreResult<()> {
        let result = self.delete_inner(key);
        match &result {
            Ok(()) => self.stats.record_delete(),
            Err(_) => self.stats.record_error(),
        }
        result
    }

    fn delete_inner(&self, key: &[u8]) -> StoreResult<()> {
        self.check_key(key)?;
        let released = self
            .table
            .write(key)
            .unlink_and_destroy(key)
            .ok_or(StoreError::KeyNotFound)?;

        self.release_key_slots(1);
        self.stats.record_keys_released(1);
        debug!(
            key_len = key.len(),
            values = released.values,
            bytes = released.bytes,
            "key deleted"
        );
        Ok(())
    }

    /// Destroys every key and value, returning how many keys were released.
    ///
    /// The store stays usable afterwards. Inserts racing with `clear` may
    /// survive it.
    pub fn clear(&self) -> usize {
        let released = self.table.clear();
        self.release_key_slots(released);
        self.stats.record_keys_released(released as u64);
        debug!(keys = released, "store cleared");
        released
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a snapshot of the statistics counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns the length of the longest bucket chain.
    pub fn longest_chain(&self) -> usize {
        self.table.longest_chain()
    }

    /// Rejects keys at or above the entry size bound.
    pub fn check_key(&self, key: &[u8]) -> StoreResult<()> {
        if key.len() >= self.config.max_entry_size {
            return Err(StoreError::key_too_large(
                key.len(),
                self.config.max_entry_size,
            ));
        }
        Ok(())
    }

    /// Rejects a key or value length at or above the entry size bound.
    ///
    /// For callers that validate a length before they hold the bytes. A
    /// rejection is counted as a failed operation, exactly as the same
    /// oversize buffer passed to [`insert`](Self::insert) would be.
    pub fn check_len(&self, what: EntryKind, len: usize) -> StoreResult<()> {
        let max = self.config.max_entry_size;
        if len >= max {
            self.stats.record_error();
            return Err(StoreError::SizeExceeded { what, len, max });
        }
        Ok(())
    }

    fn reserve_key_slot(&self) -> StoreResult<()> {
        let limit = self.config.max_keys.unwrap_or(usize::MAX);
        self.key_slots
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < limit).then(|| n + 1)
            })
            .map(|_| ())
            .map_err(|_| StoreError::KeyLimitReached { limit })
    }

    fn release_key_slots(&self, count: usize) {
        self.key_slots.fetch_sub(count, Ordering::AcqRel);
    }
}

impl Default for Store {
    fn default() -> Self {
        let config = Config::default();
        Self {
            table: Table::new(config.bucket_count, config.hash_algorithm),
            config,
            stats: StoreStats::new(),
            key_slots: AtomicUsize::new(0),
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        let released = self.table.clear();
        if released > 0 {
            debug!(keys = released, "store dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgorithm;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn end_to_end_user_scenario() {
        let store = Store::default();

        store.insert(b"user", b"alice").unwrap();
        store.insert(b"user", b"bob").unwrap();
        assert_eq!(store.search(b"user", 0).unwrap(), b"alice");
        assert_eq!(store.search(b"user", 1).unwrap(), b"bob");
        assert_eq!(
            store.search(b"user", 2),
            Err(StoreError::IndexOutOfRange { index: 2, len: 2 })
        );
        store.delete(b"user").unwrap();
        assert_eq!(store.search(b"user", 0), Err(StoreError::KeyNotFound));
    }

    #[test]
    fn delete_removes_all_values() {
        let store = Store::default();
        store.insert(b"k", b"v1").unwrap();
        store.insert(b"k", b"v2").unwrap();
        store.delete(b"k").unwrap();

        assert_eq!(store.search(b"k", 0), Err(StoreError::KeyNotFound));
        assert_eq!(store.search(b"k", 1), Err(StoreError::KeyNotFound));

        // A fresh insert starts a new sequence.
        store.insert(b"k", b"v3").unwrap();
        assert_eq!(store.search(b"k", 0).unwrap(), b"v3");
        assert!(store.search(b"k", 1).is_err());
    }

    #[test]
    fn delete_missing_is_idempotent() {
        let store = Store::default();
        store.insert(b"other", b"x").unwrap();

        assert_eq!(store.delete(b"ghost"), Err(StoreError::KeyNotFound));
        assert_eq!(store.delete(b"ghost"), Err(StoreError::KeyNotFound));
        assert_eq!(store.search(b"other", 0).unwrap(), b"x");
        assert_eq!(store.stats().live_keys, 1);
    }

    #[test]
    fn key_size_boundary() {
        let store = Store::default();
        let at_limit = vec![b'k'; 256];
        let below = vec![b'k'; 255];

        assert_eq!(
            store.insert(&at_limit, b"v"),
            Err(StoreError::SizeExceeded {
                what: EntryKind::Key,
                len: 256,
                max: 256
            })
        );
        store.insert(&below, b"v").unwrap();
        assert_eq!(store.search(&below, 0).unwrap(), b"v");

        assert!(matches!(
            store.search(&at_limit, 0),
            Err(StoreError::SizeExceeded { .. })
        ));
        assert!(matches!(
            store.delete(&at_limit),
            Err(StoreError::SizeExceeded { .. })
        ));
    }

    #[test]
    fn length_check_counts_like_insert() {
        let store = Store::default();
        assert_eq!(store.check_len(EntryKind::Value, 255), Ok(()));
        assert_eq!(store.stats().errors, 0);

        let by_length = store.check_len(EntryKind::Key, 256);
        let errors_after_check = store.stats().errors;
        let by_insert = store.insert(&[b'k'; 256], b"v");

        assert_eq!(by_length, by_insert);
        assert_eq!(errors_after_check, 1);
        assert_eq!(store.stats().errors, 2);
    }

    #[test]
    fn value_size_boundary() {
        let store = Store::default();
        let at_limit = vec![0u8; 256];
        let below = vec![0u8; 255];

        assert_eq!(
            store.insert(b"k", &at_limit),
            Err(StoreError::SizeExceeded {
                what: EntryKind::Value,
                len: 256,
                max: 256
            })
        );
        // Rejected first value must not leave the key behind.
        assert_eq!(store.search(b"k", 0), Err(StoreError::KeyNotFound));
        assert_eq!(store.stats().live_keys, 0);

        store.insert(b"k", &below).unwrap();
        assert!(store.insert(b"k", &at_limit).is_err());
        assert_eq!(store.search(b"k", 0).unwrap().len(), 255);
        assert!(store.search(b"k", 1).is_err());
    }

    #[test]
    fn colliding_keys_are_isolated() {
        let store = Store::default();
        // Same byte sum, same bucket.
        store.insert(b"ab", b"1").unwrap();
        store.insert(b"ba", b"2").unwrap();
        store.insert(b"ab", b"3").unwrap();

        assert_eq!(store.longest_chain(), 2);
        assert_eq!(store.search(b"ab", 0).unwrap(), b"1");
        assert_eq!(store.search(b"ab", 1).unwrap(), b"3");
        assert_eq!(store.search(b"ba", 0).unwrap(), b"2");
        assert!(store.search(b"ba", 1).is_err());

        store.delete(b"ab").unwrap();
        assert_eq!(store.search(b"ba", 0).unwrap(), b"2");
    }

    #[test]
    fn zero_bytes_are_content() {
        let store = Store::default();
        store.insert(b"a\0", b"\0\0").unwrap();
        store.insert(b"a", b"x").unwrap();

        assert_eq!(store.search(b"a\0", 0).unwrap(), b"\0\0");
        assert_eq!(store.search(b"a", 0).unwrap(), b"x");
        assert_eq!(store.search(b"", 0), Err(StoreError::KeyNotFound));
    }

    #[test]
    fn empty_key_and_value() {
        let store = Store::default();
        store.insert(b"", b"").unwrap();
        assert!(store.search(b"", 0).unwrap().is_empty());
        store.delete(b"").unwrap();
    }

    #[test]
    fn key_limit() {
        let store = Store::new(Config::new().max_keys(Some(2))).unwrap();
        store.insert(b"a", b"1").unwrap();
        store.insert(b"b", b"1").unwrap();

        assert_eq!(
            store.insert(b"c", b"1"),
            Err(StoreError::KeyLimitReached { limit: 2 })
        );
        // Appending to an existing key is not limited.
        store.insert(b"a", b"2").unwrap();

        store.delete(b"b").unwrap();
        store.insert(b"c", b"1").unwrap();
    }

    #[test]
    fn rejected_first_value_takes_no_key_slot() {
        let store = Store::new(Config::new().max_keys(Some(1)).max_entry_size(8)).unwrap();
        assert!(store.insert(b"a", &[0u8; 8]).is_err());
        store.insert(b"a", b"ok").unwrap();
    }

    #[test]
    fn custom_entry_size() {
        let store = Store::new(Config::new().max_entry_size(4)).unwrap();
        store.insert(b"abc", b"xyz").unwrap();
        assert!(store.insert(b"abcd", b"x").is_err());
        assert!(store.insert(b"a", b"wxyz").is_err());
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(matches!(
            Store::new(Config::new().bucket_count(0)),
            Err(StoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn xxh3_store_behaves_the_same() {
        let store = Store::new(Config::new().hash_algorithm(HashAlgorithm::Xxh3)).unwrap();
        store.insert(b"user", b"alice").unwrap();
        store.insert(b"user", b"bob").unwrap();
        assert_eq!(store.search(b"user", 1).unwrap(), b"bob");
        store.delete(b"user").unwrap();
        assert_eq!(store.delete(b"user"), Err(StoreError::KeyNotFound));
    }

    #[test]
    fn clear_releases_everything() {
        let store = Store::default();
        for i in 0..50u8 {
            store.insert(&[i], b"v").unwrap();
            store.insert(&[i], b"w").unwrap();
        }
        assert_eq!(store.stats().live_keys, 50);
        assert_eq!(store.clear(), 50);
        assert_eq!(store.stats().live_keys, 0);
        assert_eq!(store.search(&[0], 0), Err(StoreError::KeyNotFound));

        store.insert(b"again", b"v").unwrap();
        assert_eq!(store.search(b"again", 0).unwrap(), b"v");
    }

    #[test]
    fn stats_track_operations() {
        let store = Store::default();
        store.insert(b"k", b"abc").unwrap();
        store.insert(b"k", b"de").unwrap();
        store.search(b"k", 0).unwrap();
        let _ = store.search(b"k", 9);
        store.delete(b"k").unwrap();

        let stats = store.stats();
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.bytes_written, 5);
        assert_eq!(stats.searches, 1);
        assert_eq!(stats.bytes_read, 3);
        assert_eq!(stats.deletes, 1);
        assert_eq!(stats.keys_created, 1);
        assert_eq!(stats.live_keys, 0);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn concurrent_inserts_same_key() {
        let store = Arc::new(Store::default());
        let threads = 8;
        let per_thread = 100;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..per_thread {
                        let value = format!("{t}:{i}");
                        store.insert(b"shared", value.as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let total = threads * per_thread;
        let mut seen = std::collections::HashSet::new();
        let mut last_per_thread = vec![None; threads];
        for index in 0..total {
            let value = store.search(b"shared", index).unwrap();
            let text = String::from_utf8(value.to_vec()).unwrap();
            assert!(seen.insert(text.clone()), "duplicate value {text}");

            // Each thread's own inserts keep their program order.
            let (t, i) = text.split_once(':').unwrap();
            let (t, i): (usize, usize) = (t.parse().unwrap(), i.parse().unwrap());
            if let Some(prev) = last_per_thread[t] {
                assert!(i > prev);
            }
            last_per_thread[t] = Some(i);
        }
        assert!(store.search(b"shared", total).is_err());
        assert_eq!(store.stats().keys_created, 1);
    }

    #[test]
    fn concurrent_create_and_delete_distinct_keys() {
        let store = Arc::new(Store::default());
        let handles: Vec<_> = (0..4u8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..200u8 {
                        let key = [t, i];
                        store.insert(&key, b"v").unwrap();
                        if i % 2 == 0 {
                            store.delete(&key).unwrap();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.stats().live_keys, 400);
        for t in 0..4u8 {
            for i in 0..200u8 {
                let found = store.search(&[t, i], 0).is_ok();
                assert_eq!(found, i % 2 == 1);
            }
        }
    }
}
