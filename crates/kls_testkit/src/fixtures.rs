//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores and key
//! families that are known to share a bucket.

use kls_core::{byte_sum, Config, Store};

/// Runs a test with a fresh default store.
///
/// # Example
///
/// ```rust
/// use kls_testkit::with_store;
///
/// with_store(|store| {
///     store.insert(b"user", b"alice").unwrap();
///     assert_eq!(store.search(b"user", 0).unwrap(), b"alice");
/// });
/// ```
pub fn with_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store) -> R,
{
    let store = Store::default();
    f(&store)
}

/// Creates a store with a single bucket, so every key shares one chain.
pub fn single_bucket_store() -> Store {
    Store::new(Config::new().bucket_count(1)).expect("single bucket config is valid")
}

/// Returns `count` distinct two-byte keys with identical byte sums.
///
/// Under the byte-sum hash all of them land in the same bucket, whatever
/// the bucket count.
///
/// # Panics
///
/// Panics if `count > 256`.
pub fn colliding_keys(count: usize) -> Vec<Vec<u8>> {
    assert!(count <= 256, "only 256 two-byte keys sum to 255");
    (0..count)
        .map(|i| {
            let first = i as u8;
            vec![first, 255 - first]
        })
        .inspect(|key| debug_assert_eq!(byte_sum(key), 255))
        .collect()
}

/// Deterministic value for the `index`-th value of the `key`-th key.
pub fn value_for(key: usize, index: usize) -> Vec<u8> {
    format!("k{key}:v{index}").into_bytes()
}

/// Inserts `values_per_key` values under each key, in order.
///
/// Values come from [`value_for`], so they can be checked afterwards with
/// [`assert_preloaded`].
pub fn preload(store: &Store, keys: &[Vec<u8>], values_per_key: usize) {
    for (k, key) in keys.iter().enumerate() {
        for v in 0..values_per_key {
            store
                .insert(key, &value_for(k, v))
                .expect("preload insert failed");
        }
    }
}

/// Checks that every key holds exactly the values [`preload`] inserted.
pub fn assert_preloaded(store: &Store, keys: &[Vec<u8>], values_per_key: usize) {
    for (k, key) in keys.iter().enumerate() {
        for v in 0..values_per_key {
            let value = store.search(key, v).expect("preloaded value missing");
            assert_eq!(value.to_vec(), value_for(k, v), "key {k} value {v}");
        }
        assert!(
            store.search(key, values_per_key).is_err(),
            "key {k} holds extra values"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kls_core::{HashAlgorithm, StoreError};

    #[test]
    fn colliding_keys_share_bucket() {
        let keys = colliding_keys(64);
        let first = HashAlgorithm::ByteSum.bucket_index(&keys[0], 256);
        for key in &keys {
            assert_eq!(HashAlgorithm::ByteSum.bucket_index(key, 256), first);
        }

        let mut unique = keys.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 64);
    }

    #[test]
    fn preload_and_verify_colliding_family() {
        with_store(|store| {
            let keys = colliding_keys(32);
            preload(store, &keys, 3);
            assert_eq!(store.longest_chain(), 32);
            assert_preloaded(store, &keys, 3);

            store.delete(&keys[5]).unwrap();
            assert_eq!(store.search(&keys[5], 0), Err(StoreError::KeyNotFound));
            assert_eq!(store.search(&keys[6], 2).unwrap().to_vec(), value_for(6, 2));
        });
    }

    #[test]
    fn single_bucket_chain() {
        let store = single_bucket_store();
        let keys: Vec<Vec<u8>> = (0..20u8).map(|i| vec![i; 3]).collect();
        preload(&store, &keys, 2);
        assert_eq!(store.longest_chain(), 20);
        assert_preloaded(&store, &keys, 2);
    }
}
