//! Property-based test generators using proptest.
//!
//! Provides strategies for keys and values that respect a store's entry
//! size bound, operation sequences, and a reference model to check a
//! [`Store`] against.

use kls_core::{Store, StoreError};
use proptest::prelude::*;
use std::collections::HashMap;

/// Strategy for keys accepted by a store with the given `max_entry_size`.
pub fn key_strategy(max_entry_size: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..max_entry_size)
}

/// Strategy for values accepted by a store with the given `max_entry_size`.
pub fn value_strategy(max_entry_size: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..max_entry_size)
}

/// Strategy for byte strings at or above `max_entry_size`, up to twice it.
pub fn oversize_strategy(max_entry_size: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), max_entry_size..=max_entry_size * 2)
}

/// Strategy for two distinct keys with the same bytes in different order.
///
/// Such pairs collide under the byte-sum hash.
pub fn anagram_pair_strategy(max_entry_size: usize) -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    prop::collection::vec(any::<u8>(), 2..max_entry_size.max(3))
        .prop_filter("needs two distinct bytes", |key| {
            key.iter().any(|b| *b != key[0])
        })
        .prop_map(|key| {
            // A one-step rotation differs unless every byte is equal.
            let mut other = key.clone();
            other.rotate_left(1);
            (key, other)
        })
}

/// An operation against a store.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    /// Append a value under a key.
    Insert {
        /// Key
        key: Vec<u8>,
        /// Value
        value: Vec<u8>,
    },
    /// Read one value of a key.
    Search {
        /// Key
        key: Vec<u8>,
        /// Position in the key's value list
        index: usize,
    },
    /// Remove a key and all its values.
    Delete {
        /// Key
        key: Vec<u8>,
    },
}

/// Strategy for keys drawn from a small alphabet, so operations revisit
/// the same keys often.
pub fn small_key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c', 0u8]), 0..3)
}

/// Strategy for store operations over [`small_key_strategy`] keys.
pub fn store_operation_strategy(max_entry_size: usize) -> impl Strategy<Value = StoreOperation> {
    prop_oneof![
        3 => (small_key_strategy(), value_strategy(max_entry_size))
            .prop_map(|(key, value)| StoreOperation::Insert { key, value }),
        2 => (small_key_strategy(), 0..4usize)
            .prop_map(|(key, index)| StoreOperation::Search { key, index }),
        1 => small_key_strategy().prop_map(|key| StoreOperation::Delete { key }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    max_entry_size: usize,
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StoreOperation>> {
    prop::collection::vec(store_operation_strategy(max_entry_size), min_ops..max_ops)
}

/// Outcome of one operation, comparable between a store and the model.
pub type Outcome = Result<Option<Vec<u8>>, StoreError>;

/// Reference model of a store: a plain map from key to value list.
#[derive(Debug, Clone, Default)]
pub struct ReferenceModel {
    entries: HashMap<Vec<u8>, Vec<Vec<u8>>>,
}

impl ReferenceModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an operation that is within the size bound.
    pub fn apply(&mut self, op: &StoreOperation) -> Outcome {
        match op {
            StoreOperation::Insert { key, value } => {
                self.entries
                    .entry(key.clone())
                    .or_default()
                    .push(value.clone());
                Ok(None)
            }
            StoreOperation::Search { key, index } => {
                let values = self.entries.get(key).ok_or(StoreError::KeyNotFound)?;
                values
                    .get(*index)
                    .cloned()
                    .map(Some)
                    .ok_or(StoreError::IndexOutOfRange {
                        index: *index,
                        len: values.len(),
                    })
            }
            StoreOperation::Delete { key } => self
                .entries
                .remove(key)
                .map(|_| None)
                .ok_or(StoreError::KeyNotFound),
        }
    }

    /// Number of keys in the model.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

/// Applies an operation to a store, shaped like [`ReferenceModel::apply`].
pub fn apply_to_store(store: &Store, op: &StoreOperation) -> Outcome {
    match op {
        StoreOperation::Insert { key, value } => store.insert(key, value).map(|()| None),
        StoreOperation::Search { key, index } => {
            store.search(key, *index).map(|v| Some(v.to_vec()))
        }
        StoreOperation::Delete { key } => store.delete(key).map(|()| None),
    }
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
