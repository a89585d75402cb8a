//! Bucket chains.

use crate::entry::{KeyEntry, Released};
use crate::error::InsertError;

/// The key records whose key hashes to one bucket.
///
/// Chain order carries no meaning; lookups are a linear scan by key
/// content.
#[derive(Debug, Default)]
pub struct Bucket {
    chain: Vec<KeyEntry>,
}

impl Bucket {
    /// Creates an empty bucket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the record for `key`.
    pub fn find(&self, key: &[u8]) -> Option<&KeyEntry> {
        self.chain.iter().find(|entry| entry.matches(key))
    }

    pub(crate) fn find_mut(&mut self, key: &[u8]) -> Option<&mut KeyEntry> {
        self.chain.iter_mut().find(|entry| entry.matches(key))
    }

    /// Builds a record for `key` with `first_value` and links it in.
    ///
    /// The record is fully constructed before it is linked. On error the
    /// chain is exactly as it was. The caller is responsible for checking
    /// that `key` is not already present.
    pub(crate) fn create_and_link(
        &mut self,
        key: &[u8],
        first_value: &[u8],
        max_entry_size: usize,
    ) -> Result<&KeyEntry, InsertError> {
        debug_assert!(self.find(key).is_none());

        self.chain.try_reserve(1)?;
        let entry = KeyEntry::new(key, first_value, max_entry_size)?;
        let slot = self.chain.len();
        self.chain.push(entry);
        Ok(&self.chain[slot])
    }

    /// Unlinks the record for `key` and destroys it.
    ///
    /// Returns `None` if no record matches.
    pub(crate) fn unlink_and_destroy(&mut self, key: &[u8]) -> Option<Released> {
        let pos = self.chain.iter().position(|entry| entry.matches(key))?;
        let entry = self.chain.swap_remove(pos);
        Some(entry.destroy())
    }

    /// Number of records in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns true if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Destroys every record, returning how many keys were released.
    pub(crate) fn clear(&mut self) -> usize {
        let keys = self.chain.len();
        for entry in self.chain.drain(..) {
            entry.destroy();
        }
        self.chain = Vec::new();
        keys
    }
}
