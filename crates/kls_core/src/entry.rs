//! Key records.

use crate::buffer::{equals, ByteString};
use crate::error::InsertError;
use crate::value::ValueList;

/// One key and the values stored under it.
///
/// A record always holds at least one value: it is built together with its
/// first value and only ever destroyed as a whole.
#[derive(Debug)]
pub struct KeyEntry {
    key: ByteString,
    values: ValueList,
}

/// What tearing down a key record released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Released {
    /// Number of values dropped.
    pub values: usize,
    /// Payload bytes dropped, key included.
    pub bytes: usize,
}

impl KeyEntry {
    /// Builds a record holding `key` and `first_value`.
    ///
    /// The value list is built before the key is copied, so a failure at
    /// either step leaves nothing allocated behind.
    pub(crate) fn new(
        key: &[u8],
        first_value: &[u8],
        max_entry_size: usize,
    ) -> Result<Self, InsertError> {
        let values = ValueList::with_first(first_value, max_entry_size)?;
        let key = ByteString::copy_from(key)?;
        Ok(Self { key, values })
    }

    /// Returns the key.
    pub fn key(&self) -> &ByteString {
        &self.key
    }

    /// Returns the values.
    pub fn values(&self) -> &ValueList {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut ValueList {
        &mut self.values
    }

    /// Returns true if this record's key equals `key`.
    #[inline]
    pub fn matches(&self, key: &[u8]) -> bool {
        equals(&self.key, key)
    }

    /// Releases the values, then the key.
    pub(crate) fn destroy(mut self) -> Released {
        let bytes = self.values.byte_len() + self.key.len();
        let values = self.values.destroy_all();
        drop(self.key);
        Released { values, bytes }
    }
}
