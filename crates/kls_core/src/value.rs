//! Ordered value sequence owned by one key.

use crate::buffer::ByteString;
use crate::error::{InsertError, LookupError};

/// The values stored under a single key, in insertion order.
///
/// Values are only ever appended. Position is the sole handle callers
/// have on a value; there is no way to replace or remove one in place.
#[derive(Debug, Default)]
pub struct ValueList {
    values: Vec<ByteString>,
}

impl ValueList {
    /// Creates an empty list.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates a list holding `first` as its only value.
    pub(crate) fn with_first(first: &[u8], max_entry_size: usize) -> Result<Self, InsertError> {
        let mut list = Self::new();
        list.append(first, max_entry_size)?;
        Ok(list)
    }

    /// Appends a copy of `value` as the new tail.
    ///
    /// The size bound is checked before anything is allocated. On error
    /// the list is unchanged.
    pub fn append(&mut self, value: &[u8], max_entry_size: usize) -> Result<(), InsertError> {
        if value.len() >= max_entry_size {
            return Err(InsertError::ValueTooLarge {
                len: value.len(),
                max: max_entry_size,
            });
        }

        let value = ByteString::copy_from(value)?;
        self.values.try_reserve(1)?;
        self.values.push(value);
        Ok(())
    }

    /// Returns the value at 0-based `index`.
    pub fn get(&self, index: usize) -> Result<ByteString, LookupError> {
        self.values
            .get(index)
            .cloned()
            .ok_or(LookupError::IndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Total payload bytes across all values.
    pub(crate) fn byte_len(&self) -> usize {
        self.values.iter().map(ByteString::len).sum()
    }

    /// Releases every value, returning how many were dropped.
    pub(crate) fn destroy_all(&mut self) -> usize {
        let released = self.values.len();
        self.values = Vec::new();
        released
    }
}
