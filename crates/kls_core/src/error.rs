//! Error types for KLS core.

use std::collections::TryReserveError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Which buffer an oversize error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// The key buffer.
    Key,
    /// The value buffer.
    Value,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Key => f.write_str("key"),
            EntryKind::Value => f.write_str("value"),
        }
    }
}

/// Errors surfaced by the store's public operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A required buffer was missing or unusable.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the bad argument.
        message: String,
    },

    /// A key or value is at or above the configured maximum entry size.
    #[error("{what} too large: {len} bytes, must be below {max}")]
    SizeExceeded {
        /// Whether the key or the value was oversize.
        what: EntryKind,
        /// Length that was supplied.
        len: usize,
        /// Configured `max_entry_size` (exclusive bound).
        max: usize,
    },

    /// An allocation failed while creating a key or value.
    #[error("out of memory")]
    OutOfMemory,

    /// No entry matches the key.
    #[error("key not found")]
    KeyNotFound,

    /// The index is past the end of the key's value sequence.
    #[error("index {index} out of range: key holds {len} values")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of values stored under the key.
        len: usize,
    },

    /// Creating another key would exceed the configured key limit.
    #[error("key limit reached: at most {limit} keys")]
    KeyLimitReached {
        /// Configured maximum number of live keys.
        limit: usize,
    },

    /// Configuration values are unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl StoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates an oversize key error.
    pub fn key_too_large(len: usize, max: usize) -> Self {
        Self::SizeExceeded {
            what: EntryKind::Key,
            len,
            max,
        }
    }
}

/// Failure while appending a value or creating a key record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InsertError {
    /// The value is at or above `max_entry_size`.
    #[error("value too large: {len} bytes, limit {max}")]
    ValueTooLarge {
        /// Supplied value length.
        len: usize,
        /// Exclusive size bound.
        max: usize,
    },

    /// Allocation failed.
    #[error("out of memory")]
    OutOfMemory,
}

impl From<TryReserveError> for InsertError {
    fn from(_: TryReserveError) -> Self {
        InsertError::OutOfMemory
    }
}

/// Failure while reading a value by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    /// `index` is not below the number of stored values.
    #[error("index {index} out of range ({len} values)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of values present.
        len: usize,
    },
}

impl From<InsertError> for StoreError {
    fn from(err: InsertError) -> Self {
        match err {
            InsertError::ValueTooLarge { len, max } => StoreError::SizeExceeded {
                what: EntryKind::Value,
                len,
                max,
            },
            InsertError::OutOfMemory => StoreError::OutOfMemory,
        }
    }
}

impl From<LookupError> for StoreError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::IndexOutOfRange { index, len } => {
                StoreError::IndexOutOfRange { index, len }
            }
        }
    }
}

impl From<TryReserveError> for StoreError {
    fn from(_: TryReserveError) -> Self {
        StoreError::OutOfMemory
    }
}
