//! # KLS Core
//!
//! In-memory multi-valued key/list store.
//!
//! Each key maps to an ordered sequence of byte-string values. Values are
//! appended and never modified in place; a key is deleted together with
//! all of its values.
//!
//! This crate provides:
//! - Length-delimited byte strings (no terminator semantics)
//! - A fixed-size hash table of chained buckets, each under its own lock
//! - Insert / search / delete with all-or-nothing failure behavior
//! - Configuration, statistics and `tracing` instrumentation
//!
//! ## Example
//!
//! ```rust
//! use kls_core::{Config, Store};
//!
//! let store = Store::new(Config::default())?;
//! store.insert(b"user", b"alice")?;
//! store.insert(b"user", b"bob")?;
//! assert_eq!(store.search(b"user", 1)?, b"bob");
//! # Ok::<(), kls_core::StoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bucket;
mod buffer;
mod config;
mod entry;
mod error;
mod hash;
mod stats;
mod store;
mod table;
mod value;

pub use buffer::{copy_into, equals, ByteString};
pub use bucket::Bucket;
pub use config::{Config, DEFAULT_BUCKET_COUNT, DEFAULT_MAX_ENTRY_SIZE};
pub use entry::{KeyEntry, Released};
pub use error::{EntryKind, InsertError, LookupError, StoreError, StoreResult};
pub use hash::{byte_sum, HashAlgorithm};
pub use stats::{StatsSnapshot, StoreStats};
pub use store::Store;
pub use table::Table;
pub use value::ValueList;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
