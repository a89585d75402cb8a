//! # KLS FFI
//!
//! C ABI entry points for the KLS multi-valued key/list store.
//!
//! This crate provides:
//! - Process-wide store lifecycle (`kls_init`, `kls_shutdown`)
//! - `kls_insert`, `kls_search` and `kls_delete` over pointer/length buffers
//! - Integer result codes and a thread-local last-error message
//!
//! Buffers are never assumed to be terminated and may contain zero bytes.
//! Callers own every buffer they pass in; the library never hands out
//! memory that needs freeing.

#![warn(missing_docs)]

pub mod error;
pub mod store;
pub mod types;

pub use error::{ErrorCode, KlsResult};
pub use store::{
    kls_delete, kls_init, kls_insert, kls_search, kls_shutdown, kls_stats, kls_version,
};
pub use types::{KlsConfig, KlsHash, KlsStats};
