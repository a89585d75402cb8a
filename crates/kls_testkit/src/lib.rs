//! # KLS Testkit
//!
//! Test utilities for the KLS key/list store.
//!
//! This crate provides:
//! - Store fixtures and colliding key families
//! - Property-based test generators and a reference model
//! - Threaded stress tests with linearizability checks
//!
//! ## Usage
//!
//! ```rust
//! use kls_testkit::prelude::*;
//!
//! with_store(|store| {
//!     let keys = colliding_keys(8);
//!     preload(store, &keys, 2);
//!     assert_preloaded(store, &keys, 2);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
