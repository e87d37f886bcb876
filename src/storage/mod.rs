//! Durable key-value storage for Macrum.
//!
//! Every entity collection is serialized as one JSON document under a fixed
//! key. This module provides the backends:
//!
//! - [`SqliteKv`] - on-disk SQLite table, the production backend
//! - [`MemoryKv`] - in-process map, for tests and dry runs
//!
//! # Submodules
//!
//! - [`kv`] - Backend implementations
//! - [`schema`] - Database schema definitions

pub mod kv;
pub mod schema;

pub use kv::{MemoryKv, SqliteKv};

use crate::error::Result;

/// A durable string-to-string slot store.
///
/// Writes replace the whole value for a key; there is no merge.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn remove(&mut self, key: &str) -> Result<()>;
}
