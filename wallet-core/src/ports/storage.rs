//! Key-value storage port
//!
//! Device-local durable storage for persisted client state. Keys are short
//! fixed names (e.g. `root`); values are opaque strings.

use crate::domain::result::Result;

/// Durable key-value storage abstraction
pub trait KeyValueStorage: Send + Sync {
    /// Read a value, `None` when the key was never written
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing a missing key is not an error
    fn remove_item(&self, key: &str) -> Result<()>;
}
