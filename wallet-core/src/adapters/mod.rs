//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the WalletApi port
//! - JSON files in the wallet directory for KeyValueStorage
//! - In-memory storage for ephemeral sessions and tests
//! - Connectivity probes for NetworkStatus

pub mod file_storage;
pub mod http;
pub mod memory;
pub mod network;

#[cfg(test)]
pub mod mock_api;
