//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The store and
//! services depend only on these traits, not on concrete implementations.

mod storage;
mod wallet_api;

pub use storage::KeyValueStorage;
pub use wallet_api::{
    AddFundsRequest, FundsUpdate, LoginRequest, SignupRequest, WalletApi, WithdrawRequest,
};

/// Connectivity signal consulted before each network request
pub trait NetworkStatus: Send + Sync {
    fn is_connected(&self) -> bool;
}
