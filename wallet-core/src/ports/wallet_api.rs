//! Wallet backend port
//!
//! Defines the calls the client makes to the wallet REST backend. Services
//! use this trait so flows can be exercised without a server.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::result::Result;
use crate::domain::{TransactionRecord, User};

/// Body of `POST /auth/login`
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

/// Body of `POST /auth/signup`
///
/// The PIN is not part of the request; it stays on the device as a hash.
#[derive(Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub phone_number: String,
    pub password: String,
}

/// Body of `POST /balances/add_funds`
#[derive(Debug, Clone, Serialize)]
pub struct AddFundsRequest {
    pub user_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub transaction_id: String,
}

/// Body of `POST /balances/withdraw`
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawRequest {
    pub user_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// `data` of a successful add-funds or withdraw response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundsUpdate {
    #[serde(default)]
    pub current_balance: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "crate::domain::serde_helpers::option_string_or_number"
    )]
    pub transaction_id: Option<String>,
}

/// Wallet backend abstraction
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Authenticate with phone number and password
    async fn login(&self, request: &LoginRequest) -> Result<User>;

    /// Register a new account and return the created user
    async fn signup(&self, request: &SignupRequest) -> Result<User>;

    /// Current balance for a user
    async fn get_balance(&self, user_id: &str) -> Result<Decimal>;

    /// Credit the wallet
    async fn add_funds(&self, request: &AddFundsRequest) -> Result<FundsUpdate>;

    /// Debit the wallet
    async fn withdraw(&self, request: &WithdrawRequest) -> Result<FundsUpdate>;

    /// Transaction history for the signed-in user
    async fn get_transactions(&self) -> Result<Vec<TransactionRecord>>;
}
