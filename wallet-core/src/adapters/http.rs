//! Wallet backend HTTP client
//!
//! Talks to the wallet REST backend. Most endpoints answer with the
//! `{success, data, message}` envelope; login and signup answer with a bare
//! `{user}` object on HTTP 200.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use url::Url;

use crate::domain::result::{Envelope, Error, Result};
use crate::domain::{TransactionRecord, User};
use crate::ports::{
    AddFundsRequest, FundsUpdate, LoginRequest, NetworkStatus, SignupRequest, WalletApi,
    WithdrawRequest,
};

/// Backend used when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: User,
}

#[derive(Debug, Deserialize)]
struct BalanceData {
    balance: Decimal,
}

/// `GET /transactions` has been seen as a bare list, an envelope and a
/// `{transactions}` wrapper
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TransactionsPayload {
    List(Vec<TransactionRecord>),
    Envelope(Envelope<Vec<TransactionRecord>>),
    Wrapped { transactions: Vec<TransactionRecord> },
}

/// reqwest-backed [`WalletApi`]
pub struct HttpWalletApi {
    client: Client,
    base_url: Url,
    timeout: Duration,
    network: Arc<dyn NetworkStatus>,
}

impl std::fmt::Debug for HttpWalletApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpWalletApi")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpWalletApi {
    pub fn new(base_url: &str, timeout: Duration, network: Arc<dyn NetworkStatus>) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
            network,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("Invalid endpoint '{}': {}", path, e)))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        if !self.network.is_connected() {
            return Err(Error::Offline);
        }
        request.send().await.map_err(|e| self.map_request_error(e))
    }

    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Network(format!(
                "Connection timed out after {} seconds",
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            Error::Network("Unable to connect to the wallet server".to_string())
        } else {
            Error::Network(format!("Request failed: {}", error))
        }
    }

    /// Read a body, turning non-2xx statuses into [`Error::Api`]
    ///
    /// The server's `message` (or `error`) field is preferred over `fallback`.
    async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = server_message(&body).unwrap_or_else(|| match status.as_u16() {
                401 => "Invalid phone number or password".to_string(),
                404 => format!("{} (not found)", fallback),
                _ => format!("{} (HTTP {})", fallback, status.as_u16()),
            });
            return Err(Error::api(Some(status.as_u16()), message));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::api(Some(status.as_u16()), format!("Unexpected response: {}", e)))
    }

    async fn read_envelope<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
        let envelope: Envelope<T> = Self::read_json(response, fallback).await?;
        envelope.into_result(fallback)
    }
}

fn server_message(body: &str) -> Option<String> {
    let value: JsonValue = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(JsonValue::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl WalletApi for HttpWalletApi {
    async fn login(&self, request: &LoginRequest) -> Result<User> {
        let url = self.endpoint("auth/login")?;
        let response = self.send(self.client.post(url).json(request)).await?;
        let body: UserResponse = Self::read_json(response, "Login failed").await?;
        Ok(body.user)
    }

    async fn signup(&self, request: &SignupRequest) -> Result<User> {
        let url = self.endpoint("auth/signup")?;
        let response = self.send(self.client.post(url).json(request)).await?;
        let body: UserResponse = Self::read_json(response, "Signup failed").await?;
        Ok(body.user)
    }

    async fn get_balance(&self, user_id: &str) -> Result<Decimal> {
        let mut url = self.endpoint("balances/get_balance/")?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(user_id);
        let response = self.send(self.client.get(url)).await?;
        let data: BalanceData = Self::read_envelope(response, "Failed to fetch balance").await?;
        Ok(data.balance)
    }

    async fn add_funds(&self, request: &AddFundsRequest) -> Result<FundsUpdate> {
        let url = self.endpoint("balances/add_funds")?;
        let response = self.send(self.client.post(url).json(request)).await?;
        Self::read_envelope(response, "Failed to add funds").await
    }

    async fn withdraw(&self, request: &WithdrawRequest) -> Result<FundsUpdate> {
        let url = self.endpoint("balances/withdraw")?;
        let response = self.send(self.client.post(url).json(request)).await?;
        Self::read_envelope(response, "Failed to process withdrawal").await
    }

    async fn get_transactions(&self) -> Result<Vec<TransactionRecord>> {
        let url = self.endpoint("transactions")?;
        let response = self.send(self.client.get(url)).await?;
        let payload: TransactionsPayload =
            Self::read_json(response, "Failed to fetch transactions").await?;
        match payload {
            TransactionsPayload::List(records) => Ok(records),
            TransactionsPayload::Envelope(envelope) => {
                envelope.into_result("Failed to fetch transactions")
            }
            TransactionsPayload::Wrapped { transactions } => Ok(transactions),
        }
    }
}
