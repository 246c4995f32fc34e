//! User domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// The signed-in user's profile as returned by the backend
///
/// Fields the client doesn't know about are kept in `extra` so that a
/// persisted profile round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "crate::domain::serde_helpers::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "phoneNumber")]
    pub phone_number: String,
    /// Last known balance snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone_number: phone_number.into(),
            balance: None,
            extra: Map::new(),
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Balance for display, `0.00` when never fetched
    pub fn display_balance(&self) -> String {
        format!("{:.2}", self.balance.unwrap_or(Decimal::ZERO))
    }
}
