//! Transaction domain model

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::serde_helpers;

/// Direction of a transaction relative to the wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[serde(alias = "deposit", alias = "topup", alias = "CREDIT")]
    Credit,
    #[serde(alias = "withdrawal", alias = "withdraw", alias = "DEBIT")]
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
        }
    }

    /// `+` for money in, `-` for money out
    pub fn sign(&self) -> &'static str {
        match self {
            TransactionType::Credit => "+",
            TransactionType::Debit => "-",
        }
    }
}

/// A transaction as held by the client-side cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub uuid: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "serde_helpers::timestamp")]
    pub date: DateTime<Utc>,
}

impl Transaction {
    /// Create a transaction dated now with a fresh uuid
    pub fn new(kind: TransactionType, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            kind,
            amount,
            description: description.into(),
            date: Utc::now(),
        }
    }

    /// Amount with its sign for display, e.g. `+1000.00`
    pub fn signed_amount(&self) -> String {
        format!("{}{:.2}", self.kind.sign(), self.amount)
    }
}

/// A transaction as it arrives from the backend or a screen
///
/// `uuid` and `date` may be missing; they are filled in when the record
/// enters the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(
        default,
        alias = "id",
        alias = "transaction_id",
        deserialize_with = "serde_helpers::option_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub uuid: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "serde_helpers::option_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    pub fn new(kind: TransactionType, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            uuid: None,
            kind,
            amount,
            description: description.into(),
            date: None,
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Fill a missing uuid and date (now) and produce a cache entry
    pub fn into_transaction(self) -> Transaction {
        Transaction {
            uuid: self.uuid.unwrap_or_else(|| Uuid::new_v4().to_string()),
            kind: self.kind,
            amount: self.amount,
            description: self.description,
            date: self.date.unwrap_or_else(Utc::now),
        }
    }
}

impl From<Transaction> for TransactionRecord {
    fn from(tx: Transaction) -> Self {
        Self {
            uuid: Some(tx.uuid),
            kind: tx.kind,
            amount: tx.amount,
            description: tx.description,
            date: Some(tx.date),
        }
    }
}

/// Sort newest first; stable, so equal dates keep their relative order
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Index at which `date` keeps a newest-first list sorted
///
/// The new entry goes ahead of anything with an equal or older date.
pub fn insertion_index(transactions: &[Transaction], date: &DateTime<Utc>) -> usize {
    transactions.partition_point(|existing| existing.date > *date)
}

/// Client-side reference for top-ups: `TXN<unix millis><4 digits>`
pub fn generate_transaction_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("TXN{}{:04}", millis, suffix)
}

/// Sample history used when no backend is reachable ("Load Test Data")
pub fn sample_transactions() -> Vec<TransactionRecord> {
    let now = Utc::now();
    vec![
        TransactionRecord::new(TransactionType::Credit, Decimal::new(1000, 0), "Salary Deposit")
            .with_uuid("1")
            .with_date(now),
        TransactionRecord::new(TransactionType::Debit, Decimal::new(50, 0), "Grocery Shopping")
            .with_uuid("2")
            .with_date(now - Duration::days(1)),
        TransactionRecord::new(TransactionType::Credit, Decimal::new(200, 0), "Freelance Payment")
            .with_uuid("3")
            .with_date(now - Duration::days(2)),
        TransactionRecord::new(
            TransactionType::Debit,
            Decimal::new(30, 0),
            "Netflix Subscription",
        )
        .with_uuid("4")
        .with_date(now - Duration::days(3)),
    ]
}
