//! Receipt domain model

use serde::Serialize;

use super::transaction::{Transaction, TransactionType};

/// Printable summary of a completed transaction
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub reference: String,
    pub title: String,
    pub amount: String,
    pub description: String,
    pub date: String,
}

impl Receipt {
    pub fn from_transaction(tx: &Transaction) -> Self {
        let title = match tx.kind {
            TransactionType::Credit => "Money Received",
            TransactionType::Debit => "Payment Successful",
        };
        Self {
            reference: tx.uuid.clone(),
            title: title.to_string(),
            amount: tx.signed_amount(),
            description: tx.description.clone(),
            date: tx.date.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }

    /// Plain-text rendering, one field per line
    pub fn render(&self) -> String {
        format!(
            "{}\nAmount: {}\nDescription: {}\nDate: {}\nReference: {}",
            self.title, self.amount, self.description, self.date, self.reference
        )
    }
}
