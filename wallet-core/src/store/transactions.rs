//! Transaction cache slice
//!
//! The list is kept newest-first at all times: bulk replacement sorts, and
//! single additions are inserted at their sorted position.

use serde::{Deserialize, Serialize};

use crate::domain::transaction::{insertion_index, sort_newest_first};
use crate::domain::{Transaction, TransactionRecord};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionState {
    transactions: Vec<Transaction>,
    loading: bool,
    error: Option<String>,
}

impl TransactionState {
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the list, sorted newest-first; clears loading and error
    pub(crate) fn set_transactions(&mut self, records: Vec<TransactionRecord>) -> bool {
        let mut transactions: Vec<Transaction> = records
            .into_iter()
            .map(TransactionRecord::into_transaction)
            .collect();
        sort_newest_first(&mut transactions);

        let changed = self.transactions != transactions || self.loading || self.error.is_some();
        self.transactions = transactions;
        self.loading = false;
        self.error = None;
        changed
    }

    pub(crate) fn set_loading(&mut self, loading: bool) -> bool {
        if self.loading == loading {
            return false;
        }
        self.loading = loading;
        true
    }

    /// Record a failure verbatim and stop the busy indicator
    pub(crate) fn set_error(&mut self, message: String) -> bool {
        let changed = self.loading || self.error.as_deref() != Some(message.as_str());
        self.error = Some(message);
        self.loading = false;
        changed
    }

    /// Add one record, filling uuid/date, at its sorted position
    pub(crate) fn add_transaction(&mut self, record: TransactionRecord) -> bool {
        let tx = record.into_transaction();
        let index = insertion_index(&self.transactions, &tx.date);
        self.transactions.insert(index, tx);
        true
    }

    pub(crate) fn clear(&mut self) -> bool {
        let changed = !self.transactions.is_empty() || self.loading || self.error.is_some();
        *self = Self::default();
        changed
    }

    pub(crate) fn to_persisted(&self) -> PersistedTransactions {
        PersistedTransactions {
            transactions: self.transactions.clone(),
        }
    }

    /// Restore from storage, re-establishing the sort order
    pub(crate) fn from_persisted(persisted: PersistedTransactions) -> Self {
        let mut transactions = persisted.transactions;
        sort_newest_first(&mut transactions);
        Self {
            transactions,
            loading: false,
            error: None,
        }
    }
}

/// Stored shape of the transaction slice; busy/error flags are transient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct PersistedTransactions {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}
