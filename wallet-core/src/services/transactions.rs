//! Transaction service - fetching and caching history

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::transaction::sample_transactions;
use crate::domain::Transaction;
use crate::ports::WalletApi;
use crate::store::{Action, Store};

pub struct TransactionService {
    store: Arc<Store>,
    api: Arc<dyn WalletApi>,
}

impl TransactionService {
    pub fn new(store: Arc<Store>, api: Arc<dyn WalletApi>) -> Self {
        Self { store, api }
    }

    /// Fetch history from the server into the cache
    ///
    /// Loading is flagged for the duration of the request. On failure the
    /// message lands in the cache's error field and the cached list is kept.
    pub async fn fetch(&self) -> Result<Vec<Transaction>> {
        self.store.dispatch(Action::SetLoading(true));

        match self.api.get_transactions().await {
            Ok(records) => {
                self.store.dispatch(Action::SetTransactions(records));
                Ok(self.cached())
            }
            Err(e) => {
                self.store.dispatch(Action::SetError(e.to_string()));
                Err(e)
            }
        }
    }

    /// Replace the cache with built-in sample data
    pub fn load_sample(&self) -> Vec<Transaction> {
        self.store.dispatch(Action::SetTransactions(sample_transactions()));
        self.cached()
    }

    pub fn clear(&self) -> bool {
        self.store.dispatch(Action::ClearTransactions)
    }

    /// Cached transactions, newest first
    pub fn cached(&self) -> Vec<Transaction> {
        self.store.with_state(|s| s.transactions.transactions().to_vec())
    }

    /// Cached transaction by exact uuid, or by unique uuid prefix
    pub fn find(&self, reference: &str) -> Option<Transaction> {
        self.store.with_state(|s| {
            let transactions = s.transactions.transactions();
            if let Some(tx) = transactions.iter().find(|t| t.uuid == reference) {
                return Some(tx.clone());
            }
            let mut matches = transactions.iter().filter(|t| t.uuid.starts_with(reference));
            match (matches.next(), matches.next()) {
                (Some(tx), None) => Some(tx.clone()),
                _ => None,
            }
        })
    }
}
