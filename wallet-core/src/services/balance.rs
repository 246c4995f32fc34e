//! Balance service - balance refresh, top-up, withdrawal and send money
//!
//! Every flow validates locally first; nothing reaches the store or the
//! server until the input is acceptable.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::transaction::generate_transaction_id;
use crate::domain::validation::{
    ensure_sufficient_balance, parse_amount, parse_keypad_amount, validate_phone_number,
    TOPUP_PRESETS,
};
use crate::domain::{Transaction, TransactionRecord, TransactionType, User};
use crate::ports::{AddFundsRequest, WalletApi, WithdrawRequest};
use crate::store::{Action, Store};

/// Outcome of a successful top-up or withdrawal
#[derive(Debug, Clone, Serialize)]
pub struct FundsResult {
    pub transaction: Transaction,
    /// Balance after the operation, when the server reported one
    pub balance: Option<Decimal>,
}

/// A send-money request that passed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMoneyDraft {
    pub recipient_phone: String,
    pub amount: Decimal,
}

pub struct BalanceService {
    store: Arc<Store>,
    api: Arc<dyn WalletApi>,
}

impl BalanceService {
    pub fn new(store: Arc<Store>, api: Arc<dyn WalletApi>) -> Self {
        Self { store, api }
    }

    /// Preset amounts offered on the top-up screen
    pub fn presets() -> Vec<Decimal> {
        TOPUP_PRESETS.iter().map(|&p| Decimal::from(p)).collect()
    }

    fn require_user(&self) -> Result<User> {
        self.store.current_user().ok_or(Error::NotAuthenticated)
    }

    /// Fetch the balance from the server into the session
    pub async fn refresh_balance(&self) -> Result<Decimal> {
        let user = self.require_user()?;
        let balance = self.api.get_balance(&user.id).await?;
        self.store.dispatch(Action::BalanceUpdated(balance));
        Ok(balance)
    }

    /// Add funds under a fresh `TXN...` reference
    ///
    /// The credit is recorded locally, then the balance is re-read. If that
    /// re-read fails the balance reported by the top-up response is used.
    pub async fn topup(&self, raw_amount: &str) -> Result<FundsResult> {
        let amount = parse_amount(raw_amount)?;
        let user = self.require_user()?;

        let transaction_id = generate_transaction_id();
        let update = self
            .api
            .add_funds(&AddFundsRequest {
                user_id: user.id.clone(),
                amount,
                transaction_id: transaction_id.clone(),
            })
            .await?;

        let record = TransactionRecord::new(TransactionType::Credit, amount, "Wallet top-up")
            .with_uuid(transaction_id);
        let transaction = self.record(record);

        let balance = match self.refresh_balance().await {
            Ok(balance) => Some(balance),
            Err(_) => {
                if let Some(balance) = update.current_balance {
                    self.store.dispatch(Action::BalanceUpdated(balance));
                }
                update.current_balance
            }
        };

        Ok(FundsResult {
            transaction,
            balance,
        })
    }

    /// Withdraw funds
    ///
    /// Amounts above the last known balance are rejected before any request.
    /// Once the signed-in user has set a transaction PIN, `pin` must match it.
    pub async fn withdraw(&self, raw_amount: &str, pin: Option<&str>) -> Result<FundsResult> {
        let amount = parse_amount(raw_amount)
            .map_err(|_| Error::validation("Amount must be positive"))?;
        let user = self.require_user()?;
        ensure_sufficient_balance(amount, user.balance)?;
        self.check_pin(&user.id, pin)?;

        let update = self
            .api
            .withdraw(&WithdrawRequest {
                user_id: user.id.clone(),
                amount,
            })
            .await?;

        if let Some(balance) = update.current_balance {
            self.store.dispatch(Action::BalanceUpdated(balance));
        }

        let mut record = TransactionRecord::new(TransactionType::Debit, amount, "Withdrawal");
        if let Some(id) = update.transaction_id {
            record = record.with_uuid(id);
        }
        let transaction = self.record(record);

        Ok(FundsResult {
            transaction,
            balance: update.current_balance,
        })
    }

    /// Validate a send-money entry without sending anything
    pub fn prepare_send(&self, recipient_phone: &str, raw_amount: &str) -> Result<SendMoneyDraft> {
        let amount = parse_keypad_amount(raw_amount)?;
        validate_phone_number(recipient_phone)?;
        let user = self.require_user()?;
        ensure_sufficient_balance(amount, user.balance)?;

        Ok(SendMoneyDraft {
            recipient_phone: recipient_phone.to_string(),
            amount,
        })
    }

    /// Send money to another wallet
    ///
    /// The backend has no transfer endpoint, so a valid request is reported
    /// as unsupported and the state is left untouched.
    pub async fn send_money(&self, recipient_phone: &str, raw_amount: &str) -> Result<SendMoneyDraft> {
        self.prepare_send(recipient_phone, raw_amount)?;
        Err(Error::api(None, "Sending money is not supported by the server"))
    }

    /// A PIN set for `user_id` gates the operation; other users' PINs don't
    fn check_pin(&self, user_id: &str, pin: Option<&str>) -> Result<()> {
        let Some(hash) = self.store.with_state(|s| s.app.pin_hash_for(user_id).cloned()) else {
            return Ok(());
        };
        let pin = pin.ok_or_else(|| Error::validation("Transaction PIN is required"))?;
        if hash.verify(pin)? {
            Ok(())
        } else {
            Err(Error::validation("Incorrect PIN"))
        }
    }

    /// Add to the cache and return the stored form
    fn record(&self, record: TransactionRecord) -> Transaction {
        let transaction = record.into_transaction();
        self.store
            .dispatch(Action::AddTransaction(TransactionRecord::from(transaction.clone())));
        transaction
    }
}
