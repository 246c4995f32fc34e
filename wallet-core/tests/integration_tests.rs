//! Integration tests for wallet-core flows
//!
//! These tests drive the services end to end through a `WalletContext`.
//! Network IO is mocked at the trait level, but persistence goes through
//! the real file storage in a temp directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tempfile::TempDir;

use wallet_core::adapters::file_storage::FileStorage;
use wallet_core::config::Config;
use wallet_core::domain::serde_helpers::parse_timestamp;
use wallet_core::ports::{
    AddFundsRequest, FundsUpdate, KeyValueStorage, LoginRequest, SignupRequest, WalletApi,
    WithdrawRequest,
};
use wallet_core::{
    Action, Error, RehydrationOutcome, Result, Route, SignupForm, TransactionRecord,
    TransactionType, User, WalletContext,
};

// ============================================================================
// Test Helpers
// ============================================================================

const PHONE: &str = "9876543210";
const PASSWORD: &str = "abc123";

/// Wallet backend double that records every call
struct FakeApi {
    calls: Mutex<Vec<&'static str>>,
    balance: Mutex<Decimal>,
    history: Vec<TransactionRecord>,
    offline: bool,
}

impl FakeApi {
    fn new(balance: i64) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            balance: Mutex::new(Decimal::new(balance, 0)),
            history: Vec::new(),
            offline: false,
        }
    }

    fn with_history(mut self, history: Vec<TransactionRecord>) -> Self {
        self.history = history;
        self
    }

    fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new(0)
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, name: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(name);
        if self.offline {
            return Err(Error::Offline);
        }
        Ok(())
    }
}

#[async_trait]
impl WalletApi for FakeApi {
    async fn login(&self, request: &LoginRequest) -> Result<User> {
        self.enter("login")?;
        if request.phone_number == PHONE && request.password == PASSWORD {
            let balance = *self.balance.lock().unwrap();
            Ok(User::new("1", "Test User", PHONE).with_balance(balance))
        } else {
            Err(Error::api(Some(401), "Invalid credentials"))
        }
    }

    async fn signup(&self, request: &SignupRequest) -> Result<User> {
        self.enter("signup")?;
        Ok(User::new("2", &request.name, &request.phone_number))
    }

    async fn get_balance(&self, _user_id: &str) -> Result<Decimal> {
        self.enter("get_balance")?;
        Ok(*self.balance.lock().unwrap())
    }

    async fn add_funds(&self, request: &AddFundsRequest) -> Result<FundsUpdate> {
        self.enter("add_funds")?;
        let mut balance = self.balance.lock().unwrap();
        *balance += request.amount;
        Ok(FundsUpdate {
            current_balance: Some(*balance),
            transaction_id: Some(request.transaction_id.clone()),
        })
    }

    async fn withdraw(&self, request: &WithdrawRequest) -> Result<FundsUpdate> {
        self.enter("withdraw")?;
        let mut balance = self.balance.lock().unwrap();
        *balance -= request.amount;
        Ok(FundsUpdate {
            current_balance: Some(*balance),
            transaction_id: Some("W-1".to_string()),
        })
    }

    async fn get_transactions(&self) -> Result<Vec<TransactionRecord>> {
        self.enter("get_transactions")?;
        Ok(self.history.clone())
    }
}

fn record_on(date: &str, kind: TransactionType, amount: i64, description: &str) -> TransactionRecord {
    TransactionRecord::new(kind, Decimal::new(amount, 0), description)
        .with_date(parse_timestamp(date).unwrap())
}

fn open(temp_dir: &TempDir, api: Arc<FakeApi>) -> WalletContext {
    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(temp_dir.path()).unwrap());
    WalletContext::with_parts(Config::default(), storage, api)
}

async fn signed_in(temp_dir: &TempDir, api: Arc<FakeApi>) -> WalletContext {
    let ctx = open(temp_dir, api);
    ctx.auth_service.login(PHONE, PASSWORD).await.unwrap();
    ctx
}

// ============================================================================
// Login / Logout
// ============================================================================

#[tokio::test]
async fn test_login_success_authenticates() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open(&temp_dir, Arc::new(FakeApi::new(5000)));
    assert_eq!(ctx.route(), Route::Auth);

    let user = ctx.auth_service.login(PHONE, PASSWORD).await.unwrap();

    let state = ctx.store.snapshot();
    assert!(state.auth.is_authenticated());
    assert_eq!(state.auth.user(), Some(&user));
    assert_eq!(state.auth.user().unwrap().phone_number, PHONE);
    assert_eq!(ctx.route(), Route::Main);
}

#[tokio::test]
async fn test_login_rejected_records_failure() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open(&temp_dir, Arc::new(FakeApi::new(5000)));

    let err = ctx.auth_service.login(PHONE, "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");

    let state = ctx.store.snapshot();
    assert!(!state.auth.is_authenticated());
    assert_eq!(state.auth.last_error(), Some("Invalid credentials"));
    assert_eq!(ctx.route(), Route::Auth);
}

#[tokio::test]
async fn test_login_offline_records_failure() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open(&temp_dir, Arc::new(FakeApi::offline()));

    let err = ctx.auth_service.login(PHONE, PASSWORD).await.unwrap_err();
    assert!(matches!(err, Error::Offline));
    assert_eq!(
        ctx.store.snapshot().auth.last_error(),
        Some("No internet connection")
    );
}

#[tokio::test]
async fn test_login_validation_makes_no_call() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(5000));
    let ctx = open(&temp_dir, Arc::clone(&api));

    let err = ctx.auth_service.login("12345", PASSWORD).await.unwrap_err();
    assert_eq!(err.to_string(), "Phone number must be 10 digits.");
    let err = ctx.auth_service.login(PHONE, "").await.unwrap_err();
    assert!(err.is_validation());

    assert!(api.calls().is_empty());
    assert_eq!(ctx.store.revision(), 0);
}

#[tokio::test]
async fn test_logout_clears_session_and_keeps_pin() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = signed_in(&temp_dir, Arc::new(FakeApi::new(5000))).await;
    ctx.transaction_service.load_sample();
    ctx.pin_service.set_pin(None, "1234").unwrap();
    ctx.pin_service.verify_pin("1234").unwrap();

    assert!(ctx.auth_service.logout());

    let state = ctx.store.snapshot();
    assert_eq!(state.auth, wallet_core::RootState::default().auth);
    assert!(state.transactions.transactions().is_empty());
    assert!(!state.app.has_completed_biometrics());
    assert!(state.app.has_pin_for("1"));
    assert_eq!(ctx.route(), Route::Auth);

    // A second logout changes nothing
    let revision = ctx.store.revision();
    assert!(!ctx.auth_service.logout());
    assert_eq!(ctx.store.revision(), revision);
}

#[tokio::test]
async fn test_signup_keeps_pin_on_device() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open(&temp_dir, Arc::new(FakeApi::new(0)));

    let form = SignupForm {
        name: "Asha".to_string(),
        password: "secret".to_string(),
        pin: "2468".to_string(),
        phone_number: "9123456780".to_string(),
    };
    let user = ctx.auth_service.signup(&form).await.unwrap();
    assert_eq!(user.name, "Asha");

    // Signup does not sign in; the PIN belongs to the new account
    assert_eq!(ctx.route(), Route::Auth);
    let state = ctx.store.snapshot();
    let hash = state.app.pin_hash_for(&user.id).unwrap();
    assert!(hash.verify("2468").unwrap());
    assert!(!ctx.pin_service.has_pin());

    ctx.persist().unwrap();
    let raw = ctx.storage.get_item("root").unwrap().unwrap();
    assert!(!raw.contains("2468"));
    assert!(!raw.contains("secret"));
    assert!(raw.contains("$argon2id$"));
}

#[tokio::test]
async fn test_signup_validation() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(0));
    let ctx = open(&temp_dir, Arc::clone(&api));

    let form = SignupForm {
        name: "Asha".to_string(),
        password: "secret".to_string(),
        pin: "12".to_string(),
        phone_number: "9123456780".to_string(),
    };
    let err = ctx.auth_service.signup(&form).await.unwrap_err();
    assert_eq!(err.to_string(), "PIN must be 4 digits.");
    assert!(api.calls().is_empty());
    assert_eq!(ctx.store.revision(), 0);
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn test_fetch_sorts_newest_first() {
    let temp_dir = TempDir::new().unwrap();
    let api = FakeApi::new(5000).with_history(vec![
        record_on("2025-03-28", TransactionType::Debit, 250, "ATM"),
        record_on("2025-04-01", TransactionType::Credit, 1000, "Salary"),
    ]);
    let ctx = signed_in(&temp_dir, Arc::new(api)).await;

    let fetched = ctx.transaction_service.fetch().await.unwrap();
    let descriptions: Vec<&str> = fetched.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, vec!["Salary", "ATM"]);

    let state = ctx.store.snapshot();
    assert!(!state.transactions.loading());
    assert!(state.transactions.error().is_none());
}

#[tokio::test]
async fn test_set_transactions_keeps_sorted_order() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open(&temp_dir, Arc::new(FakeApi::new(0)));

    ctx.store.dispatch(Action::SetTransactions(vec![
        record_on("2025-04-01", TransactionType::Credit, 500, "first"),
        record_on("2025-03-28", TransactionType::Debit, 100, "second"),
    ]));

    let state = ctx.store.snapshot();
    let order: Vec<&str> = state
        .transactions
        .transactions()
        .iter()
        .map(|t| t.description.as_str())
        .collect();
    assert_eq!(order, vec!["first", "second"]);
}

#[tokio::test]
async fn test_fetch_failure_sets_error() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open(&temp_dir, Arc::new(FakeApi::offline()));

    assert!(ctx.transaction_service.fetch().await.is_err());

    let state = ctx.store.snapshot();
    assert_eq!(state.transactions.error(), Some("No internet connection"));
    assert!(!state.transactions.loading());
}

// ============================================================================
// Balance flows
// ============================================================================

#[tokio::test]
async fn test_withdraw_over_balance_rejected_before_request() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(500));
    let ctx = signed_in(&temp_dir, Arc::clone(&api)).await;
    let revision = ctx.store.revision();

    let err = ctx.balance_service.withdraw("1000", None).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "Insufficient balance. Available balance is 500.00");

    assert_eq!(api.calls(), vec!["login"]);
    assert_eq!(ctx.store.revision(), revision);
}

#[tokio::test]
async fn test_withdraw_updates_balance_and_history() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = signed_in(&temp_dir, Arc::new(FakeApi::new(5000))).await;
    ctx.transaction_service.load_sample();

    let result = ctx.balance_service.withdraw("1500", None).await.unwrap();
    assert_eq!(result.balance, Some(Decimal::new(3500, 0)));
    assert_eq!(result.transaction.uuid, "W-1");

    let state = ctx.store.snapshot();
    assert_eq!(state.auth.user().unwrap().balance, Some(Decimal::new(3500, 0)));
    let newest = &state.transactions.transactions()[0];
    assert_eq!(newest.uuid, "W-1");
    assert_eq!(newest.kind, TransactionType::Debit);
}

#[tokio::test]
async fn test_withdraw_requires_pin_once_set() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(5000));
    let ctx = signed_in(&temp_dir, Arc::clone(&api)).await;
    ctx.pin_service.set_pin(None, "1357").unwrap();

    let err = ctx.balance_service.withdraw("100", None).await.unwrap_err();
    assert_eq!(err.to_string(), "Transaction PIN is required");
    let err = ctx.balance_service.withdraw("100", Some("0000")).await.unwrap_err();
    assert_eq!(err.to_string(), "Incorrect PIN");
    assert!(!api.calls().contains(&"withdraw"));

    ctx.balance_service.withdraw("100", Some("1357")).await.unwrap();
    assert!(api.calls().contains(&"withdraw"));
}

#[tokio::test]
async fn test_pin_cannot_be_replaced_without_current_pin() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(5000));
    let ctx = signed_in(&temp_dir, Arc::clone(&api)).await;
    ctx.pin_service.set_pin(None, "4321").unwrap();

    let err = ctx.pin_service.set_pin(None, "0000").unwrap_err();
    assert_eq!(err.to_string(), "Current PIN is required");
    let err = ctx.pin_service.set_pin(Some("1111"), "0000").unwrap_err();
    assert_eq!(err.to_string(), "Incorrect PIN");

    let err = ctx.balance_service.withdraw("100", Some("0000")).await.unwrap_err();
    assert_eq!(err.to_string(), "Incorrect PIN");
    assert!(!api.calls().contains(&"withdraw"));

    // The owner can still change it
    ctx.pin_service.set_pin(Some("4321"), "0000").unwrap();
    ctx.balance_service.withdraw("100", Some("0000")).await.unwrap();
}

#[tokio::test]
async fn test_pin_of_another_account_does_not_gate_withdrawals() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(5000));
    let ctx = open(&temp_dir, Arc::clone(&api));

    let other = SignupForm {
        name: "Other".to_string(),
        password: "secret".to_string(),
        pin: "1111".to_string(),
        phone_number: "9123456780".to_string(),
    };
    let other_user = ctx.auth_service.signup(&other).await.unwrap();
    ctx.auth_service.login(PHONE, PASSWORD).await.unwrap();

    // The signed-in user has no PIN of their own
    assert!(!ctx.pin_service.has_pin());
    assert!(!ctx.pin_service.check("1111").unwrap());

    // Setting one does not need the other account's PIN
    ctx.pin_service.set_pin(None, "2222").unwrap();
    let err = ctx.balance_service.withdraw("100", Some("1111")).await.unwrap_err();
    assert_eq!(err.to_string(), "Incorrect PIN");
    ctx.balance_service.withdraw("100", Some("2222")).await.unwrap();

    // The other account's PIN is untouched
    let state = ctx.store.snapshot();
    assert!(state.app.pin_hash_for(&other_user.id).unwrap().verify("1111").unwrap());
}

#[tokio::test]
async fn test_pin_gate_survives_logout_and_restart() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(5000));
    {
        let ctx = signed_in(&temp_dir, Arc::clone(&api)).await;
        ctx.pin_service.set_pin(None, "1357").unwrap();
        ctx.auth_service.logout();

        ctx.auth_service.login(PHONE, PASSWORD).await.unwrap();
        let err = ctx.balance_service.withdraw("100", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Transaction PIN is required");

        ctx.auth_service.logout();
        ctx.persist().unwrap();
    }

    let ctx = open(&temp_dir, Arc::clone(&api));
    ctx.auth_service.login(PHONE, PASSWORD).await.unwrap();
    assert!(ctx.pin_service.has_pin());
    let err = ctx.balance_service.withdraw("100", None).await.unwrap_err();
    assert_eq!(err.to_string(), "Transaction PIN is required");
    ctx.balance_service.withdraw("100", Some("1357")).await.unwrap();
}

#[tokio::test]
async fn test_withdraw_requires_login() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open(&temp_dir, Arc::new(FakeApi::new(5000)));

    let err = ctx.balance_service.withdraw("100", None).await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));
}

#[tokio::test]
async fn test_topup_records_credit_and_refreshes() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(1000));
    let ctx = signed_in(&temp_dir, Arc::clone(&api)).await;

    let result = ctx.balance_service.topup("500").await.unwrap();
    assert!(result.transaction.uuid.starts_with("TXN"));
    assert_eq!(result.transaction.kind, TransactionType::Credit);
    assert_eq!(result.balance, Some(Decimal::new(1500, 0)));

    assert_eq!(api.calls(), vec!["login", "add_funds", "get_balance"]);
    let state = ctx.store.snapshot();
    assert_eq!(state.transactions.transactions().len(), 1);
    assert_eq!(state.auth.user().unwrap().balance, Some(Decimal::new(1500, 0)));
}

#[tokio::test]
async fn test_topup_rejects_invalid_amount() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(1000));
    let ctx = signed_in(&temp_dir, Arc::clone(&api)).await;

    for raw in ["", "0", "-5", "abc"] {
        let err = ctx.balance_service.topup(raw).await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid amount");
    }
    assert_eq!(api.calls(), vec!["login"]);
}

#[tokio::test]
async fn test_send_money_is_validated_only() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(1000));
    let ctx = signed_in(&temp_dir, Arc::clone(&api)).await;

    let draft = ctx.balance_service.prepare_send("9123456780", "250").unwrap();
    assert_eq!(draft.amount, Decimal::new(250, 0));

    assert!(ctx.balance_service.prepare_send("12345", "250").is_err());
    assert!(ctx.balance_service.prepare_send("9123456780", "5000").is_err());
    assert!(ctx.balance_service.prepare_send("9123456780", "12345678901").is_err());

    let revision = ctx.store.revision();
    let err = ctx
        .balance_service
        .send_money("9123456780", "250")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not supported"));
    assert_eq!(ctx.store.revision(), revision);
    assert_eq!(api.calls(), vec!["login"]);
}

// ============================================================================
// Persistence & Rehydration
// ============================================================================

#[tokio::test]
async fn test_rehydration_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(5000).with_history(vec![record_on(
        "2025-04-01",
        TransactionType::Credit,
        1000,
        "Salary",
    )]));

    let before = {
        let ctx = signed_in(&temp_dir, Arc::clone(&api)).await;
        ctx.transaction_service.fetch().await.unwrap();
        ctx.persist().unwrap();
        ctx.store.snapshot()
    };

    let ctx = open(&temp_dir, api);
    assert_eq!(ctx.rehydration(), &RehydrationOutcome::Restored);
    let after = ctx.store.snapshot();
    assert!(after.auth.is_authenticated());
    assert_eq!(after.auth.user(), before.auth.user());
    assert_eq!(after.transactions.transactions(), before.transactions.transactions());
    assert_eq!(ctx.route(), Route::Main);
}

#[tokio::test]
async fn test_corrupt_snapshot_boots_empty() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("persist-root.json"), "{\"auth\": [1, 2").unwrap();

    let ctx = open(&temp_dir, Arc::new(FakeApi::new(0)));
    assert!(matches!(ctx.rehydration(), RehydrationOutcome::Recovered(_)));
    assert_eq!(ctx.store.snapshot(), wallet_core::RootState::default());
    assert_eq!(ctx.route(), Route::Auth);
}

#[tokio::test]
async fn test_missing_snapshot_boots_empty() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open(&temp_dir, Arc::new(FakeApi::new(0)));
    assert_eq!(ctx.rehydration(), &RehydrationOutcome::Empty);
    assert_eq!(ctx.route(), Route::Auth);
}

#[tokio::test]
async fn test_logout_persists_signed_out_state() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(5000));
    {
        let ctx = signed_in(&temp_dir, Arc::clone(&api)).await;
        ctx.persist().unwrap();
        ctx.auth_service.logout();
        ctx.persist().unwrap();
    }

    let ctx = open(&temp_dir, api);
    assert!(!ctx.store.snapshot().auth.is_authenticated());
}

#[tokio::test]
async fn test_persister_writes_after_flush() {
    let temp_dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::new(5000));
    {
        let ctx = open(&temp_dir, Arc::clone(&api));
        let persister = ctx.start_persister();
        ctx.auth_service.login(PHONE, PASSWORD).await.unwrap();
        ctx.transaction_service.load_sample();
        persister.flush().await.unwrap();
    }

    let ctx = open(&temp_dir, api);
    let state = ctx.store.snapshot();
    assert!(state.auth.is_authenticated());
    assert!(!state.transactions.transactions().is_empty());
}
