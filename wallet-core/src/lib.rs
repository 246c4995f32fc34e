//! Pocket Wallet Core - client-side state and flows for a mobile wallet
//!
//! This crate implements the wallet client following hexagonal architecture:
//!
//! - **domain**: Core entities (User, Transaction, PinHash) and validation
//! - **ports**: Trait definitions for external dependencies (WalletApi, KeyValueStorage)
//! - **adapters**: Concrete implementations (reqwest client, file storage)
//! - **store**: Session/transaction/app state with persistence and rehydration
//! - **services**: The screen flows built on top of the store

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
pub mod store;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::file_storage::FileStorage;
use adapters::http::HttpWalletApi;
use adapters::network::ManualNetworkStatus;
use config::Config;
use ports::{KeyValueStorage, WalletApi};
use services::*;
use store::persist::{persist_now, rehydrate};

// Re-export commonly used types at crate root
pub use domain::result::{Envelope, Error, Result};
pub use domain::{PinHash, Receipt, SignupForm, Transaction, TransactionRecord, TransactionType, User};
pub use store::{Action, PersistConfig, Persister, RehydrationOutcome, RootState, Route, Store};

/// Main context for wallet operations
///
/// Owns the one [`Store`] of the process. The store is built from
/// rehydrated state, so nothing can read or dispatch before persisted
/// state has been restored.
pub struct WalletContext {
    pub config: Config,
    pub store: Arc<Store>,
    pub storage: Arc<dyn KeyValueStorage>,
    pub api: Arc<dyn WalletApi>,
    pub auth_service: AuthService,
    pub balance_service: BalanceService,
    pub transaction_service: TransactionService,
    pub pin_service: PinService,
    wallet_dir: Option<PathBuf>,
    rehydration: RehydrationOutcome,
}

impl WalletContext {
    /// Open the wallet in `wallet_dir` with file storage and the HTTP backend
    pub fn new(wallet_dir: &Path) -> Result<Self> {
        let config = Config::load(wallet_dir)?;
        let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(wallet_dir)?);
        let network = Arc::new(ManualNetworkStatus::new(!config.offline));
        let api: Arc<dyn WalletApi> = Arc::new(HttpWalletApi::new(
            &config.api_base_url,
            config.request_timeout,
            network,
        )?);

        let mut context = Self::with_parts(config, storage, api);
        context.wallet_dir = Some(wallet_dir.to_path_buf());
        Ok(context)
    }

    /// Assemble a context from explicit parts (embedding hosts and tests)
    pub fn with_parts(
        config: Config,
        storage: Arc<dyn KeyValueStorage>,
        api: Arc<dyn WalletApi>,
    ) -> Self {
        let rehydrated = rehydrate(storage.as_ref(), &config.persist);
        let store = Arc::new(Store::new(rehydrated.state));

        Self {
            auth_service: AuthService::new(Arc::clone(&store), Arc::clone(&api)),
            balance_service: BalanceService::new(Arc::clone(&store), Arc::clone(&api)),
            transaction_service: TransactionService::new(Arc::clone(&store), Arc::clone(&api)),
            pin_service: PinService::new(Arc::clone(&store)),
            config,
            store,
            storage,
            api,
            wallet_dir: None,
            rehydration: rehydrated.outcome,
        }
    }

    /// How the persisted state was restored at startup
    pub fn rehydration(&self) -> &RehydrationOutcome {
        &self.rehydration
    }

    pub fn wallet_dir(&self) -> Option<&Path> {
        self.wallet_dir.as_deref()
    }

    pub fn route(&self) -> Route {
        self.store.route()
    }

    /// Write the current state now (short-lived processes)
    pub fn persist(&self) -> Result<()> {
        persist_now(&self.store, self.storage.as_ref(), &self.config.persist)
    }

    /// Start the debounced background writer (long-running hosts)
    pub fn start_persister(&self) -> Persister {
        Persister::spawn(&self.store, Arc::clone(&self.storage), self.config.persist.clone())
    }
}
