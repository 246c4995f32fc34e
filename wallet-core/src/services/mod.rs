//! Service layer - the screen flows
//!
//! Services validate input, call the wallet backend through the
//! [`WalletApi`](crate::ports::WalletApi) port and dispatch store
//! transitions. Each service focuses on one feature area.

mod auth;
mod balance;
pub mod logging;
mod pin;
mod transactions;

pub use auth::AuthService;
pub use balance::{BalanceService, FundsResult, SendMoneyDraft};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use pin::PinService;
pub use transactions::TransactionService;
