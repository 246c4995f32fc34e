//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external dependencies.

mod credential;
mod receipt;
pub mod result;
pub mod serde_helpers;
pub mod transaction;
mod user;
pub mod validation;

pub use credential::PinHash;
pub use receipt::Receipt;
pub use transaction::{Transaction, TransactionRecord, TransactionType};
pub use user::User;
pub use validation::SignupForm;
