//! CLI command implementations

pub mod auth;
pub mod balance;
pub mod config;
pub mod logs;
pub mod pin;
pub mod receipt;
pub mod status;
pub mod transactions;

use std::path::PathBuf;

use anyhow::{Context, Result};
use wallet_core::services::{EntryPoint, LogEvent, LoggingService};
use wallet_core::{RehydrationOutcome, WalletContext};

use crate::output;

/// Environment variable selecting the wallet directory
pub const WALLET_DIR_ENV: &str = "POCKET_WALLET_DIR";

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let wallet_dir = get_wallet_dir().ok()?;
    LoggingService::new(&wallet_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the wallet directory from environment or default
pub fn get_wallet_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(WALLET_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".pocket-wallet"))
}

/// Open the wallet context, restoring persisted state
///
/// A snapshot that could not be restored is reported and logged, and the
/// command continues from the signed-out state.
pub fn get_context() -> Result<WalletContext> {
    let wallet_dir = get_wallet_dir()?;

    std::fs::create_dir_all(&wallet_dir)
        .with_context(|| format!("Failed to create wallet directory: {:?}", wallet_dir))?;

    let ctx = WalletContext::new(&wallet_dir).context("Failed to initialize wallet")?;

    if let RehydrationOutcome::Recovered(problems) = ctx.rehydration() {
        output::warning("Saved session could not be restored; starting signed out.");
        if let Some(logger) = get_logger() {
            let _ = logger.log_error(
                "rehydration_recovered",
                "Persisted state was unreadable",
                Some(&problems.join("; ")),
            );
        }
    }

    Ok(ctx)
}

/// Persist state after a command, whatever its outcome
///
/// When both the command and the save fail, the save error is reported
/// with the command's error attached.
pub fn finish<T>(ctx: &WalletContext, result: wallet_core::Result<T>) -> Result<T> {
    let saved = ctx.persist();
    match (result, saved) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(e), Ok(())) => Err(e.into()),
        (Ok(_), Err(save)) => Err(anyhow::Error::new(save).context("Failed to save wallet state")),
        (Err(e), Err(save)) => Err(anyhow::Error::new(save)
            .context(format!("Failed to save wallet state after: {}", e))),
    }
}

/// Fail with a hint when nobody is signed in
pub fn require_login(ctx: &WalletContext) -> Result<()> {
    if ctx.store.current_user().is_none() {
        anyhow::bail!("Not logged in. Run `pw login` first.");
    }
    Ok(())
}
