//! Transaction history commands

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use wallet_core::services::LogEvent;

use super::{finish, get_context, get_logger, log_event, require_login};
use crate::output;

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// Show cached transactions, newest first
    List {
        /// Show at most this many rows
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Download the history from the server into the cache
    Fetch,
    /// Replace the cache with sample data (for trying things offline)
    Sample,
    /// Drop the cached history
    Clear,
}

pub async fn run(command: Option<TransactionsCommands>, json: bool) -> Result<()> {
    match command.unwrap_or(TransactionsCommands::List { limit: None }) {
        TransactionsCommands::List { limit } => list(limit, json),
        TransactionsCommands::Fetch => fetch(json).await,
        TransactionsCommands::Sample => sample(json),
        TransactionsCommands::Clear => clear(json),
    }
}

fn list(limit: Option<usize>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let mut transactions = ctx.transaction_service.cached();
    if let Some(n) = limit {
        transactions.truncate(n);
    }

    if json {
        return output::json(&transactions);
    }

    let last_error = ctx.store.with_state(|s| s.transactions.error().map(str::to_string));
    if let Some(e) = last_error {
        output::warning(&format!("Last refresh failed: {}", e));
    }
    if transactions.is_empty() {
        output::info("No transactions yet. Run `pw transactions fetch` to download them.");
        return Ok(());
    }
    println!("{}", output::transactions_table(&transactions));
    Ok(())
}

async fn fetch(json: bool) -> Result<()> {
    let ctx = get_context()?;
    require_login(&ctx)?;

    let spinner = output::spinner("Fetching transactions...");
    let result = ctx.transaction_service.fetch().await;
    spinner.finish_and_clear();

    if let Err(e) = &result {
        log_event(
            &get_logger(),
            LogEvent::new("transactions_fetch_failed")
                .with_command("transactions fetch")
                .with_error(e.to_string()),
        );
    }

    let transactions = finish(&ctx, result)?;
    if json {
        return output::json(&transactions);
    }
    output::success(&format!("Fetched {} transactions.", transactions.len()));
    if !transactions.is_empty() {
        println!("{}", output::transactions_table(&transactions));
    }
    Ok(())
}

fn sample(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let transactions = ctx.transaction_service.load_sample();
    finish(&ctx, Ok(()))?;

    if json {
        return output::json(&transactions);
    }
    output::success(&format!("Loaded {} sample transactions.", transactions.len()));
    println!("{}", "Run `pw transactions fetch` to replace them with real data.".dimmed());
    Ok(())
}

fn clear(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let changed = ctx.transaction_service.clear();
    finish(&ctx, Ok(()))?;

    if json {
        return output::json(serde_json::json!({ "cleared": changed }));
    }
    if changed {
        output::success("Transaction cache cleared.");
    } else {
        output::info("Transaction cache was already empty.");
    }
    Ok(())
}
