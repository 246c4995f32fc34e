//! Output formatting utilities

use std::time::Duration;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use wallet_core::{Envelope, Transaction, TransactionType};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Print `data` wrapped in the `{success, data}` envelope
pub fn json<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&Envelope::ok(data))?);
    Ok(())
}

/// Print a failure envelope
pub fn json_error(message: &str) {
    let envelope: Envelope<()> = Envelope::fail(message);
    if let Ok(s) = serde_json::to_string_pretty(&envelope) {
        println!("{}", s);
    }
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Spinner shown on stderr while a request is in flight
///
/// Hidden when stderr is not a terminal so piped output stays clean.
pub fn spinner(msg: &str) -> ProgressBar {
    if !atty::is(atty::Stream::Stderr) {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Amount with currency sign, two decimals
pub fn money(amount: Decimal) -> String {
    format!("₹{:.2}", amount)
}

/// Signed amount, green for credits and red for debits
pub fn signed_money(tx: &Transaction) -> String {
    let text = format!("{}{}", tx.kind.sign(), money(tx.amount));
    match tx.kind {
        TransactionType::Credit => text.green().to_string(),
        TransactionType::Debit => text.red().to_string(),
    }
}

/// Table of transactions, newest first
pub fn transactions_table(transactions: &[Transaction]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Date", "Reference", "Description", "Amount"]);
    for tx in transactions {
        table.add_row(vec![
            tx.date.format("%Y-%m-%d %H:%M").to_string(),
            short_reference(&tx.uuid),
            tx.description.clone(),
            signed_money(tx),
        ]);
    }
    table
}

fn short_reference(uuid: &str) -> String {
    if uuid.chars().count() > 12 {
        format!("{}…", uuid.chars().take(12).collect::<String>())
    } else {
        uuid.to_string()
    }
}
