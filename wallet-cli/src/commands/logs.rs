//! Logs command - inspect the wallet's event log
//!
//! Every command appends to the log in the wallet directory. These
//! subcommands read it back, prune it and hand it over for bug reports.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Table;
use dialoguer::Confirm;
use wallet_core::services::{EntryPoint, LogEntry, LoggingService};

use super::get_wallet_dir;
use crate::output;

/// Longest error message shown inline in the table
const PROBLEM_WIDTH: usize = 48;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries, newest first
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only entries that recorded a failure
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop entries older than a number of days
    Clear {
        /// Keep entries from the last N days
        #[arg(long, default_value = "30")]
        older_than_days: u32,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy the log file somewhere else, e.g. to attach to a bug report
    Export {
        /// Destination file
        output: PathBuf,
    },
    /// Show log statistics and file path
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: LogsCommands) -> Result<()> {
    let service = open_log()?;
    match command {
        LogsCommands::List { limit, errors, json } => list(&service, limit, errors, json),
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => clear(&service, older_than_days, force, json),
        LogsCommands::Export { output: destination } => {
            let written = service.export(&destination)?;
            output::success(&format!("Logs exported to {}", written.display()));
            Ok(())
        }
        LogsCommands::Stats { json } => stats(&service, json),
    }
}

fn open_log() -> Result<LoggingService> {
    let wallet_dir = get_wallet_dir()?;
    Ok(LoggingService::new(&wallet_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))?)
}

fn list(service: &LoggingService, limit: usize, only_errors: bool, json: bool) -> Result<()> {
    let entries = if only_errors {
        service.get_errors(limit)?
    } else {
        service.get_recent(limit)?
    };

    if json {
        return output::json(&entries);
    }

    if entries.is_empty() {
        output::info(if only_errors {
            "No failures logged."
        } else {
            "The log is empty."
        });
        return Ok(());
    }

    println!("{}", entries_table(&entries));

    let failures = entries.iter().filter(|e| e.error_message.is_some()).count();
    if failures > 0 && !only_errors {
        println!();
        output::warning(&format!(
            "{} of {} entries recorded a failure. Use `pw logs list --errors` for the details.",
            failures,
            entries.len()
        ));
    }
    Ok(())
}

fn entries_table(entries: &[LogEntry]) -> Table {
    let mut table = output::create_table();
    table.set_header(vec!["When", "Event", "Origin", "Problem"]);

    for entry in entries {
        let problem = match (&entry.error_message, &entry.error_details) {
            (Some(message), _) => clip(message, PROBLEM_WIDTH).red().to_string(),
            (None, Some(details)) => clip(details, PROBLEM_WIDTH).dimmed().to_string(),
            (None, None) => String::new(),
        };
        table.add_row(vec![
            local_time(entry.timestamp),
            entry.event.clone(),
            origin(entry),
            problem,
        ]);
    }
    table
}

/// Where an entry came from, e.g. `cli withdraw` or `app login screen`
fn origin(entry: &LogEntry) -> String {
    match (entry.command.as_deref(), entry.screen.as_deref()) {
        (Some(command), _) => format!("{} {}", entry.entry_point, command),
        (None, Some(screen)) => format!("{} {} screen", entry.entry_point, screen),
        (None, None) => entry.entry_point.clone(),
    }
}

fn local_time(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms).single() {
        Some(at) => DateTime::<Local>::from(at).format("%d %b %H:%M:%S").to_string(),
        None => timestamp_ms.to_string(),
    }
}

fn clip(text: &str, width: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() <= width && first_line.len() == text.len() {
        return first_line.to_string();
    }
    let kept: String = first_line.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}

fn retention_cutoff(now: DateTime<Utc>, days: u32) -> i64 {
    (now - Duration::days(i64::from(days))).timestamp_millis()
}

fn clear(service: &LoggingService, days: u32, force: bool, json: bool) -> Result<()> {
    let cutoff_ms = retention_cutoff(Utc::now(), days);

    if !force && !json {
        let prompt = match days {
            0 => "Delete the whole log?".to_string(),
            1 => "Delete entries older than a day?".to_string(),
            n => format!("Delete entries older than {} days?", n),
        };
        if !Confirm::new().with_prompt(prompt).default(false).interact()? {
            output::info("Log left untouched.");
            return Ok(());
        }
    }

    let deleted = service.delete_before(cutoff_ms)?;
    let remaining = service.count()?;

    if json {
        return output::json(serde_json::json!({
            "deleted": deleted,
            "remaining": remaining,
        }));
    }
    output::success(&format!("Removed {} entries, {} kept", deleted, remaining));
    Ok(())
}

fn stats(service: &LoggingService, json: bool) -> Result<()> {
    let total = service.count()?;
    let failures = service.get_errors(usize::MAX)?;
    let last_failure = failures.first().map(|e| local_time(e.timestamp));
    let log_path = service.log_path().to_path_buf();
    let size_bytes = std::fs::metadata(&log_path).map(|m| m.len()).unwrap_or(0);

    if json {
        return output::json(serde_json::json!({
            "total_entries": total,
            "error_count": failures.len(),
            "last_error_at": failures.first().map(|e| e.timestamp),
            "log_path": log_path.to_string_lossy(),
            "log_size_bytes": size_bytes
        }));
    }
    println!("{}", "Log Statistics".bold());
    println!("  Total entries: {}", total);
    match last_failure {
        Some(at) => println!("  Errors: {} (last at {})", failures.len(), at),
        None => println!("  Errors: 0"),
    }
    println!("  File: {}", log_path.display());
    println!("  Size: {} bytes", size_bytes);
    Ok(())
}
