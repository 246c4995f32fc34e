//! Logging service - structured event logging to a JSON-lines file
//!
//! Provides a privacy-safe event log stored in `logs.jsonl` in the wallet
//! directory. No user data (phone numbers, names, balances, amounts, PINs,
//! passwords) is ever logged; events carry only names, screens, commands and
//! error messages.
//!
//! Every read and write holds an exclusive `fs2` lock on `logs.lock`, so the
//! CLI and a long-running host can share one log.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};

const LOG_FILE: &str = "logs.jsonl";
const LOCK_FILE: &str = "logs.lock";

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    // Lower 16 bits for the counter (65536 unique IDs per millisecond)
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    ((now_ms() as u64) << 16) | counter
}

/// Current unix timestamp in milliseconds
fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else if cfg!(target_os = "android") {
        "android"
    } else if cfg!(target_os = "ios") {
        "ios"
    } else {
        "unknown"
    }
}

/// Which front-end produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    App,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::App => "app",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            screen: None,
            command: None,
            error_message: None,
            error_details: None,
        }
    }

    /// Set the screen context (login, home, withdraw, ...)
    pub fn with_screen(mut self, screen: impl Into<String>) -> Self {
        self.screen = Some(screen.into());
        self
    }

    /// Set the command context (for CLI events)
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A log entry as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    #[serde(default)]
    pub screen: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error_details: Option<String>,
}

/// Service for structured event logging
pub struct LoggingService {
    log_path: PathBuf,
    lock_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

struct LogLock {
    file: File,
}

impl Drop for LogLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl LoggingService {
    /// Create a logging service writing to `logs.jsonl` in `wallet_dir`
    pub fn new(
        wallet_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        fs::create_dir_all(wallet_dir)?;
        Ok(Self {
            log_path: wallet_dir.join(LOG_FILE),
            lock_path: wallet_dir.join(LOCK_FILE),
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        })
    }

    fn lock(&self) -> Result<LogLock> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)?;
        file.lock_exclusive()
            .map_err(|e| Error::storage(format!("Failed to lock log: {}", e)))?;
        Ok(LogLock { file })
    }

    /// All readable entries in file order (oldest first); corrupt lines are skipped
    fn read_all(&self) -> Result<Vec<LogEntry>> {
        let file = match File::open(&self.log_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let entries = BufReader::new(file)
            .lines()
            .map_while(|line| line.ok())
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();
        Ok(entries)
    }

    /// Log an event
    ///
    /// The entry point, app version and platform are added from the
    /// service configuration.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let entry = LogEntry {
            id: generate_id(),
            timestamp: now_ms(),
            entry_point: self.entry_point.as_str().to_string(),
            app_version: self.app_version.clone(),
            platform: self.platform.to_string(),
            event: event.event,
            screen: event.screen,
            command: event.command,
            error_message: event.error_message,
            error_details: event.error_details,
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let _lock = self.lock()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Log a simple event with just a name
    pub fn log_event(&self, event: &str) -> Result<()> {
        self.log(LogEvent::new(event))
    }

    pub fn log_error(&self, event: &str, message: &str, details: Option<&str>) -> Result<()> {
        let mut log_event = LogEvent::new(event).with_error(message);
        if let Some(d) = details {
            log_event = log_event.with_error_details(d);
        }
        self.log(log_event)
    }

    /// Most recent entries first, up to `limit`
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let _lock = self.lock()?;
        let mut entries = self.read_all()?;
        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }

    /// Most recent entries carrying an error, up to `limit`
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let _lock = self.lock()?;
        let entries = self
            .read_all()?
            .into_iter()
            .rev()
            .filter(|e| e.error_message.is_some())
            .take(limit)
            .collect();
        Ok(entries)
    }

    pub fn count(&self) -> Result<u64> {
        let _lock = self.lock()?;
        Ok(self.read_all()?.len() as u64)
    }

    /// Delete logs older than the specified timestamp (unix ms)
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let _lock = self.lock()?;
        let entries = self.read_all()?;
        let before = entries.len();
        let kept: Vec<LogEntry> = entries
            .into_iter()
            .filter(|e| e.timestamp >= timestamp_ms)
            .collect();
        let deleted = (before - kept.len()) as u64;
        if deleted == 0 {
            return Ok(0);
        }

        let dir = self
            .log_path
            .parent()
            .ok_or_else(|| Error::storage("Log file has no parent directory"))?;
        let mut temp = NamedTempFile::new_in(dir)?;
        for entry in &kept {
            serde_json::to_writer(&mut temp, entry)?;
            temp.write_all(b"\n")?;
        }
        temp.persist(&self.log_path)
            .map_err(|e| Error::storage(format!("Failed to rewrite log: {}", e)))?;
        Ok(deleted)
    }

    /// Copy the log to `output_path` for troubleshooting
    pub fn export(&self, output_path: &Path) -> Result<PathBuf> {
        let _lock = self.lock()?;
        if self.log_path.exists() {
            fs::copy(&self.log_path, output_path)?;
        } else {
            File::create(output_path)?;
        }
        Ok(output_path.to_path_buf())
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
