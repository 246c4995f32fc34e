//! Pocket Wallet CLI - your wallet in the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{auth, balance, config, logs, pin, receipt, status, transactions};

/// Pocket Wallet - balance, top-ups and withdrawals from the terminal
#[derive(Parser)]
#[command(name = "pw", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show who is signed in and what is cached
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in with phone number and password
    Login {
        /// Phone number (prompted when omitted)
        #[arg(long)]
        phone: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an account and set the transaction PIN
    Signup {
        /// Full name
        #[arg(long)]
        name: Option<String>,
        /// Phone number
        #[arg(long)]
        phone: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out and clear cached data
    Logout {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the wallet balance
    Balance {
        /// Show the last known balance without contacting the server
        #[arg(long)]
        cached: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add money to the wallet
    Topup {
        /// Amount to add (choose from presets when omitted)
        amount: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw money from the wallet
    Withdraw {
        /// Amount to withdraw
        amount: Option<String>,
        /// Transaction PIN (prompted when a PIN is set)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send money to another phone number
    Send {
        /// Recipient phone number
        #[arg(long)]
        to: Option<String>,
        /// Amount to send
        amount: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transaction history
    Transactions {
        #[command(subcommand)]
        command: Option<transactions::TransactionsCommands>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the transaction PIN
    Pin {
        #[command(subcommand)]
        command: pin::PinCommands,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the receipt of a cached transaction
    Receipt {
        /// Transaction reference (or a unique prefix)
        reference: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: Option<config::ConfigCommands>,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn wants_json(&self) -> bool {
        match self {
            Commands::Status { json }
            | Commands::Login { json, .. }
            | Commands::Signup { json, .. }
            | Commands::Logout { json, .. }
            | Commands::Balance { json, .. }
            | Commands::Topup { json, .. }
            | Commands::Withdraw { json, .. }
            | Commands::Send { json, .. }
            | Commands::Transactions { json, .. }
            | Commands::Pin { json, .. }
            | Commands::Receipt { json, .. } => *json,
            Commands::Config { .. } | Commands::Logs { .. } => false,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.command.wants_json();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // `{:#}` keeps the whole context chain on one line
            if json {
                output::json_error(&format!("{:#}", e));
            } else {
                output::error(&format!("Error: {:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { json } => status::run(json),
        Commands::Login { phone, json } => auth::login(phone, json).await,
        Commands::Signup { name, phone, json } => auth::signup(name, phone, json).await,
        Commands::Logout { force, json } => auth::logout(force, json),
        Commands::Balance { cached, json } => balance::balance(cached, json).await,
        Commands::Topup { amount, json } => balance::topup(amount, json).await,
        Commands::Withdraw { amount, pin, json } => balance::withdraw(amount, pin, json).await,
        Commands::Send { to, amount, json } => balance::send(to, amount, json).await,
        Commands::Transactions { command, json } => transactions::run(command, json).await,
        Commands::Pin { command, json } => pin::run(command, json),
        Commands::Receipt { reference, json } => receipt::run(&reference, json),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
