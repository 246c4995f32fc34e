//! Config command - show and change settings.json

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use wallet_core::config::Config;

use super::get_wallet_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the settings in effect
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Point the wallet at another backend
    Server {
        /// Base URL, e.g. http://10.0.2.2:5000/api
        url: String,
    },
    /// Turn offline mode on or off
    Offline {
        #[arg(value_parser = ["on", "off"])]
        mode: String,
    },
}

pub fn run(command: Option<ConfigCommands>) -> Result<()> {
    let wallet_dir = get_wallet_dir()?;
    std::fs::create_dir_all(&wallet_dir)?;

    match command.unwrap_or(ConfigCommands::Show { json: false }) {
        ConfigCommands::Show { json } => {
            let config = Config::load(&wallet_dir)?;
            if json {
                return output::json(serde_json::json!({
                    "api_base_url": config.api_base_url,
                    "request_timeout_secs": config.request_timeout.as_secs(),
                    "offline": config.offline,
                    "persist_key": config.persist.key,
                }));
            }
            println!("{}", "Settings".bold());
            println!("  Server:  {}", config.api_base_url);
            println!("  Timeout: {}s", config.request_timeout.as_secs());
            println!(
                "  Offline: {}",
                if config.offline { "on".yellow() } else { "off".green() }
            );
            println!("  File:    {}", wallet_dir.join(wallet_core::config::SETTINGS_FILE).display());
        }
        ConfigCommands::Server { url } => {
            // Environment overrides are left out so they never end up in the file
            let mut config = Config::load_with_env(&wallet_dir, |_| None)?;
            config.set_api_base_url(&url)?;
            config.save(&wallet_dir)?;
            output::success(&format!("Server set to {}", config.api_base_url));
        }
        ConfigCommands::Offline { mode } => {
            let mut config = Config::load_with_env(&wallet_dir, |_| None)?;
            config.offline = mode == "on";
            config.save(&wallet_dir)?;
            output::success(&format!("Offline mode {}", mode));
        }
    }
    Ok(())
}
