//! Status command

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use wallet_core::Route;

use super::get_context;
use crate::output;

#[derive(Serialize)]
struct StatusReport {
    route: Route,
    user: Option<wallet_core::User>,
    transactions: usize,
    transactions_loading: bool,
    transactions_error: Option<String>,
    has_pin: bool,
    unlocked: bool,
    api_base_url: String,
    offline: bool,
}

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;

    let report = ctx.store.with_state(|s| StatusReport {
        route: s.route(),
        user: s.auth.user().cloned(),
        transactions: s.transactions.transactions().len(),
        transactions_loading: s.transactions.loading(),
        transactions_error: s.transactions.error().map(str::to_string),
        has_pin: s.auth.user().is_some_and(|u| s.app.has_pin_for(&u.id)),
        unlocked: s.app.has_completed_biometrics(),
        api_base_url: ctx.config.api_base_url.clone(),
        offline: ctx.config.offline,
    });

    if json {
        return output::json(&report);
    }

    println!("{}", "Pocket Wallet".bold());
    match &report.user {
        Some(user) => {
            println!("  Signed in: {} ({})", user.name, user.phone_number);
            if let Some(balance) = user.balance {
                println!("  Balance:   {}", output::money(balance));
            }
        }
        None => println!("  Signed in: {}", "no".dimmed()),
    }
    println!("  Screen:    {:?}", report.route);
    println!("  Cached:    {} transactions", report.transactions);
    if let Some(e) = &report.transactions_error {
        println!("  Last fetch error: {}", e.red());
    }
    println!("  PIN set:   {}", if report.has_pin { "yes" } else { "no" });
    println!("  Unlocked:  {}", if report.unlocked { "yes" } else { "no" });
    println!("  Server:    {}{}", report.api_base_url, if report.offline { " (offline)" } else { "" });
    Ok(())
}
