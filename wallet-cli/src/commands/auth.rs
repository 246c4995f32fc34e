//! Login, signup and logout commands

use std::env;

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input, Password};
use wallet_core::services::LogEvent;
use wallet_core::SignupForm;

use super::{finish, get_context, get_logger, log_event};
use crate::output;

/// Password from the environment, or prompt
fn password_or_prompt(prompt: &str) -> Result<String> {
    if let Ok(p) = env::var("POCKET_WALLET_PASSWORD") {
        return Ok(p);
    }
    Ok(Password::new().with_prompt(prompt).allow_empty_password(true).interact()?)
}

fn phone_or_prompt(phone: Option<String>) -> Result<String> {
    match phone {
        Some(p) => Ok(p),
        None => Ok(Input::new().with_prompt("Phone number").interact_text()?),
    }
}

pub async fn login(phone: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    if let Some(user) = ctx.store.current_user() {
        if json {
            return output::json(&user);
        }
        output::info(&format!("Already logged in as {} ({})", user.name, user.phone_number));
        return Ok(());
    }

    let phone = phone_or_prompt(phone)?;
    let password = password_or_prompt("Password")?;

    let spinner = output::spinner("Logging in...");
    let result = ctx.auth_service.login(&phone, &password).await;
    spinner.finish_and_clear();

    if let Err(e) = &result {
        log_event(&logger, LogEvent::new("login_failed").with_command("login").with_error(e.to_string()));
    } else {
        log_event(&logger, LogEvent::new("login_succeeded").with_command("login"));
    }

    let user = finish(&ctx, result)?;
    if json {
        return output::json(&user);
    }
    output::success(&format!("Welcome, {}!", user.name));
    println!("Balance: {}", output::money(user.balance.unwrap_or_default()).bold());
    Ok(())
}

pub async fn signup(name: Option<String>, phone: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Full name").interact_text()?,
    };
    let phone_number = phone_or_prompt(phone)?;
    let password = password_or_prompt("Password")?;
    let pin = Password::new()
        .with_prompt("4-digit PIN")
        .with_confirmation("Confirm PIN", "PINs do not match")
        .interact()?;

    let form = SignupForm {
        name,
        password,
        pin,
        phone_number,
    };

    let spinner = output::spinner("Creating account...");
    let result = ctx.auth_service.signup(&form).await;
    spinner.finish_and_clear();

    match &result {
        Ok(_) => log_event(&logger, LogEvent::new("signup_succeeded").with_command("signup")),
        Err(e) => log_event(
            &logger,
            LogEvent::new("signup_failed").with_command("signup").with_error(e.to_string()),
        ),
    }

    let user = finish(&ctx, result)?;
    if json {
        return output::json(&user);
    }
    output::success(&format!("Account created for {}.", user.name));
    println!("{}", "Log in with `pw login` to continue.".dimmed());
    Ok(())
}

pub fn logout(force: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;

    if !force && !json && ctx.store.current_user().is_some() {
        let confirmed = Confirm::new()
            .with_prompt("Log out and clear cached data on this device?")
            .default(true)
            .interact()?;
        if !confirmed {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let changed = ctx.auth_service.logout();
    finish(&ctx, Ok(()))?;
    log_event(&get_logger(), LogEvent::new("logout").with_command("logout"));

    if json {
        return output::json(serde_json::json!({ "logged_out": changed }));
    }
    if changed {
        output::success("Logged out.");
    } else {
        output::info("Already logged out.");
    }
    Ok(())
}
