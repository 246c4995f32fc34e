//! Transaction PIN and biometric gate commands

use anyhow::Result;
use clap::Subcommand;
use dialoguer::Password;
use wallet_core::services::LogEvent;

use super::{finish, get_context, get_logger, log_event, require_login};
use crate::output;

#[derive(Subcommand)]
pub enum PinCommands {
    /// Set the transaction PIN (changing it asks for the current one)
    Set,
    /// Verify the PIN and unlock the biometric gate
    Verify,
    /// Forget the biometric unlock so the next session asks again
    Reset,
    /// Show whether a PIN is set and the gate is unlocked
    Status,
}

pub fn run(command: PinCommands, json: bool) -> Result<()> {
    match command {
        PinCommands::Set => set(json),
        PinCommands::Verify => verify(json),
        PinCommands::Reset => reset(json),
        PinCommands::Status => status(json),
    }
}

fn set(json: bool) -> Result<()> {
    let ctx = get_context()?;
    require_login(&ctx)?;

    let current = if ctx.pin_service.has_pin() {
        Some(Password::new().with_prompt("Current PIN").interact()?)
    } else {
        None
    };
    let pin = Password::new()
        .with_prompt("New 4-digit PIN")
        .with_confirmation("Confirm PIN", "PINs do not match")
        .interact()?;

    let result = ctx.pin_service.set_pin(current.as_deref(), &pin);
    match &result {
        Ok(()) => log_event(&get_logger(), LogEvent::new("pin_set").with_command("pin set")),
        Err(e) => log_event(
            &get_logger(),
            LogEvent::new("pin_set_failed").with_command("pin set").with_error(e.to_string()),
        ),
    }
    finish(&ctx, result)?;

    if json {
        return output::json(serde_json::json!({ "pin_set": true }));
    }
    output::success("PIN saved.");
    Ok(())
}

fn verify(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let pin = Password::new().with_prompt("PIN").interact()?;

    let result = ctx.pin_service.verify_pin(&pin);
    if let Err(e) = &result {
        log_event(
            &get_logger(),
            LogEvent::new("pin_verify_failed").with_command("pin verify").with_error(e.to_string()),
        );
    }
    finish(&ctx, result)?;

    if json {
        return output::json(serde_json::json!({ "verified": true }));
    }
    output::success("PIN verified.");
    Ok(())
}

fn reset(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let changed = ctx.pin_service.reset_biometrics();
    finish(&ctx, Ok(()))?;

    if json {
        return output::json(serde_json::json!({ "reset": changed }));
    }
    if changed {
        output::success("Biometric unlock reset.");
    } else {
        output::info("Biometric unlock was not set.");
    }
    Ok(())
}

fn status(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let has_pin = ctx.pin_service.has_pin();
    let unlocked = ctx.pin_service.has_completed_biometrics();

    if json {
        return output::json(serde_json::json!({ "has_pin": has_pin, "unlocked": unlocked }));
    }
    println!("PIN set:   {}", if has_pin { "yes" } else { "no" });
    println!("Unlocked:  {}", if unlocked { "yes" } else { "no" });
    Ok(())
}
