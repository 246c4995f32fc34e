//! Balance, top-up, withdraw and send-money commands

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password, Select};
use wallet_core::services::{BalanceService, FundsResult, LogEvent};
use wallet_core::Receipt;

use super::{finish, get_context, get_logger, log_event, require_login};
use crate::output;

pub async fn balance(cached: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    require_login(&ctx)?;

    let balance = if cached {
        ctx.store.current_user().and_then(|u| u.balance)
    } else {
        let spinner = output::spinner("Fetching balance...");
        let result = ctx.balance_service.refresh_balance().await;
        spinner.finish_and_clear();
        if let Err(e) = &result {
            log_event(
                &get_logger(),
                LogEvent::new("balance_refresh_failed").with_command("balance").with_error(e.to_string()),
            );
        }
        Some(finish(&ctx, result)?)
    };

    if json {
        return output::json(serde_json::json!({ "balance": balance }));
    }
    match balance {
        Some(b) => println!("Available balance: {}", output::money(b).bold()),
        None => output::info("Balance not fetched yet. Run `pw balance` while online."),
    }
    Ok(())
}

/// Pick a preset or type a custom amount
fn choose_topup_amount() -> Result<String> {
    let presets = BalanceService::presets();
    let mut items: Vec<String> = presets.iter().map(|p| output::money(*p)).collect();
    items.push("Custom amount".to_string());

    let choice = Select::new()
        .with_prompt("Amount to add")
        .items(&items)
        .default(0)
        .interact()?;

    match presets.get(choice) {
        Some(preset) => Ok(preset.to_string()),
        None => Ok(Input::new().with_prompt("Amount").interact_text()?),
    }
}

fn print_funds_result(title: &str, result: &FundsResult) {
    output::success(title);
    println!("{}", Receipt::from_transaction(&result.transaction).render());
    if let Some(balance) = result.balance {
        println!("New balance: {}", output::money(balance).bold());
    }
}

pub async fn topup(amount: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    require_login(&ctx)?;

    let amount = match amount {
        Some(a) => a,
        None => choose_topup_amount()?,
    };

    let spinner = output::spinner("Adding funds...");
    let result = ctx.balance_service.topup(&amount).await;
    spinner.finish_and_clear();

    match &result {
        Ok(_) => log_event(&get_logger(), LogEvent::new("topup_completed").with_command("topup")),
        Err(e) => log_event(
            &get_logger(),
            LogEvent::new("topup_failed").with_command("topup").with_error(e.to_string()),
        ),
    }

    let result = finish(&ctx, result)?;
    if json {
        return output::json(&result);
    }
    print_funds_result("Funds added.", &result);
    Ok(())
}

pub async fn withdraw(amount: Option<String>, pin: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    require_login(&ctx)?;

    let amount = match amount {
        Some(a) => a,
        None => {
            if let Some(balance) = ctx.store.current_user().and_then(|u| u.balance) {
                println!("Available balance: {}", output::money(balance));
            }
            Input::new().with_prompt("Withdrawal amount").interact_text()?
        }
    };

    let pin = match pin {
        Some(p) => Some(p),
        None if ctx.pin_service.has_pin() && !json => {
            Some(Password::new().with_prompt("Transaction PIN").interact()?)
        }
        None => None,
    };

    let spinner = output::spinner("Processing withdrawal...");
    let result = ctx.balance_service.withdraw(&amount, pin.as_deref()).await;
    spinner.finish_and_clear();

    match &result {
        Ok(_) => log_event(&get_logger(), LogEvent::new("withdraw_completed").with_command("withdraw")),
        Err(e) => log_event(
            &get_logger(),
            LogEvent::new("withdraw_failed").with_command("withdraw").with_error(e.to_string()),
        ),
    }

    let result = finish(&ctx, result)?;
    if json {
        return output::json(&result);
    }
    print_funds_result("Withdrawal successful.", &result);
    Ok(())
}

pub async fn send(phone: Option<String>, amount: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    require_login(&ctx)?;

    let phone = match phone {
        Some(p) => p,
        None => Input::new().with_prompt("Recipient phone number").interact_text()?,
    };
    let amount = match amount {
        Some(a) => a,
        None => Input::new().with_prompt("Amount").interact_text()?,
    };

    let draft = ctx.balance_service.prepare_send(&phone, &amount)?;
    if !json {
        println!(
            "Sending {} to {}",
            output::money(draft.amount).bold(),
            draft.recipient_phone
        );
    }

    let result = ctx.balance_service.send_money(&phone, &amount).await;
    if let Err(e) = &result {
        log_event(
            &get_logger(),
            LogEvent::new("send_money_unavailable").with_command("send").with_error(e.to_string()),
        );
    }
    let draft = result?;
    if json {
        return output::json(&draft);
    }
    output::success("Money sent.");
    Ok(())
}
