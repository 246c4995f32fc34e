//! Client-side form validation
//!
//! Every check here runs before any store transition or network request.
//! Messages are the ones shown to the user.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::result::{Error, Result};

/// Longest amount a keypad entry accepts, in characters
pub const MAX_AMOUNT_CHARS: usize = 10;

/// Preset top-up amounts offered next to the custom field
pub const TOPUP_PRESETS: [u32; 4] = [100, 200, 500, 1000];

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{10}$").expect("valid phone regex"))
}

fn pin_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}$").expect("valid pin regex"))
}

/// Phone numbers are exactly ten digits
pub fn validate_phone_number(phone_number: &str) -> Result<()> {
    if phone_regex().is_match(phone_number) {
        Ok(())
    } else {
        Err(Error::validation("Phone number must be 10 digits."))
    }
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::validation("Password is required."));
    }
    Ok(())
}

/// PINs are exactly four digits
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin_regex().is_match(pin) {
        Ok(())
    } else {
        Err(Error::validation("PIN must be 4 digits."))
    }
}

/// Parse a user-entered amount; it must be a number greater than zero
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let raw = raw.trim();
    match Decimal::from_str(raw) {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(Error::validation("Please enter a valid amount")),
    }
}

/// Keypad entry: same as [`parse_amount`] plus the length cap
pub fn parse_keypad_amount(raw: &str) -> Result<Decimal> {
    if raw.trim().chars().count() > MAX_AMOUNT_CHARS {
        return Err(Error::validation(format!(
            "Amount can be at most {} characters",
            MAX_AMOUNT_CHARS
        )));
    }
    parse_amount(raw)
}

/// Reject amounts above the last known balance
///
/// An unknown balance is not a rejection; the server has the final word.
pub fn ensure_sufficient_balance(amount: Decimal, balance: Option<Decimal>) -> Result<()> {
    match balance {
        Some(balance) if amount > balance => Err(Error::validation(format!(
            "Insufficient balance. Available balance is {:.2}",
            balance
        ))),
        _ => Ok(()),
    }
}

/// Signup form as entered
#[derive(Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub password: String,
    pub pin: String,
    pub phone_number: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty()
            || self.password.is_empty()
            || self.pin.is_empty()
            || self.phone_number.is_empty()
        {
            return Err(Error::validation("All fields are required."));
        }
        validate_pin(&self.pin)?;
        validate_phone_number(&self.phone_number)?;
        Ok(())
    }
}
