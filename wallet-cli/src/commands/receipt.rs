//! Receipt command

use anyhow::Result;
use wallet_core::Receipt;

use super::get_context;
use crate::output;

/// Print the receipt of a cached transaction
///
/// `reference` is the transaction id or a unique prefix of it.
pub fn run(reference: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let tx = ctx
        .transaction_service
        .find(reference)
        .ok_or_else(|| anyhow::anyhow!("No cached transaction matches '{}'", reference))?;

    let receipt = Receipt::from_transaction(&tx);
    if json {
        return output::json(&receipt);
    }
    println!("{}", receipt.render());
    Ok(())
}
