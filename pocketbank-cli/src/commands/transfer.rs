//! Transfer command - send money to another user

use anyhow::Result;
use chrono::Utc;

use pocketbank_core::format_currency;

use super::{get_context, parse_amount, resume_session};
use crate::output;

pub fn run(to: &str, amount: &str, json: bool) -> Result<()> {
    let amount = parse_amount(amount)?;
    let ctx = get_context()?;
    let mut session = resume_session(&ctx)?;

    let receipt = ctx
        .banking_service
        .transfer(&mut session, to, amount, Utc::now())?;

    if json {
        return output::json_ok(&receipt);
    }

    let symbol = ctx.config.currency_symbol.as_str();
    output::success(&format!(
        "Sent {} to {}",
        format_currency(receipt.amount, symbol),
        receipt.to
    ));
    println!("Balance: {}", format_currency(receipt.sender_balance, symbol));
    Ok(())
}
