//! Loan command - request a loan into the main account

use anyhow::Result;
use chrono::Utc;

use pocketbank_core::{format_currency, LoanDecision};

use super::{get_context, parse_amount, resume_session};
use crate::output;

pub fn run(amount: &str, json: bool) -> Result<()> {
    let amount = parse_amount(amount)?;
    let ctx = get_context()?;
    let mut session = resume_session(&ctx)?;

    let outcome = ctx
        .banking_service
        .request_loan(&mut session, amount, Utc::now())?;

    if json {
        return output::json_ok(&outcome);
    }

    let symbol = ctx.config.currency_symbol.as_str();
    match outcome.decision {
        LoanDecision::Approved => {
            output::success(&format!(
                "Loan of {} approved",
                format_currency(outcome.amount, symbol)
            ));
        }
        LoanDecision::Declined => {
            let needed = outcome.amount * ctx.config.loan_deposit_ratio;
            output::warning(&format!(
                "Loan declined: you need at least one deposit of {} or more",
                format_currency(needed, symbol)
            ));
        }
    }
    println!("Balance: {}", format_currency(outcome.balance, symbol));
    Ok(())
}
