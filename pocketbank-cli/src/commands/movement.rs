//! Deposit and withdraw commands

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use pocketbank_core::{format_currency, AccountKind, BankContext, Transaction};

use super::{get_context, parse_account, parse_amount, resume_session};
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MovementOutput<'a> {
    account: AccountKind,
    transaction: &'a Transaction,
    balance: Decimal,
}

fn report(
    ctx: &BankContext,
    username: &str,
    kind: AccountKind,
    tx: &Transaction,
    json: bool,
) -> Result<()> {
    let balance = ctx
        .directory
        .find_by_username(username)?
        .and_then(|u| u.account(kind).map(|a| a.balance))
        .unwrap_or_default();

    if json {
        return output::json_ok(MovementOutput {
            account: kind,
            transaction: tx,
            balance,
        });
    }

    let symbol = ctx.config.currency_symbol.as_str();
    let verb = if tx.is_credit() { "Deposited" } else { "Withdrew" };
    output::success(&format!(
        "{} {} ({} account)",
        verb,
        format_currency(tx.amount.abs(), symbol),
        kind
    ));
    println!("Balance: {}", format_currency(balance, symbol));
    Ok(())
}

pub fn run_deposit(amount: &str, account: &str, description: &str, json: bool) -> Result<()> {
    let amount = parse_amount(amount)?;
    let kind = parse_account(account)?;
    let ctx = get_context()?;
    let mut session = resume_session(&ctx)?;

    let tx = ctx
        .banking_service
        .deposit(&mut session, kind, amount, description, Utc::now())?;
    report(&ctx, &session.username, kind, &tx, json)
}

pub fn run_withdraw(amount: &str, account: &str, description: &str, json: bool) -> Result<()> {
    let amount = parse_amount(amount)?;
    let kind = parse_account(account)?;
    let ctx = get_context()?;
    let mut session = resume_session(&ctx)?;

    let tx = ctx
        .banking_service
        .withdraw(&mut session, kind, amount, description, Utc::now())?;
    report(&ctx, &session.username, kind, &tx, json)
}
