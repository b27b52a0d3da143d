//! Signup command - open a new customer profile

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use colored::Colorize;
use dialoguer::Input;
use serde::Serialize;

use pocketbank_core::format_currency;
use pocketbank_core::services::SignupRequest;

use super::get_context;
use crate::output;

/// Values given on the command line; anything missing is prompted for
pub struct SignupArgs {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub id_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub username: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupOutput {
    username: String,
    pin: String,
    accounts: Vec<String>,
}

fn prompt(value: Option<String>, label: &str, flag: &str) -> Result<String> {
    if let Some(v) = value {
        return Ok(v);
    }
    if atty::isnt(atty::Stream::Stdin) {
        bail!("Missing --{} (stdin is not a terminal)", flag);
    }
    Ok(Input::<String>::new().with_prompt(label).interact_text()?)
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date of birth '{}' (expected YYYY-MM-DD)", input))
}

pub fn run(args: SignupArgs, json: bool) -> Result<()> {
    let first_name = prompt(args.first_name, "First name", "first-name")?;
    let last_name = prompt(args.last_name, "Last name", "last-name")?;
    let id_number = prompt(args.id_number, "ID number", "id-number")?;
    let date_of_birth = parse_date(&prompt(
        args.date_of_birth,
        "Date of birth (YYYY-MM-DD)",
        "date-of-birth",
    )?)?;

    let ctx = get_context()?;
    let user = ctx.banking_service.signup(
        SignupRequest {
            first_name,
            last_name,
            id_number,
            date_of_birth,
            nationality: args.nationality,
            username: args.username,
        },
        Utc::now(),
    )?;

    if json {
        return output::json_ok(SignupOutput {
            username: user.username.clone(),
            pin: user.pin.clone(),
            accounts: user.accounts.iter().map(|a| a.kind.to_string()).collect(),
        });
    }

    let symbol = ctx.config.currency_symbol.as_str();
    output::success(&format!("Welcome, {}!", user.display_name.full()));
    println!();
    println!("  Username: {}", user.username.bold());
    println!("  PIN:      {}", user.pin.bold());
    println!();
    for account in &user.accounts {
        println!(
            "  {} account opened with {}",
            account.kind,
            format_currency(account.balance, symbol)
        );
    }
    println!();
    output::warning("Write your PIN down now. It will not be shown again.");

    Ok(())
}
