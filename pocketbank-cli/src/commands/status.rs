//! Status command - the account dashboard

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Color};

use pocketbank_core::{SortOrder, TransactionKind};

use super::{get_context, parse_account, resume_session};
use crate::output;

pub fn run(account: Option<&str>, sort: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let mut session = resume_session(&ctx)?;
    let selected = account.map(parse_account).transpose()?;
    let order = if sort {
        SortOrder::AmountDesc
    } else {
        SortOrder::DateDesc
    };

    let dashboard = ctx
        .banking_service
        .dashboard(&mut session, selected, order, Utc::now())?;

    if json {
        return output::json_ok(&dashboard);
    }

    println!("{}", format!("Welcome back, {}", dashboard.first_name).bold());
    println!("As of {}", dashboard.date.format("%Y/%m/%d").to_string().dimmed());
    println!();

    let mut accounts = output::create_table();
    accounts.set_header(vec!["Account", "Balance"]);
    for view in &dashboard.accounts {
        let name = if view.kind == dashboard.selected {
            format!("{} *", view.kind)
        } else {
            view.kind.to_string()
        };
        accounts.add_row(vec![
            Cell::new(name),
            Cell::new(&view.balance_display).set_alignment(CellAlignment::Right),
        ]);
    }
    accounts.add_row(vec![
        Cell::new("Total"),
        Cell::new(&dashboard.total_balance_display).set_alignment(CellAlignment::Right),
    ]);
    println!("{}", accounts);
    println!();

    if dashboard.movements.is_empty() {
        println!("No movements yet.");
    } else {
        let mut movements = output::create_table();
        movements.set_header(vec!["#", "Type", "Date", "Description", "Amount"]);
        for movement in &dashboard.movements {
            let kind_cell = match movement.kind {
                TransactionKind::Deposit => Cell::new("DEPOSIT").fg(Color::Green),
                TransactionKind::Withdrawal => Cell::new("WITHDRAWAL").fg(Color::Red),
            };
            movements.add_row(vec![
                Cell::new(movement.number),
                kind_cell,
                Cell::new(movement.date.format("%Y/%m/%d")),
                Cell::new(&movement.description),
                Cell::new(&movement.amount_display).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{}", movements);
    }
    println!();

    let summary = &dashboard.summary;
    println!(
        "In {}   Out {}   Interest {}",
        summary.total_in_display.green(),
        summary.total_out_display.red(),
        summary.interest_display.cyan(),
    );
    println!();
    println!(
        "You will be logged out in {}",
        dashboard.session_remaining.bold()
    );

    Ok(())
}
