//! Close command - permanently delete the logged-in user

use anyhow::{bail, Result};
use chrono::Utc;
use colored::Colorize;
use dialoguer::{Confirm, Input, Password};

use super::{get_context, resume_session};
use crate::output;

pub fn run(username: Option<String>, pin: Option<String>, force: bool) -> Result<()> {
    let ctx = get_context()?;
    let mut session = resume_session(&ctx)?;
    let interactive = atty::is(atty::Stream::Stdin);

    let username = match username {
        Some(u) => u,
        None if interactive => Input::<String>::new()
            .with_prompt("Confirm username")
            .interact_text()?,
        None => bail!("Missing --username (stdin is not a terminal)"),
    };
    let pin = match pin {
        Some(p) => p,
        None if interactive => Password::new().with_prompt("Confirm PIN").interact()?,
        None => bail!("Missing --pin (stdin is not a terminal)"),
    };

    // Confirm removal unless --force
    if !force {
        println!(
            "\n{}",
            "This will delete your profile and every account balance.".yellow()
        );
        println!("{}\n", "This cannot be undone.".dimmed());

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.banking_service
        .close_account(&mut session, &username, &pin, Utc::now())?;
    output::success("Account closed. Goodbye!");
    Ok(())
}
