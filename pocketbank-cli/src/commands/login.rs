//! Login and logout commands

use anyhow::{bail, Result};
use chrono::Utc;
use dialoguer::{Input, Password};

use super::get_context;
use crate::output;

pub fn run(username: Option<String>, pin: Option<String>) -> Result<()> {
    let interactive = atty::is(atty::Stream::Stdin);

    let username = match username {
        Some(u) => u,
        None if interactive => Input::<String>::new().with_prompt("Username").interact_text()?,
        None => bail!("Missing username (stdin is not a terminal)"),
    };
    let pin = match pin {
        Some(p) => p,
        None if interactive => Password::new().with_prompt("PIN").interact()?,
        None => bail!("Missing --pin (stdin is not a terminal)"),
    };

    let ctx = get_context()?;
    let now = Utc::now();
    let session = ctx.session_service.login(&username, &pin, now)?;
    let user = ctx.banking_service.current_user(&session)?;

    output::success(&format!("Welcome back, {}!", user.display_name.first));
    output::info(&format!(
        "You will be logged out after {} of inactivity.",
        session.timer.display(now)
    ));
    Ok(())
}

pub fn run_logout() -> Result<()> {
    let ctx = get_context()?;
    ctx.session_service.logout()?;
    output::success("Logged out");
    Ok(())
}
