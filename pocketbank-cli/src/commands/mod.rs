//! CLI command implementations

pub mod close;
pub mod doctor;
pub mod loan;
pub mod login;
pub mod logs;
pub mod movement;
pub mod signup;
pub mod status;
pub mod transfer;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;

use pocketbank_core::{AccountKind, BankContext, EntryPoint, LogEvent, LoggingService, SessionContext};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Loggable name for a failure
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<pocketbank_core::Error>()
        .map(|e| e.kind())
        .unwrap_or("internal")
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("POCKETBANK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".pocketbank"))
        .ok_or_else(|| anyhow!("Could not find home directory; set POCKETBANK_DIR"))
}

/// Open the bank in the data directory
pub fn get_context() -> Result<BankContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    BankContext::new(&data_dir).context("Failed to open pocketbank data")
}

/// The stored session, if it is still live
pub fn resume_session(ctx: &BankContext) -> Result<SessionContext> {
    Ok(ctx.session_service.resume(Utc::now())?)
}

/// Parse a money amount, accepting either `.` or `,` as decimal separator
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let normalized = input.trim().replace(' ', "").replace(',', ".");
    let amount = Decimal::from_str(&normalized)
        .map_err(|_| anyhow!("Invalid amount: {}", input.trim()))?;
    if amount.scale() > 2 && amount != amount.round_dp(2) {
        bail!("Invalid amount: {} (at most two decimal places)", input.trim());
    }
    Ok(amount)
}

/// Parse an account kind name
pub fn parse_account(input: &str) -> Result<AccountKind> {
    AccountKind::from_str(input)
        .ok_or_else(|| anyhow!("Unknown account '{}' (expected checking or savings)", input))
}
