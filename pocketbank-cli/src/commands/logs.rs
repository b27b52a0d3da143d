//! Logs command - inspect and prune `logs.jsonl`
//!
//! Entries only ever carry an event name, the command and a failure kind,
//! so that is all there is to show.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, Color};
use dialoguer::Confirm;
use serde::Serialize;

use pocketbank_core::services::LogEntry;
use pocketbank_core::{EntryPoint, LoggingService};

use super::get_data_dir;
use crate::output;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Print the newest events
    List {
        /// How many events to print
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        /// Only events that recorded a failure
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove events older than a number of days
    Clear {
        #[arg(long, default_value_t = 30)]
        older_than_days: u32,
        /// Do not ask before deleting
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count events per command and failures
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClearOutput {
    deleted: u64,
    older_than_days: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsOutput {
    total: usize,
    failures: usize,
    by_command: BTreeMap<String, usize>,
    path: String,
}

pub fn run(command: LogsCommands) -> Result<()> {
    let logger = LoggingService::new(&get_data_dir()?, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))?;

    match command {
        LogsCommands::List { limit, errors, json } => list(&logger, limit, errors, json),
        LogsCommands::Clear { older_than_days, force, json } => {
            clear(&logger, older_than_days, force, json)
        }
        LogsCommands::Stats { json } => stats(&logger, json),
    }
}

fn list(logger: &LoggingService, limit: usize, errors: bool, json: bool) -> Result<()> {
    let entries = if errors {
        logger.get_errors(limit)?
    } else {
        logger.get_recent(limit)?
    };

    if json {
        return output::json_ok(entries);
    }
    if entries.is_empty() {
        output::info("The log is empty.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["When", "Command", "Event", "Failure"]);
    for entry in &entries {
        let failure = match &entry.error_message {
            Some(kind) => Cell::new(kind).fg(Color::Red),
            None => Cell::new(""),
        };
        table.add_row(vec![
            Cell::new(when(entry.timestamp)),
            Cell::new(entry.command.as_deref().unwrap_or("-")),
            Cell::new(&entry.event),
            failure,
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn clear(logger: &LoggingService, older_than_days: u32, force: bool, json: bool) -> Result<()> {
    let cutoff = cutoff_ms(Utc::now(), older_than_days);

    if !force && !json {
        if atty::isnt(atty::Stream::Stdin) {
            bail!("Pass --force to clear logs when stdin is not a terminal");
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove log entries older than {} days?", older_than_days))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Nothing removed.");
            return Ok(());
        }
    }

    let deleted = logger.delete_before(cutoff)?;
    if json {
        return output::json_ok(ClearOutput {
            deleted,
            older_than_days,
        });
    }
    output::success(&format!("Removed {} log entries", deleted));
    Ok(())
}

fn stats(logger: &LoggingService, json: bool) -> Result<()> {
    let entries = logger.get_recent(usize::MAX)?;
    let summary = StatsOutput {
        total: entries.len(),
        failures: entries.iter().filter(|e| e.error_message.is_some()).count(),
        by_command: count_by_command(&entries),
        path: logger.log_path().display().to_string(),
    };

    if json {
        return output::json_ok(summary);
    }

    println!("{}", "Event log".bold());
    println!("  {} entries, {} failures", summary.total, summary.failures);
    println!("  {}", summary.path.dimmed());
    if !summary.by_command.is_empty() {
        let mut table = output::create_table();
        table.set_header(vec!["Command", "Events"]);
        for (command, count) in &summary.by_command {
            table.add_row(vec![command.clone(), count.to_string()]);
        }
        println!("{}", table);
    }
    Ok(())
}

/// Unix-ms cutoff `days` before `now`; saturates at the epoch
fn cutoff_ms(now: DateTime<Utc>, days: u32) -> i64 {
    Duration::try_days(i64::from(days))
        .and_then(|age| now.checked_sub_signed(age))
        .map(|cutoff| cutoff.timestamp_millis())
        .unwrap_or(0)
        .max(0)
}

fn when(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn count_by_command(entries: &[LogEntry]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        if let Some(command) = &entry.command {
            *counts.entry(command.clone()).or_insert(0) += 1;
        }
    }
    counts
}
