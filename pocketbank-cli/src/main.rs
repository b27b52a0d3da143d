//! Pocketbank CLI - a tiny bank in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{close, doctor, loan, login, logs, movement, signup, status, transfer};
use pocketbank_core::LogEvent;

/// Pocketbank - a tiny bank in your terminal
#[derive(Parser)]
#[command(name = "pb", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a new account (prints your PIN once)
    Signup {
        /// First name
        #[arg(long)]
        first_name: Option<String>,
        /// Last name
        #[arg(long)]
        last_name: Option<String>,
        /// National ID number
        #[arg(long)]
        id_number: Option<String>,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        date_of_birth: Option<String>,
        /// Nationality
        #[arg(long)]
        nationality: Option<String>,
        /// Username (defaults to your initials)
        #[arg(long)]
        username: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log in with username and PIN
    Login {
        /// Username
        username: Option<String>,
        /// PIN (prompted when omitted)
        #[arg(long, env = "POCKETBANK_PIN", hide_env_values = true)]
        pin: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show balances, movements, and summary
    Status {
        /// Account to show (checking, savings)
        #[arg(long, short)]
        account: Option<String>,
        /// Sort movements by amount instead of date
        #[arg(long)]
        sort: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deposit money into an account
    Deposit {
        /// Amount to deposit
        amount: String,
        /// Account to credit (checking, savings)
        #[arg(long, short, default_value = "checking")]
        account: String,
        /// Description shown in the movements list
        #[arg(long, short, default_value = "Deposit")]
        description: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw money from an account
    Withdraw {
        /// Amount to withdraw
        amount: String,
        /// Account to debit (checking, savings)
        #[arg(long, short, default_value = "checking")]
        account: String,
        /// Description shown in the movements list
        #[arg(long, short, default_value = "Withdrawal")]
        description: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send money to another user
    Transfer {
        /// Recipient username
        to: String,
        /// Amount to send
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Request a loan into your main account
    Loan {
        /// Loan amount
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Close your account permanently
    Close {
        /// Username (confirms which account to close)
        #[arg(long)]
        username: Option<String>,
        /// PIN (prompted when omitted)
        #[arg(long)]
        pin: Option<String>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Run data health checks
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Signup { .. } => "signup",
            Commands::Login { .. } => "login",
            Commands::Logout => "logout",
            Commands::Status { .. } => "status",
            Commands::Deposit { .. } => "deposit",
            Commands::Withdraw { .. } => "withdraw",
            Commands::Transfer { .. } => "transfer",
            Commands::Loan { .. } => "loan",
            Commands::Close { .. } => "close",
            Commands::Doctor { .. } => "doctor",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = commands::get_logger();
    let name = cli.command.name();

    commands::log_event(&logger, LogEvent::new("command_executed").with_command(name));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Only the error kind is logged; messages can carry amounts
            commands::log_event(
                &logger,
                LogEvent::new("command_failed")
                    .with_command(name)
                    .with_error(commands::error_kind(&e)),
            );
            output::error(&e.to_string());
            if e.downcast_ref::<pocketbank_core::Error>()
                .is_some_and(|core| !core.is_user_error())
            {
                output::info("Run `pb doctor` to check the stored data.");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Signup {
            first_name,
            last_name,
            id_number,
            date_of_birth,
            nationality,
            username,
            json,
        } => signup::run(
            signup::SignupArgs {
                first_name,
                last_name,
                id_number,
                date_of_birth,
                nationality,
                username,
            },
            json,
        ),
        Commands::Login { username, pin } => login::run(username, pin),
        Commands::Logout => login::run_logout(),
        Commands::Status { account, sort, json } => status::run(account.as_deref(), sort, json),
        Commands::Deposit { amount, account, description, json } => {
            movement::run_deposit(&amount, &account, &description, json)
        }
        Commands::Withdraw { amount, account, description, json } => {
            movement::run_withdraw(&amount, &account, &description, json)
        }
        Commands::Transfer { to, amount, json } => transfer::run(&to, &amount, json),
        Commands::Loan { amount, json } => loan::run(&amount, json),
        Commands::Close { username, pin, force } => close::run(username, pin, force),
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::Logs { command } => logs::run(command),
    }
}
