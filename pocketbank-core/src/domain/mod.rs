//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with ledger rules - no I/O or external dependencies.

mod account;
mod money;
mod session;
mod transaction;
mod user;
pub mod result;

pub use account::{Account, AccountKind, LedgerSummary, LoanDecision, SortOrder, Transactions};
pub use money::format_currency;
pub use session::{SessionContext, SessionRecord, SessionTimer};
pub use transaction::{Transaction, TransactionKind, TAG_BONUS, TAG_LOAN, TAG_TRANSFER};
pub use user::{
    generate_pin, is_valid_pin, normalize_username, DisplayName, User, DEFAULT_NATIONALITY,
};
