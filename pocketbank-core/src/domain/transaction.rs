//! Transaction domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag attached to the welcome bonus credit
pub const TAG_BONUS: &str = "bonus";
/// Tag attached to approved loan credits
pub const TAG_LOAN: &str = "loan";
/// Tag attached to both legs of a transfer
pub const TAG_TRANSFER: &str = "transfer";

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single signed ledger entry
///
/// Positive amounts are credits, negative amounts are debits. Entries are
/// never edited once appended to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub kind: TransactionKind,
    pub description: String,
    /// Origin markers (bonus, loan, transfer)
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Transaction {
    /// Create a credit of `amount`
    pub fn credit(amount: Decimal, description: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            date,
            kind: TransactionKind::Deposit,
            description: description.into(),
            tags: Vec::new(),
        }
    }

    /// Create a debit of `amount` (stored negated)
    pub fn debit(amount: Decimal, description: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount: -amount,
            date,
            kind: TransactionKind::Withdrawal,
            description: description.into(),
            tags: Vec::new(),
        }
    }

    /// Attach a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_credit(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_debit(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}
