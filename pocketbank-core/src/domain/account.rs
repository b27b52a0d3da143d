//! Account domain model - a single ledger
//!
//! The account keeps both a running `balance` and the full transaction log.
//! Every mutation goes through the ledger operations below, which keep
//! `balance == sum(transactions.amount)`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::{Error, Result};
use super::transaction::{Transaction, TransactionKind, TAG_BONUS, TAG_LOAN};

/// Kind of account opened at signup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Checking,
    Savings,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Checking => "checking",
            AccountKind::Savings => "savings",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "checking" | "cheque" => Some(AccountKind::Checking),
            "savings" => Some(AccountKind::Savings),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which transactions are listed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recent first
    #[default]
    DateDesc,
    /// Largest amount first
    AmountDesc,
}

/// Outcome of a loan request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanDecision {
    Approved,
    Declined,
}

/// Derived totals over a ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub interest: Decimal,
}

impl LedgerSummary {
    /// Combine the totals of two ledgers
    pub fn merge(self, other: LedgerSummary) -> Result<LedgerSummary> {
        Ok(LedgerSummary {
            total_deposits: checked_sum(
                self.total_deposits,
                other.total_deposits,
                "total deposits",
            )?,
            total_withdrawals: checked_sum(
                self.total_withdrawals,
                other.total_withdrawals,
                "total withdrawals",
            )?,
            interest: checked_sum(self.interest, other.interest, "interest")?,
        })
    }
}

fn checked_sum(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(|| Error::Overflow(what.to_string()))
}

/// A bank account owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub kind: AccountKind,
    pub balance: Decimal,
    pub transactions: Vec<Transaction>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Open an empty account
    pub fn new(kind: AccountKind, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            balance: Decimal::ZERO,
            transactions: Vec::new(),
            created_at: now,
        }
    }

    /// Open an account seeded with a welcome bonus credit
    pub fn with_welcome_bonus(kind: AccountKind, bonus: Decimal, now: DateTime<Utc>) -> Self {
        let mut account = Self::new(kind, now);
        if bonus > Decimal::ZERO {
            account.balance = bonus;
            account
                .transactions
                .push(Transaction::credit(bonus, "Welcome bonus", now).with_tag(TAG_BONUS));
        }
        account
    }

    /// Append `tx` once `balance` is known to be the new total
    fn append(&mut self, tx: Transaction, balance: Decimal) {
        self.balance = balance;
        self.transactions.push(tx);
    }

    /// Credit the account
    pub fn deposit(
        &mut self,
        amount: Decimal,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&Transaction> {
        self.deposit_tagged(amount, description, None, now)
    }

    pub(crate) fn deposit_tagged(
        &mut self,
        amount: Decimal,
        description: impl Into<String>,
        tag: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<&Transaction> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(Error::AmountTooLarge(amount))?;
        let mut tx = Transaction::credit(amount, description, now);
        if let Some(tag) = tag {
            tx = tx.with_tag(tag);
        }
        self.append(tx, balance);
        Ok(self.last_transaction())
    }

    /// Debit the account; refuses to overdraw
    pub fn withdraw(
        &mut self,
        amount: Decimal,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&Transaction> {
        self.withdraw_tagged(amount, description, None, now)
    }

    pub(crate) fn withdraw_tagged(
        &mut self,
        amount: Decimal,
        description: impl Into<String>,
        tag: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<&Transaction> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        if amount > self.balance {
            return Err(Error::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        // amount <= balance, so this only fails on a tampered negative balance
        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or(Error::AmountTooLarge(amount))?;
        let mut tx = Transaction::debit(amount, description, now);
        if let Some(tag) = tag {
            tx = tx.with_tag(tag);
        }
        self.append(tx, balance);
        Ok(self.last_transaction())
    }

    /// Underwrite and, if approved, credit a loan
    ///
    /// Approved only when some earlier deposit is at least `amount * ratio`.
    /// A declined request leaves the account untouched.
    pub fn request_loan(
        &mut self,
        amount: Decimal,
        ratio: Decimal,
        now: DateTime<Utc>,
    ) -> Result<LoanDecision> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        // A threshold beyond the Decimal range cannot be met by any deposit
        let qualifies = amount.checked_mul(ratio).is_some_and(|threshold| {
            self.transactions
                .iter()
                .any(|tx| tx.kind == TransactionKind::Deposit && tx.amount >= threshold)
        });
        if !qualifies {
            return Ok(LoanDecision::Declined);
        }
        self.deposit_tagged(amount, "Loan", Some(TAG_LOAN), now)?;
        Ok(LoanDecision::Approved)
    }

    /// Totals in, out, and interest earned on deposits at `interest_rate`
    ///
    /// Totals can exceed the `Decimal` range even when every balance along
    /// the way did not; that is reported as [`Error::Overflow`].
    pub fn aggregate(&self, interest_rate: Decimal) -> Result<LedgerSummary> {
        let mut total_deposits = Decimal::ZERO;
        let mut total_withdrawals = Decimal::ZERO;
        for tx in &self.transactions {
            if tx.amount > Decimal::ZERO {
                total_deposits = checked_sum(total_deposits, tx.amount, "total deposits")?;
            } else {
                total_withdrawals =
                    checked_sum(total_withdrawals, tx.amount.abs(), "total withdrawals")?;
            }
        }
        let interest = total_deposits
            .checked_mul(interest_rate)
            .ok_or_else(|| Error::Overflow("interest".to_string()))?;
        Ok(LedgerSummary {
            total_deposits,
            total_withdrawals,
            interest,
        })
    }

    /// Iterate the log in the requested order without reordering storage
    pub fn list_transactions(&self, order: SortOrder) -> Transactions<'_> {
        Transactions::new(&self.transactions, order)
    }

    /// Sum of every transaction amount; `None` if it leaves the `Decimal` range
    pub fn ledger_total(&self) -> Option<Decimal> {
        self.transactions
            .iter()
            .try_fold(Decimal::ZERO, |total, tx| total.checked_add(tx.amount))
    }

    /// Check the stored balance against the transaction history
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if Some(self.balance) != self.ledger_total() {
            return Err("balance does not match transaction history");
        }
        if self.balance < Decimal::ZERO {
            return Err("balance is negative");
        }
        Ok(())
    }

    fn last_transaction(&self) -> &Transaction {
        // append() always runs before this is called
        &self.transactions[self.transactions.len() - 1]
    }
}

/// Sorted, restartable view over an account's transactions
///
/// Cloning the iterator restarts from its current position; calling
/// [`Account::list_transactions`] again restarts from the beginning.
#[derive(Debug, Clone)]
pub struct Transactions<'a> {
    source: &'a [Transaction],
    order: Vec<usize>,
    position: usize,
}

impl<'a> Transactions<'a> {
    fn new(source: &'a [Transaction], order: SortOrder) -> Self {
        let mut indices: Vec<usize> = (0..source.len()).collect();
        match order {
            SortOrder::DateDesc => indices.sort_by(|&a, &b| source[b].date.cmp(&source[a].date)),
            SortOrder::AmountDesc => {
                indices.sort_by(|&a, &b| source[b].amount.cmp(&source[a].amount))
            }
        }
        Self {
            source,
            order: indices,
            position: 0,
        }
    }
}

impl<'a> Iterator for Transactions<'a> {
    type Item = &'a Transaction;

    fn next(&mut self) -> Option<Self::Item> {
        let index = *self.order.get(self.position)?;
        self.position += 1;
        Some(&self.source[index])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.order.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Transactions<'_> {}
