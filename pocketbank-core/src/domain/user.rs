//! User domain model

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::{Account, AccountKind, LedgerSummary};
use super::result::{Error, Result};

/// Nationality recorded when signup leaves it blank
pub const DEFAULT_NATIONALITY: &str = "South African";

/// Normalize a username for storage and lookup
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// True if `pin` is exactly four ASCII digits
pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit())
}

/// Generate a random four digit PIN (1000..=9999)
pub fn generate_pin() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}

/// First and last name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayName {
    pub first: String,
    pub last: String,
}

impl DisplayName {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into().trim().to_string(),
            last: last.into().trim().to_string(),
        }
    }

    /// Lower-cased initials, e.g. "Thandi Mokoena" -> "tm"
    pub fn initials(&self) -> String {
        self.first
            .chars()
            .next()
            .into_iter()
            .chain(self.last.chars().next())
            .collect::<String>()
            .to_lowercase()
    }

    pub fn full(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// A registered customer and their accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub display_name: DisplayName,
    pub id_number: String,
    pub date_of_birth: NaiveDate,
    pub nationality: String,
    /// Plaintext, never changes after signup
    pub pin: String,
    pub accounts: Vec<Account>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new user with a checking and a savings account, each seeded
    /// with `welcome_bonus`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        username: &str,
        display_name: DisplayName,
        id_number: impl Into<String>,
        date_of_birth: NaiveDate,
        nationality: impl Into<String>,
        pin: impl Into<String>,
        welcome_bonus: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        let nationality = nationality.into();
        let nationality = if nationality.trim().is_empty() {
            DEFAULT_NATIONALITY.to_string()
        } else {
            nationality.trim().to_string()
        };
        Self {
            username: normalize_username(username),
            display_name,
            id_number: id_number.into().trim().to_string(),
            date_of_birth,
            nationality,
            pin: pin.into(),
            accounts: vec![
                Account::with_welcome_bonus(AccountKind::Checking, welcome_bonus, now),
                Account::with_welcome_bonus(AccountKind::Savings, welcome_bonus, now),
            ],
            created_at: now,
        }
    }

    /// Case- and whitespace-insensitive username comparison
    pub fn matches_username(&self, username: &str) -> bool {
        self.username == normalize_username(username)
    }

    /// The account used for transfers and loans
    pub fn primary_account(&self) -> Option<&Account> {
        self.accounts.first()
    }

    pub fn primary_account_mut(&mut self) -> Option<&mut Account> {
        self.accounts.first_mut()
    }

    pub fn account(&self, kind: AccountKind) -> Option<&Account> {
        self.accounts.iter().find(|a| a.kind == kind)
    }

    pub fn account_mut(&mut self, kind: AccountKind) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.kind == kind)
    }

    /// Sum of all account balances
    pub fn total_balance(&self) -> Result<Decimal> {
        self.accounts
            .iter()
            .try_fold(Decimal::ZERO, |total, a| total.checked_add(a.balance))
            .ok_or_else(|| Error::Overflow("total balance".to_string()))
    }

    /// Totals over every account
    pub fn aggregate(&self, interest_rate: Decimal) -> Result<LedgerSummary> {
        self.accounts
            .iter()
            .try_fold(LedgerSummary::default(), |total, a| {
                total.merge(a.aggregate(interest_rate)?)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(
            " Bob ",
            DisplayName::new("Bob", "Builder"),
            "8001015009087",
            NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            "",
            "1234",
            Decimal::from(50),
            Utc::now(),
        )
    }

    #[test]
    fn test_user_creation() {
        let user = sample_user();
        assert_eq!(user.username, "bob");
        assert_eq!(user.nationality, DEFAULT_NATIONALITY);
        assert_eq!(user.accounts.len(), 2);
        assert_eq!(user.primary_account().unwrap().kind, AccountKind::Checking);
        assert_eq!(user.total_balance().unwrap(), Decimal::from(100));
    }

    #[test]
    fn test_username_matching() {
        let user = sample_user();
        assert!(user.matches_username(" BOB "));
        assert!(!user.matches_username("bobby"));
    }

    #[test]
    fn test_initials() {
        assert_eq!(DisplayName::new("Thandi", "Mokoena").initials(), "tm");
        assert_eq!(DisplayName::new("", "Mokoena").initials(), "m");
    }

    #[test]
    fn test_generated_pin_is_valid() {
        for _ in 0..100 {
            let pin = generate_pin();
            assert!(is_valid_pin(&pin), "bad pin {}", pin);
        }
        assert!(!is_valid_pin("123"));
        assert!(!is_valid_pin("12a4"));
    }

    #[test]
    fn test_aggregate_over_accounts() {
        let user = sample_user();
        let summary = user.aggregate(Decimal::new(1, 2)).unwrap();
        assert_eq!(summary.total_deposits, Decimal::from(100));
        assert_eq!(summary.interest, Decimal::from(1));
    }
}
