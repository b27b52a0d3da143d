//! Doctor service - integrity checks over the stored records
//!
//! The store is plain JSON that anyone can edit, so these checks re-derive
//! what the ledger rules guarantee and report anything that disagrees.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use crate::domain::is_valid_pin;
use crate::domain::result::Result;

use super::directory::UserDirectory;
use super::session::SessionService;

/// Doctor service for health checks
pub struct DoctorService {
    directory: UserDirectory,
}

impl DoctorService {
    pub fn new(directory: UserDirectory) -> Self {
        Self { directory }
    }

    /// Run all health checks
    pub fn run_checks(&self, sessions: &SessionService) -> Result<DoctorResult> {
        let users = self.directory.list()?;
        let mut checks = BTreeMap::new();

        // Balance must equal the sum of the transaction log
        let mut mismatched = Vec::new();
        let mut negative = Vec::new();
        for user in &users {
            for account in &user.accounts {
                if Some(account.balance) != account.ledger_total() {
                    mismatched.push(json!({
                        "username": user.username,
                        "account": account.kind.as_str(),
                    }));
                }
                if account.balance < Decimal::ZERO {
                    negative.push(json!({
                        "username": user.username,
                        "account": account.kind.as_str(),
                    }));
                }
            }
        }
        checks.insert(
            "balance_consistency".to_string(),
            CheckResult::from_findings(
                "error",
                mismatched,
                "All balances match their transaction history",
                |n| format!("{} account(s) have a balance that disagrees with their history", n),
            ),
        );
        checks.insert(
            "negative_balances".to_string(),
            CheckResult::from_findings(
                "error",
                negative,
                "No overdrawn accounts",
                |n| format!("{} account(s) are overdrawn", n),
            ),
        );

        // Usernames must be unique after normalization
        let mut seen: HashMap<String, usize> = HashMap::new();
        for user in &users {
            *seen.entry(user.username.trim().to_lowercase()).or_default() += 1;
        }
        let duplicates: Vec<serde_json::Value> = seen
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(name, count)| json!({"username": name, "count": count}))
            .collect();
        checks.insert(
            "duplicate_usernames".to_string(),
            CheckResult::from_findings(
                "error",
                duplicates,
                "All usernames are unique",
                |n| format!("{} username(s) are used by more than one record", n),
            ),
        );

        // Report who has a malformed PIN, never the PIN itself
        let bad_pins: Vec<serde_json::Value> = users
            .iter()
            .filter(|u| !is_valid_pin(&u.pin))
            .map(|u| json!({"username": u.username}))
            .collect();
        checks.insert(
            "pin_format".to_string(),
            CheckResult::from_findings(
                "warning",
                bad_pins,
                "All PINs are four digits",
                |n| format!("{} user(s) have a malformed PIN", n),
            ),
        );

        // Session pointing at a user that no longer exists
        let stale: Vec<serde_json::Value> = match sessions.current_username()? {
            Some(name) if !users.iter().any(|u| u.matches_username(&name)) => {
                vec![json!({"username": name})]
            }
            _ => Vec::new(),
        };
        checks.insert(
            "stale_session".to_string(),
            CheckResult::from_findings(
                "warning",
                stale,
                "Session is valid or absent",
                |_| "Session belongs to a user that no longer exists".to_string(),
            ),
        );

        let passed = checks.values().filter(|c| c.status == "pass").count() as i64;
        let warnings = checks.values().filter(|c| c.status == "warning").count() as i64;
        let errors = checks.values().filter(|c| c.status == "error").count() as i64;

        Ok(DoctorResult {
            checks,
            summary: DoctorSummary {
                passed,
                warnings,
                errors,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn from_findings(
        severity: &str,
        findings: Vec<serde_json::Value>,
        ok_message: &str,
        fail_message: impl Fn(usize) -> String,
    ) -> Self {
        if findings.is_empty() {
            Self {
                status: "pass".to_string(),
                message: ok_message.to_string(),
                details: None,
            }
        } else {
            Self {
                status: severity.to_string(),
                message: fail_message(findings.len()),
                details: Some(findings),
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::{DisplayName, User};
    use crate::ports::{set_json, KeyValueStore, SESSION_KEY};
    use chrono::{Duration, NaiveDate, Utc};
    use std::sync::Arc;

    fn user(username: &str, id: &str) -> User {
        User::new(
            username,
            DisplayName::new("Test", "User"),
            id,
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            "",
            "1234",
            Decimal::from(50),
            Utc::now(),
        )
    }

    #[test]
    fn test_clean_directory_passes() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let directory = UserDirectory::new(Arc::clone(&store));
        directory.create(user("bob", "1")).unwrap();
        let sessions = SessionService::new(store, directory.clone(), Duration::minutes(10));

        let result = DoctorService::new(directory).run_checks(&sessions).unwrap();
        assert_eq!(result.summary.errors, 0);
        assert_eq!(result.summary.warnings, 0);
        assert_eq!(result.summary.passed, 5);
    }

    #[test]
    fn test_detects_tampering() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut bob = user("bob", "1");
        bob.accounts[0].balance = Decimal::from(1_000_000);
        bob.pin = "12".to_string();
        // Written directly, bypassing the directory's uniqueness check
        set_json(store.as_ref(), "users", &vec![bob, user("BOB", "2")]).unwrap();
        set_json(
            store.as_ref(),
            SESSION_KEY,
            &json!({"username": "ghost", "expiresAt": Utc::now()}),
        )
        .unwrap();

        let directory = UserDirectory::new(Arc::clone(&store));
        let sessions = SessionService::new(store, directory.clone(), Duration::minutes(10));
        let result = DoctorService::new(directory).run_checks(&sessions).unwrap();

        assert_eq!(result.checks["balance_consistency"].status, "error");
        assert_eq!(result.checks["duplicate_usernames"].status, "error");
        assert_eq!(result.checks["pin_format"].status, "warning");
        assert_eq!(result.checks["stale_session"].status, "warning");
        assert_eq!(result.checks["negative_balances"].status, "pass");
    }
}
