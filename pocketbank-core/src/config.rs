//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "bank": { "interestRate": "0.012", "welcomeBonus": "50", ... }
//! }
//! ```
//! Fields the CLI does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const SETTINGS_FILENAME: &str = "settings.json";

/// Longest idle timeout accepted, one day
pub const MAX_SESSION_TIMEOUT_SECS: i64 = 24 * 60 * 60;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    bank: BankSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interest_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    welcome_bonus: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    loan_deposit_ratio: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_timeout_secs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency_symbol: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Bank configuration (resolved view of settings)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Interest paid on total deposits (0.012 = 1.2%)
    pub interest_rate: Decimal,
    /// Credit seeded into each new account
    pub welcome_bonus: Decimal,
    /// A loan needs an earlier deposit of at least `amount * loan_deposit_ratio`
    pub loan_deposit_ratio: Decimal,
    /// Idle time before a session is logged out
    pub session_timeout_secs: i64,
    pub currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interest_rate: Decimal::new(12, 3),
            welcome_bonus: Decimal::from(50),
            loan_deposit_ratio: Decimal::new(10, 2),
            session_timeout_secs: 10 * 60,
            currency_symbol: "R".to_string(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Interest rate and session timeout can be overridden with the
    /// POCKETBANK_INTEREST_RATE and POCKETBANK_SESSION_TIMEOUT_SECS
    /// environment variables (for CI/testing).
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;
        let defaults = Config::default();

        let mut config = Config {
            interest_rate: raw.bank.interest_rate.unwrap_or(defaults.interest_rate),
            welcome_bonus: raw.bank.welcome_bonus.unwrap_or(defaults.welcome_bonus),
            loan_deposit_ratio: raw
                .bank
                .loan_deposit_ratio
                .unwrap_or(defaults.loan_deposit_ratio),
            session_timeout_secs: raw
                .bank
                .session_timeout_secs
                .unwrap_or(defaults.session_timeout_secs),
            currency_symbol: raw
                .bank
                .currency_symbol
                .clone()
                .unwrap_or(defaults.currency_symbol),
        };

        if let Ok(rate) = std::env::var("POCKETBANK_INTEREST_RATE") {
            config.interest_rate = rate
                .trim()
                .parse()
                .with_context(|| format!("Invalid POCKETBANK_INTEREST_RATE: {}", rate))?;
        }
        if let Ok(secs) = std::env::var("POCKETBANK_SESSION_TIMEOUT_SECS") {
            config.session_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid POCKETBANK_SESSION_TIMEOUT_SECS: {}", secs))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Save config to the data directory, keeping unmanaged settings intact
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;

        settings.bank.interest_rate = Some(self.interest_rate);
        settings.bank.welcome_bonus = Some(self.welcome_bonus);
        settings.bank.loan_deposit_ratio = Some(self.loan_deposit_ratio);
        settings.bank.session_timeout_secs = Some(self.session_timeout_secs);
        settings.bank.currency_symbol = Some(self.currency_symbol.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILENAME), content)?;
        Ok(())
    }

    /// Idle timeout, clamped to `1..=MAX_SESSION_TIMEOUT_SECS` seconds
    pub fn session_timeout(&self) -> Duration {
        let secs = self.session_timeout_secs.clamp(1, MAX_SESSION_TIMEOUT_SECS);
        Duration::try_seconds(secs).unwrap_or_else(|| Duration::minutes(10))
    }

    fn validate(&self) -> Result<()> {
        if self.interest_rate < Decimal::ZERO {
            anyhow::bail!("interestRate cannot be negative");
        }
        if self.welcome_bonus < Decimal::ZERO {
            anyhow::bail!("welcomeBonus cannot be negative");
        }
        if self.loan_deposit_ratio < Decimal::ZERO {
            anyhow::bail!("loanDepositRatio cannot be negative");
        }
        if self.session_timeout_secs <= 0 {
            anyhow::bail!("sessionTimeoutSecs must be positive");
        }
        if self.session_timeout_secs > MAX_SESSION_TIMEOUT_SECS {
            anyhow::bail!(
                "sessionTimeoutSecs cannot exceed {} (one day)",
                MAX_SESSION_TIMEOUT_SECS
            );
        }
        Ok(())
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILENAME);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {:?}", settings_path))?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.welcome_bonus, Decimal::from(50));
        assert_eq!(config.loan_deposit_ratio, Decimal::new(1, 1));
        assert_eq!(config.session_timeout(), Duration::minutes(10));
        assert_eq!(config.currency_symbol, "R");
    }

    #[test]
    fn test_reads_bank_section() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"bank": {"welcomeBonus": "100", "currencySymbol": "$"}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.welcome_bonus, Decimal::from(100));
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.loan_deposit_ratio, Decimal::new(10, 2));
    }

    #[test]
    fn test_save_preserves_unmanaged_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"theme": "dark", "bank": {"nickname": "mine"}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.welcome_bonus = Decimal::from(75);
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["bank"]["nickname"], "mine");
        assert_eq!(value["bank"]["welcomeBonus"], "75");
    }

    #[test]
    fn test_rejects_non_positive_timeout() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"bank": {"sessionTimeoutSecs": 0}}"#,
        )
        .unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_rejects_timeout_beyond_one_day() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"bank": {"sessionTimeoutSecs": 9223372036854775807}}"#,
        )
        .unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("sessionTimeoutSecs"));

        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"bank": {"sessionTimeoutSecs": 86400}}"#,
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.session_timeout(), Duration::days(1));
    }

    #[test]
    fn test_session_timeout_is_clamped() {
        let config = Config {
            session_timeout_secs: i64::MAX,
            ..Config::default()
        };
        assert_eq!(
            config.session_timeout(),
            Duration::seconds(MAX_SESSION_TIMEOUT_SECS)
        );
    }
}
