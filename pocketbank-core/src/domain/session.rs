//! Session domain model
//!
//! A session is an explicit value owned by whoever drives the banking
//! operations. The idle countdown is modelled as a deadline: scheduling,
//! cancelling and rescheduling only move that deadline, so a reset can never
//! leave two countdowns running.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Cancellable idle countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimer {
    duration: Duration,
    deadline: Option<DateTime<Utc>>,
}

impl SessionTimer {
    /// A timer that is not yet running
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }

    /// A timer already running until `deadline`
    pub fn running_until(duration: Duration, deadline: DateTime<Utc>) -> Self {
        Self {
            duration,
            deadline: Some(deadline),
        }
    }

    /// Start the countdown at full duration
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.reset(now);
    }

    /// Cancel any running countdown and schedule a fresh one
    ///
    /// A deadline past the representable range saturates at `MAX_UTC`.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        let deadline = now
            .checked_add_signed(self.duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.deadline = Some(deadline);
    }

    /// Stop the countdown
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time left, clamped at zero. A cancelled timer has no time left.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.deadline {
            Some(deadline) if deadline > now => deadline - now,
            _ => Duration::zero(),
        }
    }

    /// True once a running countdown has reached zero
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Remaining time as `mm:ss`
    pub fn display(&self, now: DateTime<Utc>) -> String {
        let secs = self.remaining(now).num_seconds();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

/// The authenticated user plus their idle countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub username: String,
    pub timer: SessionTimer,
}

impl SessionContext {
    pub fn new(username: impl Into<String>, timer: SessionTimer) -> Self {
        Self {
            username: username.into(),
            timer,
        }
    }

    pub fn to_record(&self) -> Option<SessionRecord> {
        self.timer.deadline().map(|expires_at| SessionRecord {
            username: self.username.clone(),
            expires_at,
        })
    }
}

/// Persisted form of a session (the `loggedUser` key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_display() {
        let now = Utc::now();
        let mut timer = SessionTimer::new(Duration::minutes(10));
        timer.start(now);

        assert_eq!(timer.display(now), "10:00");
        assert_eq!(timer.display(now + Duration::seconds(61)), "08:59");
        assert_eq!(timer.display(now + Duration::minutes(11)), "00:00");
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let mut timer = SessionTimer::new(Duration::seconds(30));
        assert!(!timer.is_expired(now));

        timer.start(now);
        assert!(!timer.is_expired(now + Duration::seconds(29)));
        assert!(timer.is_expired(now + Duration::seconds(30)));
    }

    #[test]
    fn test_reset_reschedules_to_full_duration() {
        let now = Utc::now();
        let mut timer = SessionTimer::new(Duration::seconds(30));
        timer.start(now);

        let later = now + Duration::seconds(20);
        timer.reset(later);
        assert_eq!(timer.remaining(later), Duration::seconds(30));
        assert!(!timer.is_expired(now + Duration::seconds(45)));
    }

    #[test]
    fn test_cancel() {
        let now = Utc::now();
        let mut timer = SessionTimer::new(Duration::seconds(30));
        timer.start(now);
        timer.cancel();

        assert!(!timer.is_running());
        assert!(!timer.is_expired(now + Duration::hours(1)));
        assert_eq!(timer.remaining(now), Duration::zero());
    }

    #[test]
    fn test_reset_saturates_far_deadline() {
        let now = Utc::now();
        let mut timer = SessionTimer::new(Duration::days(100_000_000));
        timer.start(now);

        assert_eq!(timer.deadline(), Some(DateTime::<Utc>::MAX_UTC));
        assert!(!timer.is_expired(now + Duration::days(365)));
    }
}
