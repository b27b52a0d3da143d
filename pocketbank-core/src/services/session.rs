//! Session service - login, logout, and the idle timeout

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::result::{Error, Result};
use crate::domain::{SessionContext, SessionRecord, SessionTimer};
use crate::ports::{get_json, set_json, KeyValueStore, SESSION_KEY};

use super::directory::UserDirectory;

/// Session service backed by the `loggedUser` key
pub struct SessionService {
    store: Arc<dyn KeyValueStore>,
    directory: UserDirectory,
    timeout: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn KeyValueStore>, directory: UserDirectory, timeout: Duration) -> Self {
        Self {
            store,
            directory,
            timeout,
        }
    }

    /// Check credentials and open a session with a fresh countdown
    pub fn login(&self, username: &str, pin: &str, now: DateTime<Utc>) -> Result<SessionContext> {
        if !self.directory.authenticate(username, pin)? {
            return Err(Error::AuthenticationFailed);
        }
        let user = self
            .directory
            .find_by_username(username)?
            .ok_or_else(|| Error::UserNotFound(username.trim().to_string()))?;

        let mut timer = SessionTimer::new(self.timeout);
        timer.start(now);
        let ctx = SessionContext::new(user.username, timer);
        self.persist(&ctx)?;
        Ok(ctx)
    }

    /// Pick up the stored session
    ///
    /// An expired session is cleared and reported as `SessionExpired`.
    pub fn resume(&self, now: DateTime<Utc>) -> Result<SessionContext> {
        let record: SessionRecord =
            get_json(self.store.as_ref(), SESSION_KEY)?.ok_or(Error::NotLoggedIn)?;

        let ctx = SessionContext::new(
            record.username,
            SessionTimer::running_until(self.timeout, record.expires_at),
        );
        if ctx.timer.is_expired(now) {
            self.logout()?;
            return Err(Error::SessionExpired);
        }
        Ok(ctx)
    }

    /// Reset the countdown to its full duration after an authenticated action
    pub fn touch(&self, ctx: &mut SessionContext, now: DateTime<Utc>) -> Result<()> {
        if ctx.timer.is_expired(now) {
            self.logout()?;
            return Err(Error::SessionExpired);
        }
        ctx.timer.reset(now);
        self.persist(ctx)
    }

    /// End the session; safe to call when nobody is logged in
    pub fn logout(&self) -> Result<()> {
        self.store.remove(SESSION_KEY)
    }

    /// Username of the stored session, expired or not
    pub fn current_username(&self) -> Result<Option<String>> {
        let record: Option<SessionRecord> = get_json(self.store.as_ref(), SESSION_KEY)?;
        Ok(record.map(|r| r.username))
    }

    fn persist(&self, ctx: &SessionContext) -> Result<()> {
        match ctx.to_record() {
            Some(record) => set_json(self.store.as_ref(), SESSION_KEY, &record),
            None => self.logout(),
        }
    }
}
