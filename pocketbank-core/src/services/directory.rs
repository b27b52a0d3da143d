//! User directory - the keyed collection of every user record
//!
//! The whole record set lives under one store key. Every operation reads the
//! full set, changes it in memory, and writes it back; there is no merge, so
//! the last writer wins.

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{normalize_username, User};
use crate::ports::{get_json, set_json, KeyValueStore, USERS_KEY};

/// Directory of users backed by a key-value store
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn KeyValueStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Every user, in signup order
    pub fn list(&self) -> Result<Vec<User>> {
        Ok(get_json(self.store.as_ref(), USERS_KEY)?.unwrap_or_default())
    }

    fn save_all(&self, users: &[User]) -> Result<()> {
        set_json(self.store.as_ref(), USERS_KEY, users)
    }

    /// Run `f` over a working copy of all users
    ///
    /// The copy is written back in a single store write only if `f` returns
    /// `Ok`; on `Err` nothing is persisted.
    pub fn transact<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<User>) -> Result<T>,
    {
        let mut users = self.list()?;
        let value = f(&mut users)?;
        self.save_all(&users)?;
        Ok(value)
    }

    /// Add a new user
    pub fn create(&self, user: User) -> Result<User> {
        self.transact(|users| {
            if users.iter().any(|u| u.matches_username(&user.username)) {
                return Err(Error::DuplicateUsername(user.username.clone()));
            }
            if users.iter().any(|u| u.id_number == user.id_number) {
                return Err(Error::DuplicateIdNumber(user.id_number.clone()));
            }
            users.push(user.clone());
            Ok(user)
        })
    }

    /// Look up by username, ignoring case and surrounding whitespace
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let wanted = normalize_username(username);
        Ok(self.list()?.into_iter().find(|u| u.username == wanted))
    }

    /// Look up by national ID number
    pub fn find_by_id_number(&self, id_number: &str) -> Result<Option<User>> {
        let wanted = id_number.trim();
        Ok(self.list()?.into_iter().find(|u| u.id_number == wanted))
    }

    /// Replace the stored record with the same username
    pub fn update(&self, user: &User) -> Result<()> {
        self.transact(|users| {
            let slot = users
                .iter_mut()
                .find(|u| u.matches_username(&user.username))
                .ok_or_else(|| Error::UserNotFound(user.username.clone()))?;
            *slot = user.clone();
            Ok(())
        })
    }

    /// Remove a user; removing an unknown user is a no-op
    pub fn delete(&self, username: &str) -> Result<()> {
        let wanted = normalize_username(username);
        let mut users = self.list()?;
        let before = users.len();
        users.retain(|u| u.username != wanted);
        if users.len() != before {
            self.save_all(&users)?;
        }
        Ok(())
    }

    /// Plaintext PIN comparison
    pub fn authenticate(&self, username: &str, pin: &str) -> Result<bool> {
        Ok(self
            .find_by_username(username)?
            .is_some_and(|user| user.pin == pin))
    }
}
