//! Store port - flat key-value storage of JSON blobs

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::result::Result;

/// Key holding the JSON array of every user record
pub const USERS_KEY: &str = "users";

/// Key holding the current session, absent when logged out
pub const SESSION_KEY: &str = "loggedUser";

/// Synchronous key-value storage
///
/// Each `set` replaces the whole value for a key in one step; adapters must
/// never leave a half-written value behind.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value for `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value for `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and decode a JSON value
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
pub fn set_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
