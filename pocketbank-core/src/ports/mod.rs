//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod store;

pub use store::{get_json, set_json, KeyValueStore, SESSION_KEY, USERS_KEY};
