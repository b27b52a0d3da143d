//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - JSON files on disk for the KeyValueStore port
//! - An in-memory map for tests

pub mod json_file;
pub mod memory;
