//! Pocketbank Core - Business logic for a small retail bank
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Account, Transaction, User, Session)
//! - **ports**: Trait definitions for external dependencies (KeyValueStore)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (JSON files, in-memory)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::json_file::JsonFileStore;
use config::Config;
use ports::KeyValueStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    format_currency, Account, AccountKind, LoanDecision, SessionContext, SortOrder, Transaction,
    TransactionKind, User,
};
pub use domain::result::{Error, OperationResult};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for Pocketbank operations
///
/// This is the primary entry point for all business logic. It holds
/// the store, configuration, and all services.
pub struct BankContext {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub directory: UserDirectory,
    pub session_service: Arc<SessionService>,
    pub banking_service: BankingService,
    pub doctor_service: DoctorService,
}

impl BankContext {
    /// Open the bank stored in `data_dir`
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(data_dir)?);
        Ok(Self::with_store(config, store))
    }

    /// Build the services over an arbitrary store
    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        let directory = UserDirectory::new(Arc::clone(&store));
        let session_service = Arc::new(SessionService::new(
            Arc::clone(&store),
            directory.clone(),
            config.session_timeout(),
        ));
        let banking_service = BankingService::new(
            directory.clone(),
            Arc::clone(&session_service),
            config.clone(),
        );
        let doctor_service = DoctorService::new(directory.clone());

        Self {
            config,
            store,
            directory,
            session_service,
            banking_service,
            doctor_service,
        }
    }
}
