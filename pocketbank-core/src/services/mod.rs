//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod banking;
mod directory;
mod doctor;
pub mod logging;
mod session;

pub use banking::{
    AccountView, BankingService, Dashboard, LoanOutcome, MovementView, SignupRequest,
    SummaryView, TransferReceipt,
};
pub use directory::UserDirectory;
pub use doctor::{CheckResult, DoctorResult, DoctorService, DoctorSummary};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use session::SessionService;
