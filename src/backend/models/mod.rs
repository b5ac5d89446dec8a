pub mod audit_log;
pub mod balance;
pub mod common;
pub mod content;
pub mod init;
pub mod payment;
pub mod session;

// Re-export common types/enums for easier access
pub use balance::{ConservationReport, CreatorEarnings, UserBalance, VaultTotals};
pub use common::*;
pub use content::Content;
pub use init::{InitArgs, LedgerConfig, LedgerSettings, SpendingPeriod};
pub use payment::{MicropaymentRecord, PaymentReference};
pub use session::{ConsumptionConfig, Session, SessionStats, SessionStatus};
