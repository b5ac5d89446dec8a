use crate::models::common::TimestampNs;
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};

/// Represents a single entry in the ledger audit trail.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// Position in the log.
    pub seq: u64,
    /// Nanoseconds since epoch.
    pub timestamp: TimestampNs,
    /// Principal ID of the actor performing the action.
    pub actor: Principal,
    /// The specific action performed.
    pub action: LogAction,
    /// Entity the action applies to (content id, session id or account).
    pub subject: String,
    /// Optional details about the action (e.g., amounts, new rate).
    pub details: Option<String>,
}

/// Enum representing the different types of actions that can be logged.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum LogAction {
    ContentRegistered,
    ContentRateUpdated,
    ContentDeactivated,
    ContentEarningsCredited,
    ContentViewed,
    Deposit,
    Withdrawal,
    MonthlyLimitSet,
    Micropayment,
    CreatorWithdrawal,
    EmergencyDrain,
    SessionStarted,
    SessionUpdated,
    SessionSettled,
    SessionEnded,
    SessionForceEnded,
    ConsumptionConfigSet,
    SettingsUpdated,
}
