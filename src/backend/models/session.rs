// src/backend/models/session.rs
use crate::models::common::{Amount, Consumption, ContentId, SessionId, TimestampNs, UserId};
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// Lifecycle of a metered session. `Ended` is terminal.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum SessionStatus {
    Active,
    Ended,
    ForceEnded, // Terminated by an administrator
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub session_id: SessionId,
    pub user: UserId,
    pub content_id: ContentId,
    /// Rate captured at start; bills the whole session.
    pub rate_per_unit: Amount,
    pub status: SessionStatus,
    pub start_time: TimestampNs,
    pub last_update: TimestampNs,
    pub total_consumption: Consumption,
    pub total_paid: Amount,
    pub ended_at: Option<TimestampNs>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// consumption x rate, or None on overflow.
    pub fn amount_accrued(&self) -> Option<Amount> {
        self.total_consumption.checked_mul(self.rate_per_unit)
    }

    /// Owed but not yet settled; never negative.
    pub fn outstanding(&self) -> Option<Amount> {
        Some(self.amount_accrued()?.saturating_sub(self.total_paid))
    }
}

/// Per-content billing override set by the creator or an administrator.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ConsumptionConfig {
    pub rate_per_unit: Amount,
    pub update_interval_secs: u64,
    pub min_payment: Amount,
    pub enabled: bool,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub total_sessions: u64,
    pub active_sessions: u64,
    pub total_micropayments_processed: u64,
    pub total_amount_settled: Amount,
}
