// src/backend/models/payment.rs
use crate::models::common::{Amount, CreatorId, SessionId, TimestampNs, UserId};
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// What a micropayment settled. Direct payments carry a caller-chosen label.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub enum PaymentReference {
    Session(SessionId),
    Label(String),
}

/// Journal record of one committed micropayment.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MicropaymentRecord {
    pub seq: u64,
    pub payer: UserId,
    pub creator: CreatorId,
    pub amount: Amount,
    pub reference: PaymentReference,
    pub timestamp: TimestampNs,
}
