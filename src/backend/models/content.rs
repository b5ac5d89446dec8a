// src/backend/models/content.rs
use crate::models::common::{Amount, BillingToken, ContentId, ContentType, CreatorId, TimestampNs};
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// A registered piece of content and its billing terms.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Content {
    pub content_id: ContentId,
    pub creator: CreatorId,
    pub billing_token: BillingToken,
    pub content_type: ContentType,
    pub rate_per_unit: Amount, // Base units per consumption unit
    pub active: bool,
    pub total_earnings: Amount,
    pub total_views: u64,
    pub metadata: String, // Free-form, e.g. "ipfs://Qm..."
    pub created_at: TimestampNs,
    pub updated_at: TimestampNs,
}

impl Content {
    pub fn is_creator(&self, caller: &CreatorId) -> bool {
        self.creator == *caller
    }
}
