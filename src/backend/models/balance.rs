// src/backend/models/balance.rs
use crate::models::common::{Amount, TimestampNs};
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// Prepaid balance and spending state of one consumer.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct UserBalance {
    pub balance: Amount,
    pub monthly_limit: Amount,
    pub monthly_spent: Amount,
    /// Start of the spending period `monthly_spent` belongs to.
    pub period_start: TimestampNs,
    pub created_at: TimestampNs,
    pub last_activity: TimestampNs,
}

impl UserBalance {
    /// Headroom left under the monthly limit.
    pub fn remaining_allowance(&self) -> Amount {
        self.monthly_limit.saturating_sub(self.monthly_spent)
    }
}

/// Credited earnings of one creator.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct CreatorEarnings {
    pub total_earnings: Amount,
    pub pending_withdrawal: Amount,
    pub last_withdrawal: Option<TimestampNs>,
}

/// Aggregate value accounting of the vault.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct VaultTotals {
    pub total_deposited: Amount,
    pub total_withdrawn: Amount,        // Released to users
    pub total_creator_payouts: Amount,  // Released to creators
    pub total_drained: Amount,          // Released by emergency withdrawal
    pub held: Amount,                   // Value currently inside the vault
    pub micropayments_processed: u64,
    pub micropayment_volume: Amount,
}

/// Result of recomputing the conservation equation over every account.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ConservationReport {
    pub sum_user_balances: Amount,
    pub sum_pending_earnings: Amount,
    pub totals: VaultTotals,
    pub balanced: bool,
}
