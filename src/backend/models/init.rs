use crate::models::common::{Amount, UNIT};
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(CandidType, Deserialize, Debug)]
pub struct InitArgs {
    pub admin: Principal,
    pub settings: Option<LedgerSettings>,
}

/// Boundary at which `monthly_spent` resets.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum SpendingPeriod {
    /// Resets at 00:00 UTC on the first day of each month.
    CalendarMonth,
    /// Resets `seconds` after the period opened.
    Rolling { seconds: u64 },
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct LedgerSettings {
    pub min_rate_per_unit: Amount,
    pub min_payment: Amount,
    pub max_monthly_limit: Amount,
    pub default_monthly_limit: Amount,
    pub min_update_interval_secs: u64,
    pub spending_period: SpendingPeriod,
    pub max_metadata_len: u32,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            min_rate_per_unit: UNIT / 1000, // 0.001
            min_payment: UNIT / 1000,       // 0.001
            max_monthly_limit: 100 * UNIT,
            default_monthly_limit: 10 * UNIT,
            min_update_interval_secs: 1,
            spending_period: SpendingPeriod::Rolling { seconds: 30 * SECONDS_PER_DAY },
            max_metadata_len: 1024,
        }
    }
}

/// Admin identity and settings persisted in stable memory.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    pub admin: Principal,
    pub settings: LedgerSettings,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            admin: Principal::anonymous(),
            settings: LedgerSettings::default(),
        }
    }
}
