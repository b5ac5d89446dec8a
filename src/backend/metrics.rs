// src/backend/metrics.rs
use crate::error::LedgerError;
use crate::models::balance::VaultTotals;
use crate::models::common::Amount;
use crate::storage::{get_metrics, update_metrics};
use candid::{CandidType, Deserialize};
use serde::Serialize;

/// Counters across the three ledgers, persisted in one stable cell.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerMetrics {
    pub vault: VaultTotals,
    pub contents_registered: u64,
    pub contents_deactivated: u64,
    pub sessions_started: u64,
    pub sessions_active: u64,
    pub session_settlements: u64,
    pub session_amount_settled: Amount,
}

// --- Metrics Update Helpers ---

pub fn record_content_registered() -> Result<(), LedgerError> {
    update_metrics(|metrics| {
        metrics.contents_registered = metrics.contents_registered.saturating_add(1);
        Ok(())
    })
}

pub fn record_content_deactivated() -> Result<(), LedgerError> {
    update_metrics(|metrics| {
        metrics.contents_deactivated = metrics.contents_deactivated.saturating_add(1);
        Ok(())
    })
}

pub fn record_session_started() -> Result<(), LedgerError> {
    update_metrics(|metrics| {
        metrics.sessions_started = metrics.sessions_started.saturating_add(1);
        metrics.sessions_active = metrics.sessions_active.saturating_add(1);
        Ok(())
    })
}

pub fn record_sessions_ended(count: u64) -> Result<(), LedgerError> {
    update_metrics(|metrics| {
        metrics.sessions_active = metrics.sessions_active.saturating_sub(count);
        Ok(())
    })
}

pub fn record_session_settlement(amount: Amount) -> Result<(), LedgerError> {
    update_metrics(|metrics| {
        metrics.session_settlements = metrics.session_settlements.saturating_add(1);
        metrics.session_amount_settled = metrics
            .session_amount_settled
            .checked_add(amount)
            .ok_or_else(|| LedgerError::overflow("Settled amount"))?;
        Ok(())
    })
}

/// Vault value totals.
pub fn vault_totals() -> VaultTotals {
    get_metrics().vault
}

/// Applies a change to the vault totals, all-or-nothing.
pub fn update_vault_totals<F>(update_fn: F) -> Result<(), LedgerError>
where
    F: FnOnce(&mut VaultTotals) -> Result<(), LedgerError>,
{
    update_metrics(|metrics| update_fn(&mut metrics.vault))
}

// Public function to get current metrics (potentially useful for API layer)
pub fn get_ledger_metrics() -> LedgerMetrics {
    get_metrics()
}
