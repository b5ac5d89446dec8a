// src/backend/services/audit_service.rs
use crate::models::audit_log::{AuditLogEntry, LogAction};
use crate::models::common::TimestampNs;
use crate::storage::audit_logs;
use crate::utils::guards::expect_committed;
use candid::Principal;

/// Appends an audit entry for a transition that has already been written.
/// The trail must never miss a committed mutation, so a failed append aborts
/// the message.
pub fn record(
    actor: Principal,
    action: LogAction,
    subject: impl Into<String>,
    details: Option<String>,
    now: TimestampNs,
) {
    let entry = AuditLogEntry {
        seq: 0, // Assigned by the log
        timestamp: now,
        actor,
        action,
        subject: subject.into(),
        details,
    };
    expect_committed(audit_logs::add_entry(entry), "Audit append");
}

/// Returns (page, total entries).
pub fn list_entries(offset: u64, limit: usize) -> (Vec<AuditLogEntry>, u64) {
    (audit_logs::get_entries(offset, limit), audit_logs::entry_count())
}

pub fn entries_for_subject(subject: &str) -> Vec<AuditLogEntry> {
    audit_logs::get_entries_for_subject(subject)
}
