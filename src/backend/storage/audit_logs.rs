use crate::error::LedgerError;
use crate::models::audit_log::AuditLogEntry;
use crate::storage::memory::{get_audit_log_data_memory, get_audit_log_index_memory, Memory};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableLog;
use std::cell::RefCell;

type StorableAuditLogEntry = Cbor<AuditLogEntry>;

thread_local! {
    /// Audit Log: append-only trail of every committed state transition.
    static LOGS: RefCell<StableLog<StorableAuditLogEntry, Memory, Memory>> = RefCell::new(
        StableLog::init(get_audit_log_index_memory(), get_audit_log_data_memory())
            .expect("Failed to initialize audit log")
    );
}

/// Appends an entry, stamping it with its log position.
pub fn add_entry(mut entry: AuditLogEntry) -> Result<u64, LedgerError> {
    LOGS.with(|log| {
        let mut log = log.borrow_mut();
        entry.seq = log.len();
        log.append(&Cbor(entry))
            .map_err(|e| LedgerError::StorageError(format!("Failed to append audit entry: {:?}", e)))
    })
}

pub fn entry_count() -> u64 {
    LOGS.with(|log| log.borrow().len())
}

/// A page of the audit trail, oldest first.
pub fn get_entries(offset: u64, limit: usize) -> Vec<AuditLogEntry> {
    LOGS.with(|log| {
        let log = log.borrow();
        (offset..log.len())
            .take(limit)
            .filter_map(|idx| log.get(idx).map(|entry| entry.0))
            .collect()
    })
}

/// Entries whose subject matches, oldest first. Scans the whole log.
pub fn get_entries_for_subject(subject: &str) -> Vec<AuditLogEntry> {
    LOGS.with(|log| {
        log.borrow()
            .iter()
            .map(|entry| entry.0)
            .filter(|entry| entry.subject == subject)
            .collect()
    })
}
