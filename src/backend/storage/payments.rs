use crate::error::LedgerError;
use crate::models::common::UserId;
use crate::models::MicropaymentRecord;
use crate::storage::memory::{
    get_payment_log_data_memory, get_payment_log_index_memory, get_payment_payer_idx_memory, Memory,
};
use crate::storage::storable::{Cbor, OwnerSeqKey};
use ic_stable_structures::{StableBTreeMap, StableLog};
use std::cell::RefCell;

type StorableMicropayment = Cbor<MicropaymentRecord>;

thread_local! {
    /// Payment Journal: Append-only log of committed micropayments.
    static PAYMENT_LOG: RefCell<StableLog<StorableMicropayment, Memory, Memory>> = RefCell::new(
        StableLog::init(get_payment_log_index_memory(), get_payment_log_data_memory())
            .expect("Failed to initialize payment log")
    );

    /// (payer, log position) -> log position
    static PAYER_INDEX: RefCell<StableBTreeMap<OwnerSeqKey, u64, Memory>> = RefCell::new(
        StableBTreeMap::init(get_payment_payer_idx_memory())
    );
}

/// Position the next appended record will receive.
pub fn next_payment_seq() -> u64 {
    PAYMENT_LOG.with(|log| log.borrow().len())
}

/// Appends a record to the journal and indexes it by payer.
pub fn append_payment(record: MicropaymentRecord) -> Result<u64, LedgerError> {
    let payer = record.payer;
    let seq = PAYMENT_LOG.with(|log| {
        log.borrow_mut()
            .append(&Cbor(record))
            .map_err(|e| LedgerError::StorageError(format!("Failed to append micropayment: {:?}", e)))
    })?;
    PAYER_INDEX.with(|index_ref| {
        index_ref.borrow_mut().insert(OwnerSeqKey::new(payer, seq), seq);
    });
    Ok(seq)
}

pub fn payment_count() -> u64 {
    PAYMENT_LOG.with(|log| log.borrow().len())
}

/// A page of the journal, oldest first.
pub fn list_payments(offset: u64, limit: usize) -> Vec<MicropaymentRecord> {
    PAYMENT_LOG.with(|log| {
        let log = log.borrow();
        (offset..log.len())
            .take(limit)
            .filter_map(|idx| log.get(idx).map(|entry| entry.0))
            .collect()
    })
}

pub fn get_payer_payments(payer: &UserId) -> Vec<MicropaymentRecord> {
    let positions: Vec<u64> = PAYER_INDEX.with(|index_ref| {
        index_ref
            .borrow()
            .range(OwnerSeqKey::owner_range(*payer))
            .map(|(_key, seq)| seq)
            .collect()
    });
    PAYMENT_LOG.with(|log| {
        let log = log.borrow();
        positions
            .into_iter()
            .filter_map(|idx| log.get(idx).map(|entry| entry.0))
            .collect()
    })
}
