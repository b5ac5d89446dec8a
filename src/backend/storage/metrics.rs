use crate::error::LedgerError;
use crate::metrics::LedgerMetrics;
use crate::storage::memory::{get_metrics_memory, Memory};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableCell;
use std::cell::RefCell;

type StorableLedgerMetrics = Cbor<LedgerMetrics>;

thread_local! {
    /// Global ledger counters, including the vault's value totals.
    pub static METRICS_CELL: RefCell<StableCell<StorableLedgerMetrics, Memory>> = RefCell::new(
        StableCell::init(get_metrics_memory(), Cbor(LedgerMetrics::default()))
            .expect("Failed to initialize metrics stable cell")
    );
}

pub fn get_metrics() -> LedgerMetrics {
    METRICS_CELL.with(|cell| cell.borrow().get().0.clone())
}

/// Applies `update_fn` to a copy of the metrics and writes the copy back
/// only if the closure succeeds.
pub fn update_metrics<F>(update_fn: F) -> Result<(), LedgerError>
where
    F: FnOnce(&mut LedgerMetrics) -> Result<(), LedgerError>,
{
    METRICS_CELL.with(|cell| {
        let mut metrics = cell.borrow().get().0.clone();
        update_fn(&mut metrics)?;
        cell.borrow_mut()
            .set(Cbor(metrics))
            .map_err(|e| LedgerError::StorageError(format!("Failed to update metrics: {:?}", e)))?;
        Ok(())
    })
}
