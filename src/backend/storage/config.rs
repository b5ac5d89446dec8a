// src/backend/storage/config.rs
use crate::error::LedgerError;
use crate::models::init::{LedgerConfig, LedgerSettings};
use crate::storage::memory::{get_config_memory, Memory};
use crate::storage::storable::Cbor;
use candid::Principal;
use ic_stable_structures::StableCell;
use std::cell::RefCell;

thread_local! {
    /// Stable cell for the admin principal and ledger settings.
    static CONFIG: RefCell<StableCell<Cbor<LedgerConfig>, Memory>> = RefCell::new(
        StableCell::init(get_config_memory(), Cbor(LedgerConfig::default()))
            .expect("Failed to initialize ledger config stable cell")
    );
}

/// Initialize the configuration values from InitArgs.
/// Should be called only during canister initialization or upgrade.
pub fn init_config(admin: Principal, settings: LedgerSettings) -> Result<(), LedgerError> {
    set_config(LedgerConfig { admin, settings })
}

fn set_config(config: LedgerConfig) -> Result<(), LedgerError> {
    CONFIG.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(config))
            .map(|_previous| ())
            .map_err(|e| LedgerError::StorageError(format!("Failed to set ledger config: {:?}", e)))
    })
}

pub fn get_config() -> LedgerConfig {
    CONFIG.with(|cell| cell.borrow().get().0.clone())
}

/// Get the configured admin principal.
pub fn get_admin_principal() -> Principal {
    CONFIG.with(|cell| cell.borrow().get().0.admin)
}

pub fn get_settings() -> LedgerSettings {
    CONFIG.with(|cell| cell.borrow().get().0.settings.clone())
}

pub fn set_settings(settings: LedgerSettings) -> Result<(), LedgerError> {
    let mut config = get_config();
    config.settings = settings;
    set_config(config)
}
