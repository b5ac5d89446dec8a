// src/backend/lib.rs

pub mod adapter;
pub mod api;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

// Types named in endpoint signatures, in scope for the candid export.
use crate::api::*;
use crate::error::LedgerError;
use crate::metrics::LedgerMetrics;
use crate::models::audit_log::AuditLogEntry;
use crate::models::*;
use crate::services::config_service;

#[ic_cdk::init]
fn init(args: InitArgs) {
    if let Err(e) = config_service::install(args.admin, args.settings) {
        ic_cdk::trap(&format!("Invalid init arguments: {}", e));
    }
    crate::log_info!("lifecycle", "Micropayment ledger canister initialized.");
}

#[ic_cdk::post_upgrade]
fn post_upgrade(args: Option<InitArgs>) {
    let (admin, settings) = match args {
        Some(args) => (Some(args.admin), args.settings),
        None => (None, None),
    };
    if let Err(e) = config_service::reinstall(admin, settings) {
        ic_cdk::trap(&format!("Invalid upgrade arguments: {}", e));
    }
    crate::log_info!("lifecycle", "Micropayment ledger canister upgraded.");
}

// Export Candid interface
ic_cdk::export_candid!();
