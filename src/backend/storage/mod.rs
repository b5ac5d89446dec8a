// src/backend/storage/mod.rs
// Stable memory persistence using ic-stable-structures

pub mod audit_logs;
pub mod balances;
pub mod config;
pub mod consumption;
pub mod content;
pub mod memory;
pub mod metrics;
pub mod payments;
pub mod sessions;
pub mod storable;

pub use memory::Memory;
pub use metrics::{get_metrics, update_metrics};
pub use storable::{AccountKey, Cbor, OwnerSeqKey};
