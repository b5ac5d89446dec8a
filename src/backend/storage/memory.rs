// src/backend/storage/memory.rs
use ic_stable_structures::memory_manager::{MemoryId, MemoryManager, VirtualMemory};
use ic_stable_structures::DefaultMemoryImpl;
use std::cell::RefCell;

// Define Memory IDs for stable structures
// Choose non-overlapping IDs; never renumber an ID that has shipped.
const CONFIG_MEM_ID: MemoryId = MemoryId::new(0);
const METRICS_MEM_ID: MemoryId = MemoryId::new(1);
const CONTENT_MEM_ID: MemoryId = MemoryId::new(2);
const CONTENT_CREATOR_IDX_MEM_ID: MemoryId = MemoryId::new(3);
const CONTENT_COUNTER_MEM_ID: MemoryId = MemoryId::new(4);
const CONSUMPTION_CONFIG_MEM_ID: MemoryId = MemoryId::new(5);
const USER_BALANCES_MEM_ID: MemoryId = MemoryId::new(6);
const CREATOR_EARNINGS_MEM_ID: MemoryId = MemoryId::new(7);
const SESSIONS_MEM_ID: MemoryId = MemoryId::new(8);
const SESSION_USER_IDX_MEM_ID: MemoryId = MemoryId::new(9);
const SESSION_COUNTER_MEM_ID: MemoryId = MemoryId::new(10);
const PAYMENT_LOG_INDEX_MEM_ID: MemoryId = MemoryId::new(11);
const PAYMENT_LOG_DATA_MEM_ID: MemoryId = MemoryId::new(12);
const PAYMENT_PAYER_IDX_MEM_ID: MemoryId = MemoryId::new(13);
const AUDIT_LOG_INDEX_MEM_ID: MemoryId = MemoryId::new(14);
const AUDIT_LOG_DATA_MEM_ID: MemoryId = MemoryId::new(15);
// Reserve IDs 16-31 for future use

// Define memory type alias
pub type Memory = VirtualMemory<DefaultMemoryImpl>;

thread_local! {
    // Memory manager
    static MEMORY_MANAGER: RefCell<MemoryManager<DefaultMemoryImpl>> = RefCell::new(
        MemoryManager::init(DefaultMemoryImpl::default())
    );
}

/// Get memory instance for a specific MemoryId.
pub fn get_memory(id: MemoryId) -> Memory {
    MEMORY_MANAGER.with(|m| m.borrow().get(id))
}

pub fn get_config_memory() -> Memory {
    get_memory(CONFIG_MEM_ID)
}

pub fn get_metrics_memory() -> Memory {
    get_memory(METRICS_MEM_ID)
}

pub fn get_content_memory() -> Memory {
    get_memory(CONTENT_MEM_ID)
}

pub fn get_content_creator_idx_memory() -> Memory {
    get_memory(CONTENT_CREATOR_IDX_MEM_ID)
}

pub fn get_content_counter_memory() -> Memory {
    get_memory(CONTENT_COUNTER_MEM_ID)
}

pub fn get_consumption_config_memory() -> Memory {
    get_memory(CONSUMPTION_CONFIG_MEM_ID)
}

pub fn get_user_balances_memory() -> Memory {
    get_memory(USER_BALANCES_MEM_ID)
}

pub fn get_creator_earnings_memory() -> Memory {
    get_memory(CREATOR_EARNINGS_MEM_ID)
}

pub fn get_sessions_memory() -> Memory {
    get_memory(SESSIONS_MEM_ID)
}

pub fn get_session_user_idx_memory() -> Memory {
    get_memory(SESSION_USER_IDX_MEM_ID)
}

pub fn get_session_counter_memory() -> Memory {
    get_memory(SESSION_COUNTER_MEM_ID)
}

pub fn get_payment_log_index_memory() -> Memory {
    get_memory(PAYMENT_LOG_INDEX_MEM_ID)
}

pub fn get_payment_log_data_memory() -> Memory {
    get_memory(PAYMENT_LOG_DATA_MEM_ID)
}

pub fn get_payment_payer_idx_memory() -> Memory {
    get_memory(PAYMENT_PAYER_IDX_MEM_ID)
}

pub fn get_audit_log_index_memory() -> Memory {
    get_memory(AUDIT_LOG_INDEX_MEM_ID)
}

pub fn get_audit_log_data_memory() -> Memory {
    get_memory(AUDIT_LOG_DATA_MEM_ID)
}
