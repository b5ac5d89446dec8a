// src/backend/storage/consumption.rs
use crate::models::common::ContentId;
use crate::models::ConsumptionConfig;
use crate::storage::memory::{get_consumption_config_memory, Memory};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

thread_local! {
    /// Per-content billing overrides: Key = ContentId, Value = ConsumptionConfig
    static CONSUMPTION_CONFIGS: RefCell<StableBTreeMap<ContentId, Cbor<ConsumptionConfig>, Memory>> = RefCell::new(
        StableBTreeMap::init(get_consumption_config_memory())
    );
}

/// Inserts or replaces the override for a content item.
pub fn insert_config(content_id: ContentId, config: ConsumptionConfig) -> Option<ConsumptionConfig> {
    CONSUMPTION_CONFIGS.with(|map_ref| {
        map_ref.borrow_mut().insert(content_id, Cbor(config)).map(|prev| prev.0)
    })
}

pub fn get_config(content_id: &ContentId) -> Option<ConsumptionConfig> {
    CONSUMPTION_CONFIGS.with(|map_ref| map_ref.borrow().get(content_id).map(|c| c.0))
}
