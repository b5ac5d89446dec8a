// src/backend/storage/content.rs
use crate::error::LedgerError;
use crate::models::common::{ContentId, CreatorId};
use crate::models::Content;
use crate::storage::memory::{
    get_content_counter_memory, get_content_creator_idx_memory, get_content_memory, Memory,
};
use crate::storage::storable::{Cbor, OwnerSeqKey};
use ic_stable_structures::{StableBTreeMap, StableCell};
use std::cell::RefCell;

type StorableContent = Cbor<Content>;

thread_local! {
    // Counter ordering registrations, used by the creator index
    static CONTENT_COUNTER: RefCell<StableCell<u64, Memory>> = RefCell::new(
        StableCell::init(get_content_counter_memory(), 0)
            .expect("Failed to initialize content counter")
    );

    // Primary storage: ContentId -> Content
    static CONTENT_MAP: RefCell<StableBTreeMap<ContentId, StorableContent, Memory>> = RefCell::new(
        StableBTreeMap::init(get_content_memory())
    );

    // Secondary index: (creator, registration seq) -> ContentId
    static CREATOR_INDEX: RefCell<StableBTreeMap<OwnerSeqKey, ContentId, Memory>> = RefCell::new(
        StableBTreeMap::init(get_content_creator_idx_memory())
    );
}

/// Gets the next registration sequence number and increments the counter.
fn next_content_seq() -> Result<u64, LedgerError> {
    CONTENT_COUNTER.with(|cell_ref| {
        let current_val = *cell_ref.borrow().get();
        let next_val = current_val
            .checked_add(1)
            .ok_or_else(|| LedgerError::overflow("Content counter"))?;
        cell_ref
            .borrow_mut()
            .set(next_val)
            .map_err(|e| LedgerError::StorageError(format!("Failed to update content counter: {:?}", e)))?;
        Ok(current_val)
    })
}

pub fn content_exists(content_id: &ContentId) -> bool {
    CONTENT_MAP.with(|map_ref| map_ref.borrow().contains_key(content_id))
}

/// Inserts newly registered content into the primary map and the creator index.
pub fn insert_new_content(content: Content) -> Result<(), LedgerError> {
    let seq = next_content_seq()?;
    let key = OwnerSeqKey::new(content.creator, seq);
    let content_id = content.content_id;

    CONTENT_MAP.with(|map_ref| {
        map_ref.borrow_mut().insert(content_id, Cbor(content));
    });
    CREATOR_INDEX.with(|index_ref| {
        index_ref.borrow_mut().insert(key, content_id);
    });
    Ok(())
}

/// Overwrites an existing content record. The creator never changes, so the
/// index is untouched.
pub fn update_content(content: Content) {
    CONTENT_MAP.with(|map_ref| {
        map_ref.borrow_mut().insert(content.content_id, Cbor(content));
    });
}

pub fn get_content(content_id: &ContentId) -> Option<Content> {
    CONTENT_MAP.with(|map_ref| map_ref.borrow().get(content_id).map(|c| c.0))
}

/// Content ids of a creator in registration order.
pub fn get_creator_content_ids(creator: &CreatorId) -> Vec<ContentId> {
    CREATOR_INDEX.with(|index_ref| {
        index_ref
            .borrow()
            .range(OwnerSeqKey::owner_range(*creator))
            .map(|(_key, content_id)| content_id)
            .collect()
    })
}

pub fn count_content() -> u64 {
    CONTENT_MAP.with(|map_ref| map_ref.borrow().len())
}
