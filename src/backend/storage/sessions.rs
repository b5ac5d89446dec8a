// src/backend/storage/sessions.rs
// Manages storage related to metered sessions.

use crate::error::LedgerError;
use crate::models::common::{SessionId, UserId};
use crate::models::Session;
use crate::storage::memory::{
    get_session_counter_memory, get_session_user_idx_memory, get_sessions_memory, Memory,
};
use crate::storage::storable::{Cbor, OwnerSeqKey};
use ic_stable_structures::{StableBTreeMap, StableCell};
use std::cell::RefCell;

type StorableSession = Cbor<Session>;

thread_local! {
    // Monotonic nonce; feeds session id derivation and orders the user index
    static SESSION_COUNTER: RefCell<StableCell<u64, Memory>> = RefCell::new(
        StableCell::init(get_session_counter_memory(), 0)
            .expect("Failed to initialize session counter")
    );

    // Primary storage: SessionId -> Session
    static SESSIONS_MAP: RefCell<StableBTreeMap<SessionId, StorableSession, Memory>> = RefCell::new(
        StableBTreeMap::init(get_sessions_memory())
    );

    // Secondary index: (user, nonce) -> SessionId
    static USER_SESSION_INDEX: RefCell<StableBTreeMap<OwnerSeqKey, SessionId, Memory>> = RefCell::new(
        StableBTreeMap::init(get_session_user_idx_memory())
    );
}

/// Next nonce, without consuming it.
pub fn peek_session_nonce() -> u64 {
    SESSION_COUNTER.with(|cell| *cell.borrow().get())
}

/// Stores a new session under `nonce` and advances the counter past it.
pub fn insert_new_session(nonce: u64, session: Session) -> Result<(), LedgerError> {
    let next = nonce
        .checked_add(1)
        .ok_or_else(|| LedgerError::overflow("Session counter"))?;
    SESSION_COUNTER.with(|cell| {
        cell.borrow_mut()
            .set(next)
            .map_err(|e| LedgerError::StorageError(format!("Failed to update session counter: {:?}", e)))
    })?;

    let key = OwnerSeqKey::new(session.user, nonce);
    let session_id = session.session_id;
    SESSIONS_MAP.with(|map_ref| {
        map_ref.borrow_mut().insert(session_id, Cbor(session));
    });
    USER_SESSION_INDEX.with(|index_ref| {
        index_ref.borrow_mut().insert(key, session_id);
    });
    Ok(())
}

pub fn session_exists(session_id: &SessionId) -> bool {
    SESSIONS_MAP.with(|map_ref| map_ref.borrow().contains_key(session_id))
}

/// Overwrites an existing session record.
pub fn update_session(session: Session) {
    SESSIONS_MAP.with(|map_ref| {
        map_ref.borrow_mut().insert(session.session_id, Cbor(session));
    });
}

pub fn get_session(session_id: &SessionId) -> Option<Session> {
    SESSIONS_MAP.with(|map_ref| map_ref.borrow().get(session_id).map(|c| c.0))
}

/// Session ids of a user in start order.
pub fn get_user_session_ids(user: &UserId) -> Vec<SessionId> {
    USER_SESSION_INDEX.with(|index_ref| {
        index_ref
            .borrow()
            .range(OwnerSeqKey::owner_range(*user))
            .map(|(_key, session_id)| session_id)
            .collect()
    })
}

/// Full session records of a user in start order.
pub fn get_user_sessions(user: &UserId) -> Vec<Session> {
    get_user_session_ids(user)
        .iter()
        .filter_map(get_session)
        .collect()
}
