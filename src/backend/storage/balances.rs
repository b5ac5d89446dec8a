// src/backend/storage/balances.rs
// Account records of the prepaid vault: user balances and creator earnings.

use crate::models::common::{CreatorId, UserId};
use crate::models::{CreatorEarnings, UserBalance};
use crate::storage::memory::{get_creator_earnings_memory, get_user_balances_memory, Memory};
use crate::storage::storable::{AccountKey, Cbor};
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

thread_local! {
    /// User Balances: Key = user principal, Value = UserBalance
    static USER_BALANCES: RefCell<StableBTreeMap<AccountKey, Cbor<UserBalance>, Memory>> = RefCell::new(
        StableBTreeMap::init(get_user_balances_memory())
    );

    /// Creator Earnings: Key = creator principal, Value = CreatorEarnings
    static CREATOR_EARNINGS: RefCell<StableBTreeMap<AccountKey, Cbor<CreatorEarnings>, Memory>> = RefCell::new(
        StableBTreeMap::init(get_creator_earnings_memory())
    );
}

pub fn get_user_balance(user: &UserId) -> Option<UserBalance> {
    USER_BALANCES.with(|map_ref| map_ref.borrow().get(&AccountKey(*user)).map(|c| c.0))
}

pub fn insert_user_balance(user: &UserId, balance: UserBalance) {
    USER_BALANCES.with(|map_ref| {
        map_ref.borrow_mut().insert(AccountKey(*user), Cbor(balance));
    });
}

/// Every user account. Iterates the whole map; reserved for audits.
pub fn all_user_balances() -> Vec<(UserId, UserBalance)> {
    USER_BALANCES.with(|map_ref| {
        map_ref
            .borrow()
            .iter()
            .map(|(key, value)| (key.0, value.0))
            .collect()
    })
}

pub fn get_creator_earnings(creator: &CreatorId) -> Option<CreatorEarnings> {
    CREATOR_EARNINGS.with(|map_ref| map_ref.borrow().get(&AccountKey(*creator)).map(|c| c.0))
}

pub fn insert_creator_earnings(creator: &CreatorId, earnings: CreatorEarnings) {
    CREATOR_EARNINGS.with(|map_ref| {
        map_ref.borrow_mut().insert(AccountKey(*creator), Cbor(earnings));
    });
}

/// Every creator account. Iterates the whole map; reserved for audits.
pub fn all_creator_earnings() -> Vec<(CreatorId, CreatorEarnings)> {
    CREATOR_EARNINGS.with(|map_ref| {
        map_ref
            .borrow()
            .iter()
            .map(|(key, value)| (key.0, value.0))
            .collect()
    })
}
