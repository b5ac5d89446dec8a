// src/backend/storage/storable.rs
use crate::models::common::{ContentId, SessionId};
use candid::Principal;
use ic_stable_structures::{storable::Bound, Storable};
use serde::{de::DeserializeOwned, Serialize};
use std::borrow::Cow;

/// Helper struct to wrap any type T that implements Serialize and DeserializeOwned
/// to make it Storable using CBOR encoding.
#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub struct Cbor<T>(pub T)
where
    T: Serialize + DeserializeOwned;

impl<T> Storable for Cbor<T>
where
    T: Serialize + DeserializeOwned,
{
    fn to_bytes(&self) -> Cow<[u8]> {
        let mut writer = vec![];
        ciborium::ser::into_writer(&self.0, &mut writer)
            .expect("Failed to serialize value to CBOR for stable storage");
        Cow::Owned(writer)
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        let value: T = ciborium::de::from_reader(bytes.as_ref())
            .expect("Failed to deserialize value from CBOR from stable storage");
        Cbor(value)
    }

    const BOUND: Bound = Bound::Unbounded;
}

const PRINCIPAL_MAX_LEN: usize = 29;

impl Storable for ContentId {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Borrowed(&self.0)
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        let mut raw = [0u8; 32];
        raw.copy_from_slice(bytes.as_ref());
        ContentId(raw)
    }

    const BOUND: Bound = Bound::Bounded { max_size: 32, is_fixed_size: true };
}

impl Storable for SessionId {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Borrowed(&self.0)
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        let mut raw = [0u8; 32];
        raw.copy_from_slice(bytes.as_ref());
        SessionId(raw)
    }

    const BOUND: Bound = Bound::Bounded { max_size: 32, is_fixed_size: true };
}

/// Principal as a bounded map key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccountKey(pub Principal);

impl Storable for AccountKey {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Owned(self.0.as_slice().to_vec())
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        AccountKey(Principal::from_slice(bytes.as_ref()))
    }

    const BOUND: Bound = Bound::Bounded { max_size: PRINCIPAL_MAX_LEN as u32, is_fixed_size: false };
}

/// Secondary-index key: entries of one owner, ordered by insertion sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct OwnerSeqKey {
    pub owner: AccountKey,
    pub seq: u64,
}

impl OwnerSeqKey {
    pub fn new(owner: Principal, seq: u64) -> Self {
        Self { owner: AccountKey(owner), seq }
    }

    /// Inclusive key range covering every entry of `owner`.
    pub fn owner_range(owner: Principal) -> std::ops::RangeInclusive<OwnerSeqKey> {
        OwnerSeqKey::new(owner, 0)..=OwnerSeqKey::new(owner, u64::MAX)
    }
}

impl Storable for OwnerSeqKey {
    // Layout: [principal length][principal bytes, zero padded to 29][seq big-endian]
    fn to_bytes(&self) -> Cow<[u8]> {
        let principal = self.owner.0.as_slice();
        let mut bytes = Vec::with_capacity(1 + PRINCIPAL_MAX_LEN + 8);
        bytes.push(principal.len() as u8);
        bytes.extend_from_slice(principal);
        bytes.resize(1 + PRINCIPAL_MAX_LEN, 0);
        bytes.extend_from_slice(&self.seq.to_be_bytes());
        Cow::Owned(bytes)
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        let len = bytes[0] as usize;
        let owner = Principal::from_slice(&bytes[1..1 + len]);
        let mut seq = [0u8; 8];
        seq.copy_from_slice(&bytes[1 + PRINCIPAL_MAX_LEN..]);
        OwnerSeqKey::new(owner, u64::from_be_bytes(seq))
    }

    const BOUND: Bound = Bound::Bounded {
        max_size: (1 + PRINCIPAL_MAX_LEN + 8) as u32,
        is_fixed_size: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_seq_key_survives_encoding() {
        let owner = Principal::from_slice(&[7, 7, 7, 1]);
        let key = OwnerSeqKey::new(owner, 42);
        let decoded = OwnerSeqKey::from_bytes(key.to_bytes());
        assert_eq!(decoded, key);
    }

    #[test]
    fn owner_range_orders_by_sequence() {
        let owner = Principal::from_slice(&[1, 2]);
        let range = OwnerSeqKey::owner_range(owner);
        assert!(range.contains(&OwnerSeqKey::new(owner, 5)));
        assert!(!range.contains(&OwnerSeqKey::new(Principal::from_slice(&[1, 3]), 5)));
    }
}
