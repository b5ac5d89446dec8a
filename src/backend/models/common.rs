// src/backend/models/common.rs
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub type UserId = Principal;      // Consumer holding a prepaid balance
pub type CreatorId = Principal;   // Owner of registered content
pub type PrincipalId = Principal; // General caller identity

pub type Amount = u128;     // Base units of the single value unit
pub type Consumption = u128; // Metered units (seconds, words, bytes)
pub type TimestampNs = u64; // Nanoseconds since epoch

/// Base units per display unit (18 decimals).
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Fixed-size hash-like content key.
#[derive(CandidType, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentId(#[serde(with = "serde_bytes")] pub [u8; 32]);

/// Session key, derived from user, content and a nonce.
#[derive(CandidType, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(#[serde(with = "serde_bytes")] pub [u8; 32]);

impl ContentId {
    /// Hashes a human label ("video_001") into a content key.
    pub fn from_label(label: &str) -> Self {
        ContentId(Sha256::digest(label.as_bytes()).into())
    }

    pub fn from_hex(text: &str) -> Option<Self> {
        let bytes = hex::decode(text).ok()?;
        Some(ContentId(bytes.try_into().ok()?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl SessionId {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.to_hex())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.to_hex())
    }
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum ContentType {
    Video,
    Audio,
    Text,
    Live,
}

/// Currency the content is billed in. The ledger settles a single value unit,
/// so `Ledger` only records which token canister the creator quoted against.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum BillingToken {
    Native,
    Ledger { canister: Principal },
}

impl BillingToken {
    /// A ledger reference must name a real canister.
    pub fn is_valid(&self) -> bool {
        match self {
            BillingToken::Native => true,
            BillingToken::Ledger { canister } => !is_null_principal(canister),
        }
    }
}

/// The anonymous and management principals stand in for a zero address.
pub fn is_null_principal(principal: &Principal) -> bool {
    *principal == Principal::anonymous() || *principal == Principal::management_canister()
}

/// Formats base units as a decimal display amount ("9.999").
pub fn format_amount(amount: Amount) -> String {
    let whole = amount / UNIT;
    let frac = amount % UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_text = format!("{:018}", frac);
    format!("{}.{}", whole, frac_text.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_id_hex_round_trips() {
        let id = ContentId::from_label("video_001");
        assert_eq!(ContentId::from_hex(&id.to_hex()), Some(id));
        assert_eq!(ContentId::from_hex("abcd"), None);
    }

    #[test]
    fn formats_display_amounts() {
        assert_eq!(format_amount(10 * UNIT), "10");
        assert_eq!(format_amount(9 * UNIT + 999 * UNIT / 1000), "9.999");
        assert_eq!(format_amount(UNIT / 1000), "0.001");
    }

    #[test]
    fn null_ledger_token_is_invalid() {
        assert!(BillingToken::Native.is_valid());
        assert!(!BillingToken::Ledger { canister: Principal::anonymous() }.is_valid());
        assert!(BillingToken::Ledger { canister: Principal::from_slice(&[1, 2, 3]) }.is_valid());
    }
}
