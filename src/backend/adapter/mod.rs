// src/backend/adapter/mod.rs
// Capabilities the session engine consumes. The engine sees the registry and
// the vault only through these traits, never through their storage.

pub mod registry_adapter;
pub mod vault_adapter;

use crate::error::LedgerError;
use crate::models::common::{Amount, ContentId, CreatorId, TimestampNs, UserId};
use crate::models::{Content, MicropaymentRecord, PaymentReference};

pub use registry_adapter::StableRegistry;
pub use vault_adapter::StableVault;

/// Read access to content terms plus the settlement credit hook.
pub trait ContentDirectory {
    fn lookup_content(&self, content_id: &ContentId) -> Option<Content>;

    /// Credits `amount` to the content's earnings; counts a view when
    /// `count_view` is set.
    fn record_settlement(
        &mut self,
        content_id: &ContentId,
        amount: Amount,
        count_view: bool,
        now: TimestampNs,
    ) -> Result<(), LedgerError>;
}

/// The vault's settlement primitive.
pub trait SettlementVault {
    fn settle(
        &mut self,
        payer: UserId,
        creator: CreatorId,
        amount: Amount,
        reference: PaymentReference,
        now: TimestampNs,
    ) -> Result<MicropaymentRecord, LedgerError>;
}
