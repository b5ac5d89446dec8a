// src/backend/adapter/vault_adapter.rs
use super::SettlementVault;
use crate::error::LedgerError;
use crate::models::common::{Amount, CreatorId, TimestampNs, UserId};
use crate::models::{MicropaymentRecord, PaymentReference};
use crate::services::vault_service;

/// Settlement through the canister's own prepaid vault.
#[derive(Clone, Copy, Debug, Default)]
pub struct StableVault;

impl SettlementVault for StableVault {
    fn settle(
        &mut self,
        payer: UserId,
        creator: CreatorId,
        amount: Amount,
        reference: PaymentReference,
        now: TimestampNs,
    ) -> Result<MicropaymentRecord, LedgerError> {
        vault_service::send_micropayment(payer, creator, amount, reference, now)
    }
}
