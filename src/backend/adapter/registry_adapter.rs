// src/backend/adapter/registry_adapter.rs
use super::ContentDirectory;
use crate::error::LedgerError;
use crate::models::common::{Amount, ContentId, TimestampNs};
use crate::models::Content;
use crate::services::registry_service;

/// Content directory backed by the canister's own registry.
#[derive(Clone, Copy, Debug, Default)]
pub struct StableRegistry;

impl ContentDirectory for StableRegistry {
    fn lookup_content(&self, content_id: &ContentId) -> Option<Content> {
        registry_service::get_content(content_id)
    }

    fn record_settlement(
        &mut self,
        content_id: &ContentId,
        amount: Amount,
        count_view: bool,
        now: TimestampNs,
    ) -> Result<(), LedgerError> {
        registry_service::credit_settlement(content_id, amount, count_view, now).map(|_content| ())
    }
}
