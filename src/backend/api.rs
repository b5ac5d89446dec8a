// src/backend/api.rs
// Candid endpoints. Each endpoint resolves caller and time, validates the
// request shape and hands off to the services.

use crate::{
    error::LedgerError,
    metrics::{self, LedgerMetrics},
    models::{
        audit_log::AuditLogEntry,
        common::{Amount, BillingToken, Consumption, ContentId, ContentType, CreatorId, SessionId, UserId},
        ConservationReport, ConsumptionConfig, Content, CreatorEarnings, LedgerSettings, MicropaymentRecord,
        PaymentReference, Session, SessionStats, UserBalance,
    },
    services::{audit_service, config_service, registry_service, session_service, vault_service},
    storage::config::get_settings,
    utils::{
        guards::{admin_guard, authenticated_guard, is_admin},
        time::get_current_time_ns,
    },
};
use candid::CandidType;
use ic_cdk::caller;
use ic_cdk_macros::{query, update};
use serde::Deserialize;
use validator::Validate;

// --- Validation Helper ---
fn validate_request<T: Validate>(req: &T) -> Result<(), LedgerError> {
    req.validate().map_err(|e| LedgerError::InvalidInput(e.to_string()))
}

// --- Request/Response Structs ---

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct RegisterContentRequest {
    pub content_id: ContentId,
    pub billing_token: BillingToken,
    pub content_type: ContentType,
    pub rate_per_unit: Amount,
    #[validate(length(max = 4096))]
    pub metadata: String,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct SendMicropaymentRequest {
    pub payer: UserId,
    pub creator: CreatorId,
    pub amount: Amount,
    #[validate(length(min = 1, max = 128))]
    pub label: String,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct UpdateSessionRequest {
    pub session_id: SessionId,
    pub total_consumption: Consumption,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct SetConsumptionConfigRequest {
    pub content_id: ContentId,
    pub rate_per_unit: Amount,
    #[validate(range(max = 86400))]
    pub update_interval_secs: u64,
    pub min_payment: Amount,
    pub enabled: bool,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct ListRequest {
    pub offset: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl ListRequest {
    fn page(&self) -> (u64, usize) {
        (self.offset.unwrap_or(0), self.limit.unwrap_or(10) as usize)
    }
}

#[derive(CandidType, Deserialize, Clone, Debug, Default)]
pub struct ListMicropaymentsResponse {
    pub entries: Vec<MicropaymentRecord>,
    pub total_entries: u64,
}

#[derive(CandidType, Deserialize, Clone, Debug, Default)]
pub struct ListAuditLogResponse {
    pub entries: Vec<AuditLogEntry>,
    pub total_entries: u64,
}

// --- Content Registry Endpoints ---

#[update(guard = "authenticated_guard")]
fn register_content(req: RegisterContentRequest) -> Result<Content, LedgerError> {
    validate_request(&req)?;
    registry_service::register_content(
        caller(),
        req.content_id,
        req.billing_token,
        req.content_type,
        req.rate_per_unit,
        req.metadata,
        get_current_time_ns(),
    )
}

#[update(guard = "authenticated_guard")]
fn update_content_rate(content_id: ContentId, new_rate: Amount) -> Result<Content, LedgerError> {
    registry_service::update_content_rate(caller(), content_id, new_rate, get_current_time_ns())
}

#[update(guard = "authenticated_guard")]
fn deactivate_content(content_id: ContentId) -> Result<Content, LedgerError> {
    registry_service::deactivate_content(caller(), content_id, get_current_time_ns())
}

#[query]
fn get_content(content_id: ContentId) -> Result<Content, LedgerError> {
    registry_service::get_content(&content_id).ok_or_else(|| LedgerError::ContentNotFound(content_id.to_hex()))
}

#[query]
fn is_content_active(content_id: ContentId) -> bool {
    registry_service::is_content_active(&content_id)
}

#[query]
fn get_creator_contents(creator: CreatorId) -> Vec<ContentId> {
    registry_service::get_creator_contents(&creator)
}

#[update(guard = "admin_guard")]
fn update_content_earnings(content_id: ContentId, amount: Amount) -> Result<Content, LedgerError> {
    registry_service::update_content_earnings(caller(), content_id, amount, get_current_time_ns())
}

#[update(guard = "admin_guard")]
fn increment_content_view(content_id: ContentId) -> Result<Content, LedgerError> {
    registry_service::increment_content_view(caller(), content_id, get_current_time_ns())
}

// --- Prepaid Vault Endpoints ---

#[update(guard = "authenticated_guard")]
fn deposit(amount: Amount) -> Result<UserBalance, LedgerError> {
    vault_service::deposit(caller(), amount, get_current_time_ns())
}

#[update(guard = "authenticated_guard")]
fn withdraw(amount: Amount) -> Result<UserBalance, LedgerError> {
    vault_service::withdraw(caller(), amount, get_current_time_ns())
}

#[update(guard = "authenticated_guard")]
fn set_monthly_limit(limit: Amount) -> Result<UserBalance, LedgerError> {
    vault_service::set_monthly_limit(caller(), limit, get_current_time_ns())
}

#[update(guard = "authenticated_guard")]
fn send_micropayment(req: SendMicropaymentRequest) -> Result<MicropaymentRecord, LedgerError> {
    validate_request(&req)?;
    if req.payer != caller() {
        return Err(LedgerError::NotAuthorized("Only the payer may send a micropayment".to_string()));
    }
    vault_service::send_micropayment(
        req.payer,
        req.creator,
        req.amount,
        PaymentReference::Label(req.label),
        get_current_time_ns(),
    )
}

#[update(guard = "authenticated_guard")]
fn withdraw_creator_earnings() -> Result<Amount, LedgerError> {
    vault_service::withdraw_creator_earnings(caller(), get_current_time_ns())
}

#[query]
fn get_user_balance(user: UserId) -> UserBalance {
    vault_service::get_user_balance(&user, get_current_time_ns())
}

#[query]
fn get_creator_earnings(creator: CreatorId) -> CreatorEarnings {
    vault_service::get_creator_earnings(&creator)
}

#[query]
fn get_vault_balance() -> Amount {
    vault_service::get_vault_balance()
}

#[query]
fn get_total_micropayments_processed() -> u64 {
    vault_service::total_micropayments_processed()
}

#[query]
fn get_user_payments(user: UserId) -> Result<Vec<MicropaymentRecord>, LedgerError> {
    let caller = caller();
    if caller != user && !is_admin(&caller) {
        return Err(LedgerError::NotAuthorized("Payments are visible to the payer only".to_string()));
    }
    Ok(vault_service::get_user_payments(&user))
}

#[update(guard = "admin_guard")]
fn emergency_withdraw() -> Result<Amount, LedgerError> {
    vault_service::emergency_withdraw(caller(), get_current_time_ns())
}

// --- Metered Session Endpoints ---

#[update(guard = "authenticated_guard")]
fn start_session(content_id: ContentId) -> Result<SessionId, LedgerError> {
    session_service::stable_engine().start_session(caller(), content_id, get_current_time_ns())
}

#[update(guard = "authenticated_guard")]
fn update_session(req: UpdateSessionRequest) -> Result<Session, LedgerError> {
    validate_request(&req)?;
    session_service::stable_engine().update_session(
        caller(),
        req.session_id,
        req.total_consumption,
        get_current_time_ns(),
    )
}

#[query]
fn get_session_payment(session_id: SessionId) -> Result<Amount, LedgerError> {
    session_service::stable_engine().get_session_payment(&session_id)
}

#[update(guard = "authenticated_guard")]
fn process_micropayment(session_id: SessionId) -> Result<Amount, LedgerError> {
    session_service::stable_engine().process_micropayment(caller(), session_id, get_current_time_ns())
}

#[update(guard = "authenticated_guard")]
fn end_session(session_id: SessionId) -> Result<Session, LedgerError> {
    session_service::stable_engine().end_session(caller(), session_id, get_current_time_ns())
}

#[update(guard = "authenticated_guard")]
fn set_consumption_config(req: SetConsumptionConfigRequest) -> Result<(), LedgerError> {
    validate_request(&req)?;
    let config = ConsumptionConfig {
        rate_per_unit: req.rate_per_unit,
        update_interval_secs: req.update_interval_secs,
        min_payment: req.min_payment,
        enabled: req.enabled,
    };
    session_service::stable_engine().set_consumption_config(caller(), req.content_id, config, get_current_time_ns())
}

#[query]
fn get_consumption_config(content_id: ContentId) -> Option<ConsumptionConfig> {
    session_service::stable_engine().get_consumption_config(&content_id)
}

#[query]
fn get_session(session_id: SessionId) -> Result<Session, LedgerError> {
    session_service::stable_engine()
        .get_session(&session_id)
        .ok_or_else(|| LedgerError::SessionNotFound(session_id.to_hex()))
}

#[query]
fn get_user_sessions(user: UserId) -> Vec<SessionId> {
    session_service::stable_engine().get_user_sessions(&user)
}

#[query]
fn get_active_sessions(user: UserId) -> Vec<SessionId> {
    session_service::stable_engine().get_active_sessions(&user)
}

#[query]
fn get_stats() -> SessionStats {
    session_service::stable_engine().get_stats()
}

#[update(guard = "admin_guard")]
fn emergency_end_user_sessions(user: UserId) -> Result<u64, LedgerError> {
    session_service::stable_engine().emergency_end_user_sessions(caller(), user, get_current_time_ns())
}

// --- Admin & Metrics Endpoints ---

#[query(guard = "admin_guard")]
fn list_micropayments(req: ListRequest) -> Result<ListMicropaymentsResponse, LedgerError> {
    validate_request(&req)?;
    let (offset, limit) = req.page();
    let (entries, total_entries) = vault_service::list_micropayments(offset, limit);
    Ok(ListMicropaymentsResponse { entries, total_entries })
}

#[query(guard = "admin_guard")]
fn list_audit_log(req: ListRequest) -> Result<ListAuditLogResponse, LedgerError> {
    validate_request(&req)?;
    let (offset, limit) = req.page();
    let (entries, total_entries) = audit_service::list_entries(offset, limit);
    Ok(ListAuditLogResponse { entries, total_entries })
}

#[query(guard = "admin_guard")]
fn get_audit_trail(subject: String) -> Vec<AuditLogEntry> {
    audit_service::entries_for_subject(&subject)
}

#[query(guard = "admin_guard")]
fn audit_conservation() -> ConservationReport {
    vault_service::audit_conservation()
}

#[query(guard = "admin_guard")]
fn get_metrics() -> LedgerMetrics {
    metrics::get_ledger_metrics()
}

#[query]
fn get_ledger_settings() -> LedgerSettings {
    get_settings()
}

#[update(guard = "admin_guard")]
fn update_settings(settings: LedgerSettings) -> Result<LedgerSettings, LedgerError> {
    config_service::update_settings(caller(), settings, get_current_time_ns())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_request_bounds_limit() {
        let ok = ListRequest { offset: None, limit: Some(100) };
        assert!(validate_request(&ok).is_ok());
        assert_eq!(ok.page(), (0, 100));

        let too_many = ListRequest { offset: Some(5), limit: Some(101) };
        assert!(matches!(validate_request(&too_many), Err(LedgerError::InvalidInput(_))));
        assert_eq!(ListRequest { offset: None, limit: None }.page(), (0, 10));
    }

    #[test]
    fn micropayment_label_must_be_present() {
        let principal = candid::Principal::from_slice(&[3; 29]);
        let req = SendMicropaymentRequest {
            payer: principal,
            creator: principal,
            amount: 1,
            label: String::new(),
        };
        assert!(validate_request(&req).is_err());
    }
}
