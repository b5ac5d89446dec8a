// src/backend/services/session_service.rs
// Metered session engine: opens billing sessions against content, records
// monotonic consumption and settles what is owed through the vault.

use crate::{
    adapter::{ContentDirectory, SettlementVault, StableRegistry, StableVault},
    error::LedgerError,
    metrics,
    models::{
        audit_log::LogAction,
        common::{format_amount, Amount, Consumption, ContentId, PrincipalId, SessionId, TimestampNs, UserId},
        ConsumptionConfig, PaymentReference, Session, SessionStats, SessionStatus,
    },
    services::audit_service,
    storage::{self, config::get_settings},
    utils::{
        crypto::derive_session_id,
        guards::{check_admin, check_authenticated, expect_committed, is_admin},
    },
};

const COMPONENT: &str = "session";

/// Session engine over a content directory and a settlement vault.
pub struct SessionEngine<D, V> {
    directory: D,
    vault: V,
}

/// The engine wired to the canister's own registry and vault.
pub fn stable_engine() -> SessionEngine<StableRegistry, StableVault> {
    SessionEngine::new(StableRegistry, StableVault)
}

fn load_session(session_id: &SessionId) -> Result<Session, LedgerError> {
    storage::sessions::get_session(session_id).ok_or_else(|| LedgerError::SessionNotFound(session_id.to_hex()))
}

fn load_owned_active(caller: &PrincipalId, session_id: &SessionId) -> Result<Session, LedgerError> {
    let session = load_session(session_id)?;
    if session.user != *caller {
        return Err(LedgerError::NotSessionOwner);
    }
    if !session.is_active() {
        return Err(LedgerError::SessionNotActive);
    }
    Ok(session)
}

fn enabled_config(content_id: &ContentId) -> Option<ConsumptionConfig> {
    storage::consumption::get_config(content_id).filter(|config| config.enabled)
}

impl<D: ContentDirectory, V: SettlementVault> SessionEngine<D, V> {
    pub fn new(directory: D, vault: V) -> Self {
        Self { directory, vault }
    }

    /// Opens a session for `user`. The rate in effect now bills the whole
    /// session: an enabled consumption config wins over the content rate.
    pub fn start_session(&mut self, user: UserId, content_id: ContentId, now: TimestampNs) -> Result<SessionId, LedgerError> {
        check_authenticated(&user)?;
        let content = self
            .directory
            .lookup_content(&content_id)
            .ok_or_else(|| LedgerError::ContentNotFound(content_id.to_hex()))?;
        if !content.active {
            return Err(LedgerError::ContentInactive);
        }
        let rate_per_unit = enabled_config(&content_id).map_or(content.rate_per_unit, |c| c.rate_per_unit);

        let nonce = storage::sessions::peek_session_nonce();
        let session_id = derive_session_id(&user, &content_id, nonce, now);
        if storage::sessions::session_exists(&session_id) {
            return Err(LedgerError::InternalError("Session id collision".to_string()));
        }

        let session = Session {
            session_id,
            user,
            content_id,
            rate_per_unit,
            status: SessionStatus::Active,
            start_time: now,
            last_update: now,
            total_consumption: 0,
            total_paid: 0,
            ended_at: None,
        };
        storage::sessions::insert_new_session(nonce, session)?;
        expect_committed(metrics::record_session_started(), "Session metrics");
        audit_service::record(
            user,
            LogAction::SessionStarted,
            session_id.to_hex(),
            Some(format!("content {} at {}", content_id, format_amount(rate_per_unit))),
            now,
        );
        crate::log_info!(COMPONENT, "Session {} started by {}", session_id, user);
        Ok(session_id)
    }

    /// Records a new cumulative consumption total. Never moves money.
    pub fn update_session(
        &mut self,
        caller: PrincipalId,
        session_id: SessionId,
        new_total: Consumption,
        now: TimestampNs,
    ) -> Result<Session, LedgerError> {
        let mut session = load_owned_active(&caller, &session_id)?;
        if new_total == 0 {
            return Err(LedgerError::InvalidConsumption);
        }
        if new_total <= session.total_consumption {
            return Err(LedgerError::NoConsumptionIncrease {
                current: session.total_consumption,
                reported: new_total,
            });
        }
        // The accrued amount must stay representable for settlement.
        new_total
            .checked_mul(session.rate_per_unit)
            .ok_or_else(|| LedgerError::overflow("Session accrual"))?;

        session.total_consumption = new_total;
        session.last_update = now;
        storage::sessions::update_session(session.clone());
        audit_service::record(
            caller,
            LogAction::SessionUpdated,
            session_id.to_hex(),
            Some(format!("consumption {}", new_total)),
            now,
        );
        Ok(session)
    }

    /// Outstanding amount owed by the session, clamped at zero.
    pub fn get_session_payment(&self, session_id: &SessionId) -> Result<Amount, LedgerError> {
        load_session(session_id)?
            .outstanding()
            .ok_or_else(|| LedgerError::overflow("Session accrual"))
    }

    /// Settles the outstanding amount through the vault. A vault rejection
    /// leaves the session unchanged so the caller can top up and retry.
    pub fn process_micropayment(
        &mut self,
        caller: PrincipalId,
        session_id: SessionId,
        now: TimestampNs,
    ) -> Result<Amount, LedgerError> {
        let mut session = load_owned_active(&caller, &session_id)?;
        let content = self
            .directory
            .lookup_content(&session.content_id)
            .ok_or_else(|| LedgerError::ContentNotFound(session.content_id.to_hex()))?;

        let outstanding = session.outstanding().ok_or_else(|| LedgerError::overflow("Session accrual"))?;
        if outstanding == 0 {
            return Err(LedgerError::NoPaymentDue);
        }
        if let Some(config) = enabled_config(&session.content_id) {
            if outstanding < config.min_payment {
                return Err(LedgerError::AmountBelowMinimum {
                    amount: outstanding,
                    minimum: config.min_payment,
                });
            }
        }
        let new_paid = session
            .total_paid
            .checked_add(outstanding)
            .ok_or_else(|| LedgerError::overflow("Session paid"))?;
        let first_settlement = session.total_paid == 0;

        self.vault.settle(
            session.user,
            content.creator,
            outstanding,
            PaymentReference::Session(session_id),
            now,
        )?;

        // The vault has committed; the session and registry must follow.
        session.total_paid = new_paid;
        storage::sessions::update_session(session.clone());
        expect_committed(
            self.directory
                .record_settlement(&session.content_id, outstanding, first_settlement, now),
            "Content settlement credit",
        );
        expect_committed(metrics::record_session_settlement(outstanding), "Session metrics");
        audit_service::record(
            caller,
            LogAction::SessionSettled,
            session_id.to_hex(),
            Some(format_amount(outstanding)),
            now,
        );
        crate::log_info!(COMPONENT, "Session {} settled {}", session_id, format_amount(outstanding));
        Ok(outstanding)
    }

    /// Ends the caller's session. Unsettled consumption is forfeited.
    pub fn end_session(&mut self, caller: PrincipalId, session_id: SessionId, now: TimestampNs) -> Result<Session, LedgerError> {
        let mut session = load_session(&session_id)?;
        if session.user != caller {
            return Err(LedgerError::NotSessionOwner);
        }
        if !session.is_active() {
            return Err(LedgerError::SessionNotActive);
        }
        let forfeited = session.outstanding().unwrap_or(0);

        session.status = SessionStatus::Ended;
        session.ended_at = Some(now);
        storage::sessions::update_session(session.clone());
        expect_committed(metrics::record_sessions_ended(1), "Session metrics");
        audit_service::record(
            caller,
            LogAction::SessionEnded,
            session_id.to_hex(),
            (forfeited > 0).then(|| format!("forfeited {}", format_amount(forfeited))),
            now,
        );
        if forfeited > 0 {
            crate::log_warn!(COMPONENT, "Session {} ended with {} unsettled", session_id, format_amount(forfeited));
        }
        Ok(session)
    }

    /// Sets the billing override of a content item. Only its creator or an
    /// administrator may do so.
    pub fn set_consumption_config(
        &mut self,
        caller: PrincipalId,
        content_id: ContentId,
        config: ConsumptionConfig,
        now: TimestampNs,
    ) -> Result<(), LedgerError> {
        let content = self
            .directory
            .lookup_content(&content_id)
            .ok_or_else(|| LedgerError::ContentNotFound(content_id.to_hex()))?;
        if !content.is_creator(&caller) && !is_admin(&caller) {
            return Err(LedgerError::NotAuthorized(
                "Only the creator or an administrator may configure billing".to_string(),
            ));
        }
        let settings = get_settings();
        if config.update_interval_secs < settings.min_update_interval_secs {
            return Err(LedgerError::UpdateIntervalTooLow {
                interval_secs: config.update_interval_secs,
                minimum_secs: settings.min_update_interval_secs,
            });
        }
        if config.enabled && config.rate_per_unit < settings.min_rate_per_unit {
            return Err(LedgerError::RateTooLow {
                rate: config.rate_per_unit,
                minimum: settings.min_rate_per_unit,
            });
        }

        let details = format!(
            "rate {}, interval {}s, min {}, enabled {}",
            format_amount(config.rate_per_unit),
            config.update_interval_secs,
            format_amount(config.min_payment),
            config.enabled
        );
        storage::consumption::insert_config(content_id, config);
        audit_service::record(caller, LogAction::ConsumptionConfigSet, content_id.to_hex(), Some(details), now);
        Ok(())
    }

    pub fn get_consumption_config(&self, content_id: &ContentId) -> Option<ConsumptionConfig> {
        storage::consumption::get_config(content_id)
    }

    pub fn get_session(&self, session_id: &SessionId) -> Option<Session> {
        storage::sessions::get_session(session_id)
    }

    pub fn get_user_sessions(&self, user: &UserId) -> Vec<SessionId> {
        storage::sessions::get_user_session_ids(user)
    }

    pub fn get_active_sessions(&self, user: &UserId) -> Vec<SessionId> {
        storage::sessions::get_user_sessions(user)
            .into_iter()
            .filter(Session::is_active)
            .map(|s| s.session_id)
            .collect()
    }

    pub fn get_stats(&self) -> SessionStats {
        let m = metrics::get_ledger_metrics();
        SessionStats {
            total_sessions: m.sessions_started,
            active_sessions: m.sessions_active,
            total_micropayments_processed: m.session_settlements,
            total_amount_settled: m.session_amount_settled,
        }
    }

    /// Force-ends every active session of `user` without settlement. Returns
    /// the number of sessions ended.
    pub fn emergency_end_user_sessions(
        &mut self,
        caller: PrincipalId,
        user: UserId,
        now: TimestampNs,
    ) -> Result<u64, LedgerError> {
        check_admin(&caller)?;
        let mut ended = 0u64;
        for mut session in storage::sessions::get_user_sessions(&user) {
            if !session.is_active() {
                continue;
            }
            session.status = SessionStatus::ForceEnded;
            session.ended_at = Some(now);
            let session_id = session.session_id;
            storage::sessions::update_session(session);
            audit_service::record(caller, LogAction::SessionForceEnded, session_id.to_hex(), None, now);
            ended += 1;
        }
        expect_committed(metrics::record_sessions_ended(ended), "Session metrics");
        crate::log_warn!(COMPONENT, "Force-ended {} sessions of {} by {}", ended, user, caller);
        Ok(ended)
    }
}
