// src/backend/services/registry_service.rs
// Content registry: ownership, billing terms and per-content counters.

use crate::{
    error::LedgerError,
    metrics,
    models::{
        audit_log::LogAction,
        common::{format_amount, Amount, BillingToken, ContentId, ContentType, CreatorId, PrincipalId, TimestampNs},
        Content,
    },
    services::audit_service,
    storage::{self, config::get_settings},
    utils::guards::{check_admin, check_authenticated, expect_committed},
};

/// Registers new content owned by `creator`.
///
/// # Errors
///
/// * `DuplicateContent` if the id is taken. Registration is never an upsert.
/// * `InvalidToken` for a ledger token naming a null principal.
/// * `RateTooLow` if `rate_per_unit` is under the configured minimum.
/// * `InvalidInput` if the metadata exceeds the configured length.
pub fn register_content(
    creator: CreatorId,
    content_id: ContentId,
    billing_token: BillingToken,
    content_type: ContentType,
    rate_per_unit: Amount,
    metadata: String,
    now: TimestampNs,
) -> Result<Content, LedgerError> {
    check_authenticated(&creator)?;
    let settings = get_settings();

    if storage::content::content_exists(&content_id) {
        return Err(LedgerError::DuplicateContent(content_id.to_hex()));
    }
    if !billing_token.is_valid() {
        return Err(LedgerError::InvalidToken);
    }
    if rate_per_unit < settings.min_rate_per_unit {
        return Err(LedgerError::RateTooLow {
            rate: rate_per_unit,
            minimum: settings.min_rate_per_unit,
        });
    }
    if metadata.len() > settings.max_metadata_len as usize {
        return Err(LedgerError::InvalidInput(format!(
            "Metadata exceeds {} bytes",
            settings.max_metadata_len
        )));
    }

    let content = Content {
        content_id,
        creator,
        billing_token,
        content_type,
        rate_per_unit,
        active: true,
        total_earnings: 0,
        total_views: 0,
        metadata,
        created_at: now,
        updated_at: now,
    };

    storage::content::insert_new_content(content.clone())?;
    expect_committed(metrics::record_content_registered(), "Content metrics");
    audit_service::record(
        creator,
        LogAction::ContentRegistered,
        content_id.to_hex(),
        Some(format!("rate {}", format_amount(rate_per_unit))),
        now,
    );
    crate::log_info!("registry", "Content {} registered by {}", content_id, creator);
    Ok(content)
}

fn load_owned(caller: &PrincipalId, content_id: &ContentId) -> Result<Content, LedgerError> {
    let content = storage::content::get_content(content_id)
        .ok_or_else(|| LedgerError::ContentNotFound(content_id.to_hex()))?;
    if !content.is_creator(caller) {
        return Err(LedgerError::NotCreator);
    }
    Ok(content)
}

/// Changes the rate new sessions are billed at. Open sessions keep the rate
/// captured when they started.
pub fn update_content_rate(
    caller: PrincipalId,
    content_id: ContentId,
    new_rate: Amount,
    now: TimestampNs,
) -> Result<Content, LedgerError> {
    let mut content = load_owned(&caller, &content_id)?;
    let minimum = get_settings().min_rate_per_unit;
    if new_rate < minimum {
        return Err(LedgerError::RateTooLow { rate: new_rate, minimum });
    }

    let old_rate = content.rate_per_unit;
    content.rate_per_unit = new_rate;
    content.updated_at = now;
    storage::content::update_content(content.clone());

    audit_service::record(
        caller,
        LogAction::ContentRateUpdated,
        content_id.to_hex(),
        Some(format!("{} -> {}", format_amount(old_rate), format_amount(new_rate))),
        now,
    );
    Ok(content)
}

/// Stops new sessions on the content. Deactivating twice is a no-op.
pub fn deactivate_content(caller: PrincipalId, content_id: ContentId, now: TimestampNs) -> Result<Content, LedgerError> {
    let mut content = load_owned(&caller, &content_id)?;
    if !content.active {
        return Ok(content);
    }

    content.active = false;
    content.updated_at = now;
    storage::content::update_content(content.clone());
    expect_committed(metrics::record_content_deactivated(), "Content metrics");

    audit_service::record(caller, LogAction::ContentDeactivated, content_id.to_hex(), None, now);
    crate::log_info!("registry", "Content {} deactivated", content_id);
    Ok(content)
}

pub fn get_content(content_id: &ContentId) -> Option<Content> {
    storage::content::get_content(content_id)
}

/// Unknown content is reported inactive.
pub fn is_content_active(content_id: &ContentId) -> bool {
    storage::content::get_content(content_id).map_or(false, |c| c.active)
}

pub fn get_creator_contents(creator: &CreatorId) -> Vec<ContentId> {
    storage::content::get_creator_content_ids(creator)
}

/// Credits a settled amount to the content's lifetime earnings and, on a
/// session's first settlement, counts a view. Only reachable from the
/// in-canister settlement path.
pub(crate) fn credit_settlement(
    content_id: &ContentId,
    amount: Amount,
    count_view: bool,
    now: TimestampNs,
) -> Result<Content, LedgerError> {
    let mut content = storage::content::get_content(content_id)
        .ok_or_else(|| LedgerError::ContentNotFound(content_id.to_hex()))?;
    content.total_earnings = content
        .total_earnings
        .checked_add(amount)
        .ok_or_else(|| LedgerError::overflow("Content earnings"))?;
    if count_view {
        content.total_views = content.total_views.saturating_add(1);
    }
    content.updated_at = now;
    storage::content::update_content(content.clone());
    Ok(content)
}

/// Privileged earnings credit for administrative corrections.
pub fn update_content_earnings(
    caller: PrincipalId,
    content_id: ContentId,
    amount: Amount,
    now: TimestampNs,
) -> Result<Content, LedgerError> {
    check_admin(&caller)?;
    let content = credit_settlement(&content_id, amount, false, now)?;
    audit_service::record(
        caller,
        LogAction::ContentEarningsCredited,
        content_id.to_hex(),
        Some(format_amount(amount)),
        now,
    );
    Ok(content)
}

/// Privileged view counter bump.
pub fn increment_content_view(caller: PrincipalId, content_id: ContentId, now: TimestampNs) -> Result<Content, LedgerError> {
    check_admin(&caller)?;
    let mut content = storage::content::get_content(&content_id)
        .ok_or_else(|| LedgerError::ContentNotFound(content_id.to_hex()))?;
    content.total_views = content.total_views.saturating_add(1);
    content.updated_at = now;
    storage::content::update_content(content.clone());
    audit_service::record(caller, LogAction::ContentViewed, content_id.to_hex(), None, now);
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::UNIT;
    use crate::models::LedgerSettings;
    use crate::storage::config::init_config;
    use candid::Principal;

    const NOW: TimestampNs = 1_700_000_000_000_000_000;

    fn admin() -> Principal {
        Principal::from_slice(&[1; 29])
    }

    fn alice() -> Principal {
        Principal::from_slice(&[2; 29])
    }

    fn bob() -> Principal {
        Principal::from_slice(&[3; 29])
    }

    fn setup() {
        init_config(admin(), LedgerSettings::default()).unwrap();
    }

    fn register(creator: Principal, label: &str, rate: Amount) -> Result<Content, LedgerError> {
        register_content(
            creator,
            ContentId::from_label(label),
            BillingToken::Native,
            ContentType::Video,
            rate,
            "ipfs://QmTest".to_string(),
            NOW,
        )
    }

    #[test]
    fn registers_and_indexes_by_creator() {
        setup();
        let content = register(alice(), "video_001", UNIT / 100).unwrap();
        assert!(content.active);
        assert_eq!(content.total_earnings, 0);
        assert_eq!(content.total_views, 0);

        register(alice(), "video_002", UNIT / 100).unwrap();
        assert_eq!(
            get_creator_contents(&alice()),
            vec![ContentId::from_label("video_001"), ContentId::from_label("video_002")]
        );
        assert!(get_creator_contents(&bob()).is_empty());
        assert!(is_content_active(&ContentId::from_label("video_001")));
        assert_eq!(metrics::get_ledger_metrics().contents_registered, 2);
    }

    #[test]
    fn duplicate_registration_fails_and_leaves_original() {
        setup();
        let original = register(alice(), "video_001", UNIT / 100).unwrap();
        let err = register(bob(), "video_001", UNIT).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateContent(_)));
        assert_eq!(get_content(&original.content_id), Some(original));
    }

    #[test]
    fn rejects_low_rate_and_null_token() {
        setup();
        let err = register(alice(), "video_001", UNIT / 10_000).unwrap_err();
        assert_eq!(err, LedgerError::RateTooLow { rate: UNIT / 10_000, minimum: UNIT / 1000 });

        let err = register_content(
            alice(),
            ContentId::from_label("video_002"),
            BillingToken::Ledger { canister: Principal::anonymous() },
            ContentType::Audio,
            UNIT,
            String::new(),
            NOW,
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::InvalidToken);
        assert_eq!(storage::content::count_content(), 0);
    }

    #[test]
    fn only_creator_updates_rate_and_deactivates() {
        setup();
        let id = register(alice(), "video_001", UNIT / 100).unwrap().content_id;

        assert_eq!(update_content_rate(bob(), id, UNIT, NOW).unwrap_err(), LedgerError::NotCreator);
        assert_eq!(deactivate_content(bob(), id, NOW).unwrap_err(), LedgerError::NotCreator);

        let updated = update_content_rate(alice(), id, UNIT / 50, NOW + 1).unwrap();
        assert_eq!(updated.rate_per_unit, UNIT / 50);
        assert_eq!(updated.updated_at, NOW + 1);

        deactivate_content(alice(), id, NOW + 2).unwrap();
        deactivate_content(alice(), id, NOW + 3).unwrap();
        assert!(!is_content_active(&id));
        assert_eq!(metrics::get_ledger_metrics().contents_deactivated, 1);
    }

    #[test]
    fn unknown_content_is_not_found() {
        setup();
        let id = ContentId::from_label("missing");
        assert!(matches!(
            update_content_rate(alice(), id, UNIT, NOW),
            Err(LedgerError::ContentNotFound(_))
        ));
        assert!(!is_content_active(&id));
        assert_eq!(get_content(&id), None);
    }

    #[test]
    fn privileged_counters_require_admin() {
        setup();
        let id = register(alice(), "video_001", UNIT / 100).unwrap().content_id;

        assert!(matches!(
            update_content_earnings(alice(), id, UNIT, NOW),
            Err(LedgerError::NotAuthorized(_))
        ));
        assert!(matches!(increment_content_view(bob(), id, NOW), Err(LedgerError::NotAuthorized(_))));

        update_content_earnings(admin(), id, UNIT, NOW).unwrap();
        let content = increment_content_view(admin(), id, NOW).unwrap();
        assert_eq!(content.total_earnings, UNIT);
        assert_eq!(content.total_views, 1);
    }
}
