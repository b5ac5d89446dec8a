// src/backend/services/config_service.rs
use crate::{
    error::LedgerError,
    models::{audit_log::LogAction, common::{PrincipalId, TimestampNs}, LedgerSettings, SpendingPeriod},
    services::audit_service,
    storage::config,
    utils::guards::check_admin,
};

/// Rejects settings that would disable a floor or make the default limit
/// unreachable.
pub fn validate_settings(settings: &LedgerSettings) -> Result<(), LedgerError> {
    if settings.min_rate_per_unit == 0 || settings.min_payment == 0 {
        return Err(LedgerError::InvalidInput("Minimum rate and payment must be non-zero".to_string()));
    }
    if settings.default_monthly_limit > settings.max_monthly_limit {
        return Err(LedgerError::LimitExceedsMaximum {
            limit: settings.default_monthly_limit,
            maximum: settings.max_monthly_limit,
        });
    }
    if settings.max_metadata_len == 0 {
        return Err(LedgerError::InvalidInput("Metadata length cap must be non-zero".to_string()));
    }
    if let SpendingPeriod::Rolling { seconds: 0 } = settings.spending_period {
        return Err(LedgerError::InvalidInput("Spending period must be non-empty".to_string()));
    }
    Ok(())
}

/// Replaces the ledger settings. Existing accounts keep their limits; the
/// new spending period applies from each account's next roll.
pub fn update_settings(
    caller: PrincipalId,
    settings: LedgerSettings,
    now: TimestampNs,
) -> Result<LedgerSettings, LedgerError> {
    check_admin(&caller)?;
    validate_settings(&settings)?;
    config::set_settings(settings.clone())?;
    audit_service::record(caller, LogAction::SettingsUpdated, "settings", Some(format!("{:?}", settings)), now);
    crate::log_info!("config", "Settings updated by {}", caller);
    Ok(settings)
}

/// Stores the init/upgrade configuration after validating it.
pub fn install(admin: PrincipalId, settings: Option<LedgerSettings>) -> Result<(), LedgerError> {
    let settings = settings.unwrap_or_default();
    validate_settings(&settings)?;
    config::init_config(admin, settings)?;
    crate::log_info!("config", "Ledger configured with admin {}", admin);
    Ok(())
}

/// Upgrade path: keeps the stored admin unless a new one is supplied, and
/// keeps the stored settings unless new ones are supplied.
pub fn reinstall(admin: Option<PrincipalId>, settings: Option<LedgerSettings>) -> Result<(), LedgerError> {
    let current = config::get_config();
    let settings = settings.unwrap_or(current.settings);
    validate_settings(&settings)?;
    let admin = admin.unwrap_or(current.admin);
    config::init_config(admin, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::UNIT;
    use candid::Principal;

    fn admin() -> Principal {
        Principal::from_slice(&[1; 29])
    }

    #[test]
    fn admin_updates_valid_settings() {
        install(admin(), None).unwrap();
        let settings = LedgerSettings {
            spending_period: SpendingPeriod::CalendarMonth,
            ..LedgerSettings::default()
        };
        update_settings(admin(), settings.clone(), 1).unwrap();
        assert_eq!(config::get_settings(), settings);

        let intruder = Principal::from_slice(&[2; 29]);
        assert!(matches!(
            update_settings(intruder, LedgerSettings::default(), 2),
            Err(LedgerError::NotAuthorized(_))
        ));
    }

    #[test]
    fn rejects_inconsistent_settings() {
        let bad = LedgerSettings {
            default_monthly_limit: 200 * UNIT,
            ..LedgerSettings::default()
        };
        assert!(matches!(validate_settings(&bad), Err(LedgerError::LimitExceedsMaximum { .. })));

        let free = LedgerSettings { min_rate_per_unit: 0, ..LedgerSettings::default() };
        assert!(matches!(validate_settings(&free), Err(LedgerError::InvalidInput(_))));

        let empty = LedgerSettings {
            spending_period: SpendingPeriod::Rolling { seconds: 0 },
            ..LedgerSettings::default()
        };
        assert!(validate_settings(&empty).is_err());
    }

    #[test]
    fn reinstall_keeps_stored_values() {
        install(admin(), None).unwrap();
        reinstall(None, None).unwrap();
        assert_eq!(config::get_admin_principal(), admin());
        assert_eq!(config::get_settings(), LedgerSettings::default());
    }
}
