use crate::error::LedgerError;
use crate::storage::config::get_admin_principal;
use candid::Principal;

/// Checks if the caller is the designated admin principal.
///
/// # Errors
///
/// Returns `LedgerError::NotAuthorized` if the caller is not the admin.
pub fn check_admin(caller: &Principal) -> Result<(), LedgerError> {
    if *caller == get_admin_principal() {
        Ok(())
    } else {
        crate::log_warn!("guards", "Rejected privileged call from {}", caller);
        Err(LedgerError::NotAuthorized(format!("{} is not the administrator", caller)))
    }
}

pub fn is_admin(caller: &Principal) -> bool {
    *caller == get_admin_principal()
}

/// Mutating calls need an identity; the anonymous principal cannot own
/// balances, content or sessions.
pub fn check_authenticated(caller: &Principal) -> Result<(), LedgerError> {
    if *caller == Principal::anonymous() {
        Err(LedgerError::NotAuthorized("Anonymous caller".to_string()))
    } else {
        Ok(())
    }
}

/// Named guard for `#[update(guard = ...)]` endpoints.
pub fn admin_guard() -> Result<(), String> {
    check_admin(&ic_cdk::caller()).map_err(|e| e.to_string())
}

/// Named guard for endpoints that mutate caller-owned state.
pub fn authenticated_guard() -> Result<(), String> {
    check_authenticated(&ic_cdk::caller()).map_err(|e| e.to_string())
}

/// Aborts the current message after validation already passed. On the IC the
/// trap rolls back every write made by the message.
pub fn abort(message: &str) -> ! {
    crate::log_error!("guards", "Invariant breach, aborting: {}", message);
    #[cfg(target_arch = "wasm32")]
    ic_cdk::trap(message);
    #[cfg(not(target_arch = "wasm32"))]
    panic!("{}", message);
}

/// Unwraps a write that must succeed once validation has passed.
pub fn expect_committed<T>(result: Result<T, LedgerError>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => abort(&format!("{} failed after validation: {}", what, e)),
    }
}
