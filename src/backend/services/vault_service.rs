// src/backend/services/vault_service.rs
// Prepaid vault: user balances, spending limits, micropayments and creator
// earnings. Every mutation validates first and writes second, so a returned
// error leaves the vault untouched.

use crate::{
    error::LedgerError,
    metrics,
    models::{
        audit_log::LogAction,
        common::{format_amount, is_null_principal, Amount, CreatorId, PrincipalId, TimestampNs, UserId},
        ConservationReport, CreatorEarnings, LedgerSettings, MicropaymentRecord, PaymentReference, UserBalance,
    },
    services::audit_service,
    storage::{self, config::get_settings},
    utils::{
        guards::{check_admin, check_authenticated, expect_committed},
        time::{period_has_elapsed, period_start_for},
    },
};

const COMPONENT: &str = "vault";

/// Resets `monthly_spent` if the account's spending period has elapsed.
fn roll_period(account: &mut UserBalance, settings: &LedgerSettings, now: TimestampNs) {
    if period_has_elapsed(settings.spending_period, account.period_start, now) {
        account.monthly_spent = 0;
        account.period_start = period_start_for(settings.spending_period, now);
    }
}

fn new_account(settings: &LedgerSettings, now: TimestampNs) -> UserBalance {
    UserBalance {
        balance: 0,
        monthly_limit: settings.default_monthly_limit,
        monthly_spent: 0,
        period_start: period_start_for(settings.spending_period, now),
        created_at: now,
        last_activity: now,
    }
}

fn load_or_open(user: &UserId, settings: &LedgerSettings, now: TimestampNs) -> UserBalance {
    let mut account = storage::balances::get_user_balance(user).unwrap_or_else(|| new_account(settings, now));
    roll_period(&mut account, settings, now);
    account
}

fn commit_totals<F>(update_fn: F)
where
    F: FnOnce(&mut crate::models::VaultTotals) -> Result<(), LedgerError>,
{
    expect_committed(metrics::update_vault_totals(update_fn), "Vault totals");
}

/// Credits `amount` to the caller's balance. The first deposit opens the
/// account with the default monthly limit.
pub fn deposit(user: UserId, amount: Amount, now: TimestampNs) -> Result<UserBalance, LedgerError> {
    check_authenticated(&user)?;
    if amount == 0 {
        return Err(LedgerError::ZeroAmount);
    }
    let settings = get_settings();
    let mut account = load_or_open(&user, &settings, now);
    let totals = metrics::vault_totals();

    account.balance = account
        .balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::overflow("User balance"))?;
    let deposited = totals
        .total_deposited
        .checked_add(amount)
        .ok_or_else(|| LedgerError::overflow("Total deposited"))?;
    let held = totals.held.checked_add(amount).ok_or_else(|| LedgerError::overflow("Vault holdings"))?;
    account.last_activity = now;

    storage::balances::insert_user_balance(&user, account.clone());
    commit_totals(|t| {
        t.total_deposited = deposited;
        t.held = held;
        Ok(())
    });
    audit_service::record(user, LogAction::Deposit, user.to_text(), Some(format_amount(amount)), now);
    crate::log_info!(COMPONENT, "Deposit of {} by {}", format_amount(amount), user);
    Ok(account)
}

/// Releases `amount` of the caller's balance.
pub fn withdraw(user: UserId, amount: Amount, now: TimestampNs) -> Result<UserBalance, LedgerError> {
    if amount == 0 {
        return Err(LedgerError::ZeroAmount);
    }
    let settings = get_settings();
    let mut account = storage::balances::get_user_balance(&user).ok_or(LedgerError::InsufficientBalance {
        available: 0,
        requested: amount,
    })?;
    if account.balance < amount {
        return Err(LedgerError::InsufficientBalance {
            available: account.balance,
            requested: amount,
        });
    }
    roll_period(&mut account, &settings, now);

    let totals = metrics::vault_totals();
    let withdrawn = totals
        .total_withdrawn
        .checked_add(amount)
        .ok_or_else(|| LedgerError::overflow("Total withdrawn"))?;
    let held = totals.held.checked_sub(amount).ok_or_else(|| LedgerError::overflow("Vault holdings"))?;

    account.balance -= amount;
    account.last_activity = now;
    storage::balances::insert_user_balance(&user, account.clone());
    commit_totals(|t| {
        t.total_withdrawn = withdrawn;
        t.held = held;
        Ok(())
    });
    audit_service::record(user, LogAction::Withdrawal, user.to_text(), Some(format_amount(amount)), now);
    crate::log_info!(COMPONENT, "Withdrawal of {} by {}", format_amount(amount), user);
    Ok(account)
}

/// Sets the caller's per-period spending cap. Lowering it below what was
/// already spent is allowed; further payments fail until the period rolls.
pub fn set_monthly_limit(user: UserId, limit: Amount, now: TimestampNs) -> Result<UserBalance, LedgerError> {
    check_authenticated(&user)?;
    let settings = get_settings();
    if limit > settings.max_monthly_limit {
        return Err(LedgerError::LimitExceedsMaximum {
            limit,
            maximum: settings.max_monthly_limit,
        });
    }

    let mut account = load_or_open(&user, &settings, now);
    account.monthly_limit = limit;
    account.last_activity = now;
    storage::balances::insert_user_balance(&user, account.clone());
    audit_service::record(user, LogAction::MonthlyLimitSet, user.to_text(), Some(format_amount(limit)), now);
    Ok(account)
}

/// Moves `amount` from `payer`'s balance to `creator`'s pending earnings.
///
/// Checks run in this order: creator reference, minimum amount, balance,
/// monthly limit (after rolling an elapsed period). Nothing is written unless
/// all pass.
pub fn send_micropayment(
    payer: UserId,
    creator: CreatorId,
    amount: Amount,
    reference: PaymentReference,
    now: TimestampNs,
) -> Result<MicropaymentRecord, LedgerError> {
    if is_null_principal(&creator) {
        return Err(LedgerError::InvalidCreator);
    }
    let settings = get_settings();
    if amount == 0 {
        return Err(LedgerError::ZeroAmount);
    }
    if amount < settings.min_payment {
        return Err(LedgerError::AmountBelowMinimum {
            amount,
            minimum: settings.min_payment,
        });
    }

    let mut account = storage::balances::get_user_balance(&payer).ok_or(LedgerError::InsufficientBalance {
        available: 0,
        requested: amount,
    })?;
    if account.balance < amount {
        return Err(LedgerError::InsufficientBalance {
            available: account.balance,
            requested: amount,
        });
    }
    roll_period(&mut account, &settings, now);
    let spent = account
        .monthly_spent
        .checked_add(amount)
        .ok_or_else(|| LedgerError::overflow("Monthly spent"))?;
    if spent > account.monthly_limit {
        return Err(LedgerError::MonthlyLimitExceeded {
            limit: account.monthly_limit,
            spent: account.monthly_spent,
            requested: amount,
        });
    }

    let mut earnings = storage::balances::get_creator_earnings(&creator).unwrap_or_default();
    let total_earnings = earnings
        .total_earnings
        .checked_add(amount)
        .ok_or_else(|| LedgerError::overflow("Creator earnings"))?;
    let pending = earnings
        .pending_withdrawal
        .checked_add(amount)
        .ok_or_else(|| LedgerError::overflow("Pending earnings"))?;
    let totals = metrics::vault_totals();
    let volume = totals
        .micropayment_volume
        .checked_add(amount)
        .ok_or_else(|| LedgerError::overflow("Micropayment volume"))?;

    // Validation done; from here on every write must land.
    account.balance -= amount;
    account.monthly_spent = spent;
    account.last_activity = now;
    earnings.total_earnings = total_earnings;
    earnings.pending_withdrawal = pending;

    storage::balances::insert_user_balance(&payer, account);
    storage::balances::insert_creator_earnings(&creator, earnings);
    commit_totals(|t| {
        t.micropayments_processed = t.micropayments_processed.saturating_add(1);
        t.micropayment_volume = volume;
        Ok(())
    });

    let mut record = MicropaymentRecord {
        seq: storage::payments::next_payment_seq(),
        payer,
        creator,
        amount,
        reference,
        timestamp: now,
    };
    record.seq = expect_committed(storage::payments::append_payment(record.clone()), "Payment journal");
    audit_service::record(
        payer,
        LogAction::Micropayment,
        payer.to_text(),
        Some(format!("{} to {}", format_amount(amount), creator)),
        now,
    );
    Ok(record)
}

/// Pays out all pending earnings of the caller. Returns the amount released.
pub fn withdraw_creator_earnings(creator: CreatorId, now: TimestampNs) -> Result<Amount, LedgerError> {
    let mut earnings = storage::balances::get_creator_earnings(&creator).ok_or(LedgerError::NoPendingEarnings)?;
    let amount = earnings.pending_withdrawal;
    if amount == 0 {
        return Err(LedgerError::NoPendingEarnings);
    }

    let totals = metrics::vault_totals();
    let payouts = totals
        .total_creator_payouts
        .checked_add(amount)
        .ok_or_else(|| LedgerError::overflow("Creator payouts"))?;
    let held = totals.held.checked_sub(amount).ok_or_else(|| LedgerError::overflow("Vault holdings"))?;

    earnings.pending_withdrawal = 0;
    earnings.last_withdrawal = Some(now);
    storage::balances::insert_creator_earnings(&creator, earnings);
    commit_totals(|t| {
        t.total_creator_payouts = payouts;
        t.held = held;
        Ok(())
    });
    audit_service::record(
        creator,
        LogAction::CreatorWithdrawal,
        creator.to_text(),
        Some(format_amount(amount)),
        now,
    );
    crate::log_info!(COMPONENT, "Creator {} withdrew {}", creator, format_amount(amount));
    Ok(amount)
}

/// Balance view with the spending period rolled as of `now`. Unknown users
/// read as an empty account.
pub fn get_user_balance(user: &UserId, now: TimestampNs) -> UserBalance {
    let settings = get_settings();
    match storage::balances::get_user_balance(user) {
        Some(mut account) => {
            roll_period(&mut account, &settings, now);
            account
        }
        None => UserBalance::default(),
    }
}

pub fn get_creator_earnings(creator: &CreatorId) -> CreatorEarnings {
    storage::balances::get_creator_earnings(creator).unwrap_or_default()
}

/// Value currently held by the vault.
pub fn get_vault_balance() -> Amount {
    metrics::vault_totals().held
}

pub fn total_micropayments_processed() -> u64 {
    metrics::vault_totals().micropayments_processed
}

pub fn list_micropayments(offset: u64, limit: usize) -> (Vec<MicropaymentRecord>, u64) {
    (
        storage::payments::list_payments(offset, limit),
        storage::payments::payment_count(),
    )
}

pub fn get_user_payments(payer: &UserId) -> Vec<MicropaymentRecord> {
    storage::payments::get_payer_payments(payer)
}

/// Administrator drain: zeroes every user balance and pending earning and
/// releases the full holdings. Returns the drained amount.
pub fn emergency_withdraw(caller: PrincipalId, now: TimestampNs) -> Result<Amount, LedgerError> {
    check_admin(&caller)?;
    let totals = metrics::vault_totals();
    let drained = totals.held;
    let total_drained = totals
        .total_drained
        .checked_add(drained)
        .ok_or_else(|| LedgerError::overflow("Total drained"))?;

    for (user, mut account) in storage::balances::all_user_balances() {
        if account.balance == 0 {
            continue;
        }
        let released = account.balance;
        account.balance = 0;
        account.last_activity = now;
        storage::balances::insert_user_balance(&user, account);
        audit_service::record(
            caller,
            LogAction::EmergencyDrain,
            user.to_text(),
            Some(format!("balance {}", format_amount(released))),
            now,
        );
    }
    for (creator, mut earnings) in storage::balances::all_creator_earnings() {
        if earnings.pending_withdrawal == 0 {
            continue;
        }
        let released = earnings.pending_withdrawal;
        earnings.pending_withdrawal = 0;
        storage::balances::insert_creator_earnings(&creator, earnings);
        audit_service::record(
            caller,
            LogAction::EmergencyDrain,
            creator.to_text(),
            Some(format!("earnings {}", format_amount(released))),
            now,
        );
    }

    commit_totals(|t| {
        t.total_drained = total_drained;
        t.held = 0;
        Ok(())
    });
    crate::log_warn!(COMPONENT, "Emergency withdrawal of {} by {}", format_amount(drained), caller);
    Ok(drained)
}

/// Recomputes the conservation equation over every account:
/// balances + pending earnings == held, and
/// deposited == held + withdrawn + creator payouts + drained.
pub fn audit_conservation() -> ConservationReport {
    let sum_user_balances = storage::balances::all_user_balances()
        .iter()
        .fold(0u128, |acc, (_, account)| acc.saturating_add(account.balance));
    let sum_pending_earnings = storage::balances::all_creator_earnings()
        .iter()
        .fold(0u128, |acc, (_, earnings)| acc.saturating_add(earnings.pending_withdrawal));
    let totals = metrics::vault_totals();

    let released = totals
        .held
        .checked_add(totals.total_withdrawn)
        .and_then(|v| v.checked_add(totals.total_creator_payouts))
        .and_then(|v| v.checked_add(totals.total_drained));
    let balanced = sum_user_balances.checked_add(sum_pending_earnings) == Some(totals.held)
        && released == Some(totals.total_deposited);

    if !balanced {
        crate::log_error!(COMPONENT, "Conservation check failed: {:?}", totals);
    }
    ConservationReport {
        sum_user_balances,
        sum_pending_earnings,
        totals,
        balanced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::UNIT;
    use crate::models::init::SECONDS_PER_DAY;
    use crate::models::SpendingPeriod;
    use crate::storage::config::init_config;
    use crate::utils::time::NANOS_PER_SEC;
    use candid::Principal;

    const NOW: TimestampNs = 1_700_000_000 * NANOS_PER_SEC;
    const MILLI: Amount = UNIT / 1000;

    fn admin() -> Principal {
        Principal::from_slice(&[1; 29])
    }

    fn user() -> Principal {
        Principal::from_slice(&[4; 29])
    }

    fn creator() -> Principal {
        Principal::from_slice(&[5; 29])
    }

    fn setup() {
        init_config(admin(), LedgerSettings::default()).unwrap();
    }

    fn pay(amount: Amount, now: TimestampNs) -> Result<MicropaymentRecord, LedgerError> {
        send_micropayment(user(), creator(), amount, PaymentReference::Label("test".into()), now)
    }

    #[test]
    fn first_deposit_opens_account_with_default_limit() {
        setup();
        let account = deposit(user(), 10 * UNIT, NOW).unwrap();
        assert_eq!(account.balance, 10 * UNIT);
        assert_eq!(account.monthly_limit, 10 * UNIT);
        assert_eq!(account.period_start, NOW);
        assert_eq!(get_vault_balance(), 10 * UNIT);
        assert_eq!(deposit(user(), 0, NOW).unwrap_err(), LedgerError::ZeroAmount);
    }

    #[test]
    fn limits_and_micropayment_flow() {
        setup();
        deposit(user(), 10 * UNIT, NOW).unwrap();
        set_monthly_limit(user(), 5 * UNIT, NOW).unwrap();

        let record = pay(MILLI, NOW).unwrap();
        assert_eq!(record.seq, 0);
        let account = get_user_balance(&user(), NOW);
        assert_eq!(account.balance, 10 * UNIT - MILLI);
        assert_eq!(account.monthly_spent, MILLI);

        let earnings = get_creator_earnings(&creator());
        assert_eq!(earnings.total_earnings, MILLI);
        assert_eq!(earnings.pending_withdrawal, MILLI);

        assert!(matches!(pay(6 * UNIT, NOW), Err(LedgerError::MonthlyLimitExceeded { .. })));
        assert!(matches!(pay(15 * UNIT, NOW), Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(
            send_micropayment(user(), Principal::anonymous(), MILLI, PaymentReference::Label("x".into()), NOW)
                .unwrap_err(),
            LedgerError::InvalidCreator
        );
        assert_eq!(total_micropayments_processed(), 1);
        assert!(audit_conservation().balanced);
    }

    #[test]
    fn payment_at_exact_headroom_succeeds() {
        setup();
        deposit(user(), 10 * UNIT, NOW).unwrap();
        set_monthly_limit(user(), 2 * UNIT, NOW).unwrap();
        pay(UNIT, NOW).unwrap();
        pay(UNIT, NOW).unwrap();
        assert!(matches!(pay(MILLI, NOW), Err(LedgerError::MonthlyLimitExceeded { .. })));
    }

    #[test]
    fn below_minimum_and_zero_amounts_rejected() {
        setup();
        deposit(user(), UNIT, NOW).unwrap();
        assert_eq!(pay(0, NOW).unwrap_err(), LedgerError::ZeroAmount);
        assert_eq!(
            pay(MILLI - 1, NOW).unwrap_err(),
            LedgerError::AmountBelowMinimum { amount: MILLI - 1, minimum: MILLI }
        );
        assert_eq!(get_user_balance(&user(), NOW).balance, UNIT);
    }

    #[test]
    fn limit_above_maximum_rejected() {
        setup();
        let err = set_monthly_limit(user(), 101 * UNIT, NOW).unwrap_err();
        assert_eq!(err, LedgerError::LimitExceedsMaximum { limit: 101 * UNIT, maximum: 100 * UNIT });
    }

    #[test]
    fn spending_resets_after_period() {
        setup();
        deposit(user(), 10 * UNIT, NOW).unwrap();
        set_monthly_limit(user(), UNIT, NOW).unwrap();
        pay(UNIT, NOW).unwrap();
        assert!(matches!(pay(MILLI, NOW), Err(LedgerError::MonthlyLimitExceeded { .. })));

        let later = NOW + 30 * SECONDS_PER_DAY * NANOS_PER_SEC;
        assert_eq!(get_user_balance(&user(), later).monthly_spent, 0);
        pay(UNIT, later).unwrap();
        assert_eq!(get_user_balance(&user(), later).period_start, later);
    }

    #[test]
    fn calendar_month_period_rolls_on_the_first() {
        let settings = LedgerSettings {
            spending_period: SpendingPeriod::CalendarMonth,
            ..LedgerSettings::default()
        };
        init_config(admin(), settings).unwrap();
        // 2024-03-15T12:00:00Z and 2024-04-01T00:00:00Z
        let mid_march = 1_710_504_000 * NANOS_PER_SEC;
        let april = 1_711_929_600 * NANOS_PER_SEC;

        deposit(user(), 10 * UNIT, mid_march).unwrap();
        set_monthly_limit(user(), UNIT, mid_march).unwrap();
        pay(UNIT, mid_march).unwrap();
        assert!(pay(MILLI, april - 1).is_err());
        pay(MILLI, april).unwrap();
    }

    #[test]
    fn withdraw_and_creator_withdrawal() {
        setup();
        deposit(user(), 10 * UNIT, NOW).unwrap();
        pay(UNIT, NOW).unwrap();

        assert!(matches!(withdraw(user(), 10 * UNIT, NOW), Err(LedgerError::InsufficientBalance { .. })));
        withdraw(user(), 4 * UNIT, NOW).unwrap();
        assert_eq!(withdraw_creator_earnings(creator(), NOW).unwrap(), UNIT);
        assert_eq!(withdraw_creator_earnings(creator(), NOW).unwrap_err(), LedgerError::NoPendingEarnings);

        let earnings = get_creator_earnings(&creator());
        assert_eq!(earnings.total_earnings, UNIT);
        assert_eq!(earnings.last_withdrawal, Some(NOW));
        assert_eq!(get_vault_balance(), 5 * UNIT);

        let report = audit_conservation();
        assert!(report.balanced);
        assert_eq!(report.totals.total_withdrawn, 4 * UNIT);
        assert_eq!(report.totals.total_creator_payouts, UNIT);
    }

    #[test]
    fn emergency_withdraw_drains_everything() {
        setup();
        deposit(user(), 10 * UNIT, NOW).unwrap();
        pay(2 * UNIT, NOW).unwrap();

        assert!(matches!(emergency_withdraw(user(), NOW), Err(LedgerError::NotAuthorized(_))));
        assert_eq!(emergency_withdraw(admin(), NOW).unwrap(), 10 * UNIT);
        assert_eq!(get_vault_balance(), 0);
        assert_eq!(get_user_balance(&user(), NOW).balance, 0);
        assert_eq!(get_creator_earnings(&creator()).pending_withdrawal, 0);

        let report = audit_conservation();
        assert!(report.balanced);
        assert_eq!(report.totals.total_drained, 10 * UNIT);
    }

    #[test]
    fn journal_records_payments_per_payer() {
        setup();
        deposit(user(), UNIT, NOW).unwrap();
        pay(MILLI, NOW).unwrap();
        pay(2 * MILLI, NOW + 1).unwrap();

        let (page, total) = list_micropayments(1, 10);
        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].amount, 2 * MILLI);
        assert_eq!(get_user_payments(&user()).len(), 2);
        assert!(get_user_payments(&creator()).is_empty());
    }
}
