//! Ledger-wide properties checked over random operation sequences. Stable
//! state persists across cases on the test thread, so every property is
//! asserted against the running ledger rather than a fresh one.

use candid::Principal;
use micropay_backend::{
    error::LedgerError,
    models::{BillingToken, ContentId, ContentType, LedgerSettings, PaymentReference, TimestampNs, UNIT},
    services::{registry_service, session_service::stable_engine, vault_service},
    storage::config::init_config,
};
use proptest::prelude::*;

const NOW: TimestampNs = 1_700_000_000_000_000_000;

fn account(idx: u8) -> Principal {
    Principal::from_slice(&[idx + 20; 29])
}

#[derive(Clone, Debug)]
enum VaultOp {
    Deposit { user: u8, amount: u128 },
    Withdraw { user: u8, amount: u128 },
    SetLimit { user: u8, limit: u128 },
    Pay { user: u8, creator: u8, amount: u128 },
    CreatorWithdraw { creator: u8 },
}

fn arb_amount() -> impl Strategy<Value = u128> {
    prop_oneof![0u128..=UNIT / 100, UNIT / 1000..=5 * UNIT]
}

fn arb_op() -> impl Strategy<Value = VaultOp> {
    prop_oneof![
        (0u8..3, arb_amount()).prop_map(|(user, amount)| VaultOp::Deposit { user, amount }),
        (0u8..3, arb_amount()).prop_map(|(user, amount)| VaultOp::Withdraw { user, amount }),
        (0u8..3, 0u128..=20 * UNIT).prop_map(|(user, limit)| VaultOp::SetLimit { user, limit }),
        (0u8..3, 3u8..5, arb_amount()).prop_map(|(user, creator, amount)| VaultOp::Pay { user, creator, amount }),
        (3u8..5).prop_map(|creator| VaultOp::CreatorWithdraw { creator }),
    ]
}

fn apply(op: &VaultOp, now: TimestampNs) -> Result<(), LedgerError> {
    match *op {
        VaultOp::Deposit { user, amount } => vault_service::deposit(account(user), amount, now).map(|_| ()),
        VaultOp::Withdraw { user, amount } => vault_service::withdraw(account(user), amount, now).map(|_| ()),
        VaultOp::SetLimit { user, limit } => vault_service::set_monthly_limit(account(user), limit, now).map(|_| ()),
        VaultOp::Pay { user, creator, amount } => vault_service::send_micropayment(
            account(user),
            account(creator),
            amount,
            PaymentReference::Label("prop".into()),
            now,
        )
        .map(|_| ()),
        VaultOp::CreatorWithdraw { creator } => vault_service::withdraw_creator_earnings(account(creator), now).map(|_| ()),
    }
}

proptest! {
    /// Value is neither created nor destroyed, and no accepted payment pushes
    /// an account past its monthly limit.
    #[test]
    fn vault_conserves_value(ops in prop::collection::vec(arb_op(), 1..40)) {
        init_config(Principal::from_slice(&[1; 29]), LedgerSettings::default()).unwrap();
        for (step, op) in ops.iter().enumerate() {
            let now = NOW + step as u64;
            let before = vault_service::get_user_balance(&account(0), now);
            let result = apply(op, now);

            let report = vault_service::audit_conservation();
            prop_assert!(report.balanced, "conservation broken after {:?}: {:?}", op, report);
            match (op, &result) {
                (VaultOp::Pay { user, .. }, Ok(())) => {
                    let payer = vault_service::get_user_balance(&account(*user), now);
                    prop_assert!(payer.monthly_spent <= payer.monthly_limit);
                }
                (VaultOp::Pay { user: 0, .. } | VaultOp::Withdraw { user: 0, .. }, Err(_)) => {
                    prop_assert_eq!(vault_service::get_user_balance(&account(0), now), before);
                }
                _ => {}
            }
        }
    }

    /// Accepted consumption reports strictly increase; stale ones change nothing.
    #[test]
    fn consumption_is_monotonic(reports in prop::collection::vec(0u128..1_000, 1..30)) {
        init_config(Principal::from_slice(&[1; 29]), LedgerSettings::default()).unwrap();
        let content_id = ContentId::from_label("prop_video");
        if registry_service::get_content(&content_id).is_none() {
            registry_service::register_content(
                account(3),
                content_id,
                BillingToken::Native,
                ContentType::Live,
                UNIT / 100,
                String::new(),
                NOW,
            )
            .unwrap();
        }

        let mut engine = stable_engine();
        let sid = engine.start_session(account(0), content_id, NOW).unwrap();
        let mut current = 0u128;
        for reported in reports {
            match engine.update_session(account(0), sid, reported, NOW) {
                Ok(session) => {
                    prop_assert!(reported > current);
                    prop_assert_eq!(session.total_consumption, reported);
                    current = reported;
                }
                Err(LedgerError::NoConsumptionIncrease { current: seen, .. }) => {
                    prop_assert!(reported <= current);
                    prop_assert_eq!(seen, current);
                }
                Err(LedgerError::InvalidConsumption) => prop_assert_eq!(reported, 0),
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
            prop_assert_eq!(engine.get_session(&sid).unwrap().total_consumption, current);
        }
    }

    /// Registration never overwrites: a second registration of an id fails
    /// and the stored record is unchanged.
    #[test]
    fn registration_is_not_an_upsert(label in "[a-z]{1,12}", rate in UNIT / 1000..UNIT) {
        init_config(Principal::from_slice(&[1; 29]), LedgerSettings::default()).unwrap();
        let content_id = ContentId::from_label(&label);
        let first = registry_service::register_content(
            account(3), content_id, BillingToken::Native, ContentType::Text, rate, String::new(), NOW,
        );
        let stored = registry_service::get_content(&content_id).unwrap();
        if first.is_ok() {
            prop_assert_eq!(stored.rate_per_unit, rate);
        }
        let second = registry_service::register_content(
            account(4), content_id, BillingToken::Native, ContentType::Audio, rate + 1, String::new(), NOW,
        );
        prop_assert!(matches!(second, Err(LedgerError::DuplicateContent(_))));
        prop_assert_eq!(registry_service::get_content(&content_id).unwrap(), stored);
    }
}

#[test]
fn payment_at_exact_headroom_then_one_unit_over() {
    init_config(Principal::from_slice(&[1; 29]), LedgerSettings::default()).unwrap();
    vault_service::deposit(account(0), 10 * UNIT, NOW).unwrap();
    vault_service::set_monthly_limit(account(0), UNIT, NOW).unwrap();
    vault_service::send_micropayment(account(0), account(3), UNIT / 2, PaymentReference::Label("a".into()), NOW).unwrap();

    let headroom = vault_service::get_user_balance(&account(0), NOW).remaining_allowance();
    vault_service::send_micropayment(account(0), account(3), headroom, PaymentReference::Label("b".into()), NOW).unwrap();
    assert!(matches!(
        vault_service::send_micropayment(account(0), account(3), UNIT / 1000, PaymentReference::Label("c".into()), NOW),
        Err(LedgerError::MonthlyLimitExceeded { .. })
    ));
}
