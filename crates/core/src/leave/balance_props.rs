//! Property-based tests for balance arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use leavedesk_shared::types::{CompanyId, EmployeeId};

use crate::leave::balance::{BalanceEffect, LeaveBalance};
use crate::leave::types::LeaveType;

/// Non-negative day quantities in half-day steps.
fn arb_days() -> impl Strategy<Value = Decimal> {
    (0i64..40).prop_map(|halves| Decimal::new(halves * 5, 1))
}

fn arb_effect() -> impl Strategy<Value = BalanceEffect> {
    prop_oneof![
        Just(BalanceEffect::None),
        Just(BalanceEffect::Reserve),
        Just(BalanceEffect::Commit),
        Just(BalanceEffect::ReleasePending),
        Just(BalanceEffect::ReleaseUsed),
    ]
}

fn fresh(quota: Decimal) -> LeaveBalance {
    LeaveBalance::new(
        EmployeeId::new(),
        CompanyId::new(),
        LeaveType::CasualLeave,
        2024,
        quota,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any sequence of effects, accruals and carry-ins keeps the balance consistent.
    #[test]
    fn prop_invariant_survives_any_sequence(
        quota in arb_days(),
        steps in prop::collection::vec((arb_effect(), arb_days(), any::<bool>()), 0..50),
    ) {
        let mut balance = fresh(quota);
        for (effect, days, accrue) in steps {
            let _ = balance.apply(effect, days);
            if accrue {
                balance.accrue(days);
            }
            prop_assert!(balance.is_consistent(), "inconsistent after {:?}: {:?}", effect, balance);
            prop_assert!(balance.available >= Decimal::ZERO);
        }
    }

    /// A reservation either fits and lowers available by exactly `days`, or changes nothing.
    #[test]
    fn prop_reserve_is_all_or_nothing(quota in arb_days(), days in arb_days()) {
        let mut balance = fresh(quota);
        let before = balance.clone();
        match balance.try_reserve(days) {
            Ok(()) => {
                prop_assert_eq!(balance.available, before.available - days);
                prop_assert_eq!(balance.pending, days);
            }
            Err(_) => {
                prop_assert!(days > quota);
                prop_assert_eq!(balance, before);
            }
        }
    }

    /// Reserve followed by release restores the original balance.
    #[test]
    fn prop_reserve_release_round_trip(quota in arb_days(), days in arb_days(), approve in any::<bool>()) {
        prop_assume!(days <= quota);
        let mut balance = fresh(quota);
        let original = balance.clone();
        balance.try_reserve(days).unwrap();
        if approve {
            balance.commit(days);
            balance.release_used(days);
        } else {
            balance.release_pending(days);
        }
        prop_assert_eq!(balance, original);
    }

    /// Carry-forward never exceeds the cap or the available days.
    #[test]
    fn prop_carry_forward_bounded(quota in arb_days(), used in arb_days(), cap in arb_days()) {
        let mut balance = fresh(quota);
        let _ = balance.try_reserve(used);
        balance.commit(used);
        let amount = balance.carry_forward_amount(cap);
        prop_assert!(amount <= cap);
        prop_assert!(amount <= balance.available.max(Decimal::ZERO));
        prop_assert!(amount >= Decimal::ZERO);
    }
}
