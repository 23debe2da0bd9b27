//! Property-based tests for the leave lifecycle.
//!
//! Several applications share one balance row. Random decisions and
//! cancellations are replayed in random order and the balance is checked
//! after every step.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use leavedesk_shared::types::{CompanyId, EmployeeId, LeaveApplicationId};

use crate::leave::balance::{BalanceEffect, LeaveBalance};
use crate::leave::lifecycle::LeaveLifecycle;
use crate::leave::types::{LeaveApplication, LeaveDecision, LeaveStatus, LeaveType};

#[derive(Debug, Clone, Copy)]
enum Op {
    Manager(bool),
    Hr(bool),
    Cancel,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(Op::Manager),
        any::<bool>().prop_map(Op::Hr),
        Just(Op::Cancel),
    ]
}

/// Half-day multiples between 0.5 and 8.
fn arb_days() -> impl Strategy<Value = Decimal> {
    (1i64..=16).prop_map(|halves| Decimal::new(halves * 5, 1))
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn application(days: Decimal, requires_hr: bool) -> LeaveApplication {
    LeaveApplication {
        id: LeaveApplicationId::new(),
        employee_id: EmployeeId::new(),
        company_id: CompanyId::new(),
        leave_type: LeaveType::EarnedLeave,
        start_date: start(),
        end_date: start(),
        is_half_day: false,
        number_of_days: days,
        reason: None,
        attachment_url: None,
        status: LeaveStatus::Pending,
        requires_hr_approval: requires_hr,
        balance_year: Some(2024),
        manager_approval: None,
        hr_approval: None,
        rejection: None,
        created_at: Utc::now(),
        deleted: false,
    }
}

fn sum_days(apps: &[LeaveApplication], status: LeaveStatus) -> Decimal {
    apps.iter()
        .filter(|a| a.status == status)
        .map(|a| a.number_of_days)
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The balance stays consistent and mirrors application statuses under any ordering.
    #[test]
    fn prop_balance_tracks_applications(
        quota_halves in 0i64..60,
        requests in prop::collection::vec((arb_days(), any::<bool>()), 1..6),
        ops in prop::collection::vec((0usize..6, arb_op(), 0i64..3), 0..40),
    ) {
        let mut balance = LeaveBalance::new(
            EmployeeId::new(),
            CompanyId::new(),
            LeaveType::EarnedLeave,
            2024,
            Decimal::new(quota_halves * 5, 1),
        );
        let mut apps = Vec::new();
        for (days, requires_hr) in requests {
            if balance.try_reserve(days).is_ok() {
                apps.push(application(days, requires_hr));
            }
            prop_assert!(balance.is_consistent());
        }
        prop_assume!(!apps.is_empty());

        for (idx, op, day_offset) in ops {
            let idx = idx % apps.len();
            // Days before, on, and after the start date.
            let today = start() + chrono::Duration::days(day_offset - 1);
            let before = apps[idx].status;
            let days = apps[idx].number_of_days;
            let result = match op {
                Op::Manager(approve) => {
                    let decision = if approve { LeaveDecision::approve() } else { LeaveDecision::reject("no") };
                    LeaveLifecycle::manager_decision(&mut apps[idx], &decision, EmployeeId::new(), today)
                }
                Op::Hr(approve) => {
                    let decision = if approve { LeaveDecision::approve() } else { LeaveDecision::reject("no") };
                    LeaveLifecycle::hr_decision(&mut apps[idx], &decision, EmployeeId::new(), today)
                }
                Op::Cancel => LeaveLifecycle::cancel(&mut apps[idx], today),
            };

            match result {
                Ok(effect) => {
                    prop_assert_ne!(effect, BalanceEffect::Reserve);
                    prop_assert!(balance.apply(effect, days).is_ok());
                    let after = apps[idx].status;
                    prop_assert!(after == before || LeaveLifecycle::is_valid_transition(before, after));
                }
                Err(_) => prop_assert_eq!(apps[idx].status, before),
            }

            prop_assert!(balance.is_consistent());
            prop_assert_eq!(balance.pending, sum_days(&apps, LeaveStatus::Pending));
            prop_assert_eq!(balance.used, sum_days(&apps, LeaveStatus::Approved));
        }
    }

    /// Terminal statuses reject every further transition.
    #[test]
    fn prop_terminal_statuses_are_final(op in arb_op(), rejected in any::<bool>()) {
        let mut app = application(Decimal::ONE, true);
        app.status = if rejected { LeaveStatus::Rejected } else { LeaveStatus::Cancelled };
        let before = app.status;
        let result = match op {
            Op::Manager(approve) => {
                let decision = LeaveDecision { approved: approve, reason: None };
                LeaveLifecycle::manager_decision(&mut app, &decision, EmployeeId::new(), start())
            }
            Op::Hr(approve) => {
                let decision = LeaveDecision { approved: approve, reason: None };
                LeaveLifecycle::hr_decision(&mut app, &decision, EmployeeId::new(), start())
            }
            Op::Cancel => LeaveLifecycle::cancel(&mut app, start()),
        };
        prop_assert!(result.is_err());
        prop_assert_eq!(app.status, before);
    }
}
