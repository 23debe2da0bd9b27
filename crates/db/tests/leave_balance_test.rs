//! Integration tests for balance initialization, accrual and carry-forward.

mod common;

use rust_decimal_macros::dec;

use leavedesk_core::leave::{
    ApplyLeaveInput, LeaveDecision, LeaveError, LeavePolicyInput, LeaveType,
};
use leavedesk_core::org::AccessError;
use leavedesk_core::repository::{LeaveBalanceRepository, LeavePolicyRepository};

use common::{Fixture, date};

fn policies(fx: &Fixture) {
    let hr = fx.hr_actor();
    let service = fx.policy_service();

    let mut earned = LeavePolicyInput::new(LeaveType::EarnedLeave, dec!(12));
    earned.monthly_accrual = dec!(1.5);
    earned.carry_forward = true;
    earned.max_carry_forward = Some(dec!(5));
    service.create(&hr, earned).unwrap();

    service
        .create(&hr, LeavePolicyInput::new(LeaveType::CasualLeave, dec!(8)))
        .unwrap();

    let mut unpaid = LeavePolicyInput::new(LeaveType::LossOfPay, dec!(30));
    unpaid.active = true;
    service.create(&hr, unpaid).unwrap();

    let mut retired = LeavePolicyInput::new(LeaveType::CompOff, dec!(2));
    retired.active = false;
    service.create(&hr, retired).unwrap();
}

#[test]
fn test_initialize_creates_one_balance_per_active_policy() {
    let fx = Fixture::new();
    policies(&fx);
    let service = fx.balance_service();

    let created = service
        .initialize_for_employee(&fx.hr_actor(), fx.employee.id, 2024)
        .unwrap();
    assert_eq!(created.len(), 3);
    assert!(created.iter().all(|b| b.is_consistent() && b.used.is_zero()));
    assert!(!created.iter().any(|b| b.leave_type == LeaveType::CompOff));

    let earned = service
        .get_balance(&fx.employee_actor(), fx.employee.id, LeaveType::EarnedLeave, 2024)
        .unwrap();
    assert_eq!((earned.total_quota, earned.available), (dec!(12), dec!(12)));

    // Second run creates nothing.
    assert!(service
        .initialize_for_employee(&fx.hr_actor(), fx.employee.id, 2024)
        .unwrap()
        .is_empty());
}

#[test]
fn test_initialize_requires_hr_of_same_company() {
    let fx = Fixture::new();
    policies(&fx);

    let err = fx
        .balance_service()
        .initialize_for_employee(&fx.manager_actor(), fx.employee.id, 2024)
        .unwrap_err();
    assert!(matches!(err, LeaveError::Access(AccessError::RoleNotAllowed { .. })));
}

#[test]
fn test_monthly_accrual_adds_to_quota() {
    let fx = Fixture::new();
    policies(&fx);
    let service = fx.balance_service();
    service
        .initialize_for_employee(&fx.hr_actor(), fx.employee.id, 2024)
        .unwrap();

    let updated = service
        .process_monthly_accrual(&fx.hr_actor(), fx.company.id, 2024, 1)
        .unwrap();
    assert_eq!(updated, 1);

    let earned = fx.balance_of(&fx.employee, LeaveType::EarnedLeave, 2024);
    assert_eq!((earned.total_quota, earned.available), (dec!(13.5), dec!(13.5)));
    let casual = fx.balance_of(&fx.employee, LeaveType::CasualLeave, 2024);
    assert_eq!(casual.total_quota, dec!(8));

    let err = service
        .process_monthly_accrual(&fx.hr_actor(), fx.company.id, 2024, 13)
        .unwrap_err();
    assert!(matches!(err, LeaveError::InvalidMonth(13)));
}

#[test]
fn test_accrual_keeps_reservations() {
    let fx = Fixture::new();
    policies(&fx);
    fx.balance_service()
        .initialize_for_employee(&fx.hr_actor(), fx.employee.id, 2024)
        .unwrap();
    fx.leave_service()
        .apply(
            &fx.employee_actor(),
            ApplyLeaveInput::full_days(LeaveType::EarnedLeave, date(2024, 1, 2), date(2024, 1, 3)),
        )
        .unwrap();

    fx.balance_service()
        .process_monthly_accrual(&fx.hr_actor(), fx.company.id, 2024, 2)
        .unwrap();

    let earned = fx.balance_of(&fx.employee, LeaveType::EarnedLeave, 2024);
    assert_eq!(earned.pending, dec!(2));
    assert_eq!(earned.available, dec!(11.5));
    assert!(earned.is_consistent());
}

#[test]
fn test_year_end_carry_forward_is_capped() {
    let fx = Fixture::new();
    policies(&fx);
    let service = fx.balance_service();
    service
        .initialize_for_employee(&fx.hr_actor(), fx.employee.id, 2024)
        .unwrap();
    service
        .initialize_for_employee(&fx.hr_actor(), fx.employee.id, 2025)
        .unwrap();

    let updated = service
        .process_year_end_carry_forward(&fx.hr_actor(), fx.company.id, 2024)
        .unwrap();
    assert_eq!(updated, 1);

    let next = fx.balance_of(&fx.employee, LeaveType::EarnedLeave, 2025);
    assert_eq!(next.carried_forward, dec!(5));
    assert_eq!((next.total_quota, next.available), (dec!(17), dec!(17)));

    // Casual leave does not carry forward.
    let casual = fx.balance_of(&fx.employee, LeaveType::CasualLeave, 2025);
    assert_eq!(casual.carried_forward, dec!(0));

    // Rerunning does not grant the days twice.
    service
        .process_year_end_carry_forward(&fx.hr_actor(), fx.company.id, 2024)
        .unwrap();
    assert_eq!(
        fx.balance_of(&fx.employee, LeaveType::EarnedLeave, 2025).total_quota,
        dec!(17)
    );
}

#[test]
fn test_carry_forward_limited_by_available() {
    let fx = Fixture::new();
    policies(&fx);
    fx.seed_balance(&fx.employee, LeaveType::EarnedLeave, 2024, dec!(3));
    fx.seed_balance(&fx.employee, LeaveType::EarnedLeave, 2025, dec!(12));
    // A colleague without a next-year row is skipped.
    let other = fx.add_report("Lee");
    fx.seed_balance(&other, LeaveType::EarnedLeave, 2024, dec!(12));

    let updated = fx
        .balance_service()
        .process_year_end_carry_forward(&fx.hr_actor(), fx.company.id, 2024)
        .unwrap();
    assert_eq!(updated, 1);
    assert_eq!(
        fx.balance_of(&fx.employee, LeaveType::EarnedLeave, 2025).carried_forward,
        dec!(3)
    );
}

#[test]
fn test_loss_of_pay_days() {
    let fx = Fixture::new();
    policies(&fx);
    fx.balance_service()
        .initialize_for_employee(&fx.hr_actor(), fx.employee.id, 2024)
        .unwrap();
    let leave = fx.leave_service();
    let app = leave
        .apply(
            &fx.employee_actor(),
            ApplyLeaveInput::full_days(LeaveType::LossOfPay, date(2024, 1, 2), date(2024, 1, 4)),
        )
        .unwrap();
    leave
        .approve_by_manager(&fx.manager_actor(), app.id, &LeaveDecision::approve())
        .unwrap();

    let days = fx
        .balance_service()
        .loss_of_pay_days(&fx.hr_actor(), fx.employee.id, 2024)
        .unwrap();
    assert_eq!(days, dec!(3));
}

#[test]
fn test_balance_queries() {
    let fx = Fixture::new();
    policies(&fx);
    let service = fx.balance_service();
    service
        .initialize_for_employee(&fx.hr_actor(), fx.employee.id, 2024)
        .unwrap();

    let mine = service
        .employee_balances(&fx.employee_actor(), fx.employee.id, 2024)
        .unwrap();
    assert_eq!(mine.len(), 3);

    let err = service
        .get_balance(&fx.employee_actor(), fx.employee.id, LeaveType::SickLeave, 2024)
        .unwrap_err();
    assert!(matches!(err, LeaveError::BalanceNotFound { year: 2024, .. }));
    assert_eq!(err.status_code(), 404);

    // Soft-deleted rows disappear from queries.
    fx.store.soft_delete_balance(&leavedesk_core::leave::BalanceKey::new(
        fx.employee.id,
        LeaveType::CasualLeave,
        2024,
    ));
    assert_eq!(
        service
            .employee_balances(&fx.employee_actor(), fx.employee.id, 2024)
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        fx.store
            .list_balances_for_employee(fx.employee.id, 2024, true)
            .unwrap()
            .len(),
        3
    );
    assert_eq!(
        fx.store
            .list_policies(fx.company.id, true, false)
            .unwrap()
            .len(),
        3
    );
}
