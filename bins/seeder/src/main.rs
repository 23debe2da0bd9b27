//! Demo seeder for Leavedesk development.
//!
//! Seeds one company with an HR administrator, a manager and two
//! employees, creates the standard leave policies, initializes balances
//! for the current year, then walks a short and a long application
//! through approval so the log shows every balance movement.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use leavedesk_core::{Clock, SystemClock};
use leavedesk_core::attendance::{AttendanceService, PunchInput, WorkType};
use leavedesk_core::holiday::{HolidayInput, HolidayKind, HolidayService};
use leavedesk_core::leave::{
    ApplyLeaveInput, LeaveApplicationService, LeaveBalanceService, LeaveDecision,
    LeavePolicyInput, LeavePolicyService, LeaveType,
};
use leavedesk_core::org::{Actor, Company, Employee, Role};
use leavedesk_db::MemoryStore;
use leavedesk_shared::{AppConfig, LoggingConfig};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter.as_str()));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// The first Monday strictly after `from`.
fn next_monday(from: NaiveDate) -> NaiveDate {
    let mut day = from + Days::new(1);
    while day.weekday() != Weekday::Mon {
        day = day + Days::new(1);
    }
    day
}

fn standard_policies() -> Vec<LeavePolicyInput> {
    let mut earned = LeavePolicyInput::new(LeaveType::EarnedLeave, Decimal::from(15));
    earned.monthly_accrual = Decimal::new(125, 2);
    earned.carry_forward = true;
    earned.max_carry_forward = Some(Decimal::from(10));
    earned.encashment_allowed = true;

    let mut comp_off = LeavePolicyInput::new(LeaveType::CompOff, Decimal::ZERO);
    comp_off.half_day_allowed = false;

    vec![
        earned,
        LeavePolicyInput::new(LeaveType::SickLeave, Decimal::from(10)),
        LeavePolicyInput::new(LeaveType::CasualLeave, Decimal::from(8)),
        LeavePolicyInput::new(LeaveType::LossOfPay, Decimal::from(30)),
        comp_off,
    ]
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let store = Arc::new(MemoryStore::new());
    let clock = SystemClock;
    let today = clock.today();
    let year = today.year();

    info!("Seeding demo company...");
    let company = Company::new("Acme Corp");
    let hr = Employee::new(company.id, "Hana Okafor", "hana@acme.test", Role::HrAdmin);
    let manager = Employee::new(company.id, "Mira Sato", "mira@acme.test", Role::Manager);
    let sam = Employee::new(company.id, "Sam Reyes", "sam@acme.test", Role::Employee)
        .reporting_to(manager.id);
    let lee = Employee::new(company.id, "Lee Novak", "lee@acme.test", Role::Employee)
        .reporting_to(manager.id);
    store.insert_company(company.clone());
    for employee in [&hr, &manager, &sam, &lee] {
        store.insert_employee(employee.clone());
    }
    let hr_actor = Actor::from(&hr);

    info!("Seeding leave policies...");
    let policies = LeavePolicyService::new(Arc::clone(&store));
    for input in standard_policies() {
        policies.create(&hr_actor, input)?;
    }

    info!(year, "Initializing balances...");
    let balances = LeaveBalanceService::new(Arc::clone(&store));
    for employee in [&manager, &sam, &lee] {
        let created = balances.initialize_for_employee(&hr_actor, employee.id, year)?;
        info!(employee = %employee.full_name, rows = created.len(), "Balances ready");
    }

    info!("Seeding holidays...");
    let holidays = HolidayService::new(Arc::clone(&store), clock);
    let founders_day = next_monday(today) + Days::new(21);
    holidays.create(
        &hr_actor,
        HolidayInput::new("Founders Day", founders_day, HolidayKind::Company),
    )?;

    info!("Recording today's attendance...");
    let attendance = AttendanceService::new(Arc::clone(&store), clock);
    let opening = NaiveTime::from_hms_opt(9, 0, 0).context("invalid opening time")?;
    let closing = NaiveTime::from_hms_opt(18, 0, 0).context("invalid closing time")?;
    for employee in [&sam, &lee] {
        let actor = Actor::from(employee);
        attendance.punch(
            &actor,
            PunchInput::punch_in(today, opening).with_work_type(WorkType::Office),
        )?;
        attendance.punch(&actor, PunchInput::punch_out(today, closing))?;
    }
    let summary = attendance.monthly_summary(&Actor::from(&sam), year, today.month())?;
    info!(
        employee = %sam.full_name,
        present = summary.present_days,
        rate = %summary.rate,
        "Attendance this month"
    );

    let leave = LeaveApplicationService::new(Arc::clone(&store), clock, config.leave.clone());
    let manager_actor = Actor::from(&manager);
    let monday = next_monday(today);

    // Two days: the manager's approval is final.
    let short = leave.apply(
        &Actor::from(&sam),
        ApplyLeaveInput::full_days(LeaveType::CasualLeave, monday, monday + Days::new(1))
            .with_reason("Family visit"),
    )?;
    leave.approve_by_manager(&manager_actor, short.id, &LeaveDecision::approve())?;

    // Two full weeks: needs HR sign-off after the manager.
    let long = leave.apply(
        &Actor::from(&lee),
        ApplyLeaveInput::full_days(
            LeaveType::EarnedLeave,
            monday + Days::new(7),
            monday + Days::new(18),
        )
        .with_reason("Annual vacation"),
    )?;
    leave.approve_by_manager(&manager_actor, long.id, &LeaveDecision::approve())?;
    leave.approve_by_hr(&hr_actor, long.id, &LeaveDecision::approve())?;

    for (employee, leave_type) in [(&sam, LeaveType::CasualLeave), (&lee, LeaveType::EarnedLeave)] {
        let balance = balances.get_balance(&hr_actor, employee.id, leave_type, year)?;
        info!(
            employee = %employee.full_name,
            leave_type = %leave_type,
            total = %balance.total_quota,
            used = %balance.used,
            pending = %balance.pending,
            available = %balance.available,
            "Final balance"
        );
    }

    info!("Seeding complete!");
    Ok(())
}
