//! Shared fixture for service-level integration tests.
//!
//! Seeds one company with an HR administrator, a manager and an employee
//! reporting to that manager. "Today" is Monday 2024-01-01 unless a test
//! builds a service with its own clock.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use leavedesk_core::FixedClock;
use leavedesk_core::attendance::AttendanceService;
use leavedesk_core::holiday::HolidayService;
use leavedesk_core::leave::{
    LeaveApplicationService, LeaveBalance, LeaveBalanceService, LeavePolicy, LeavePolicyInput,
    LeavePolicyService, LeaveType,
};
use leavedesk_core::org::{Actor, Company, Employee, Role};
use leavedesk_core::repository::{LeaveBalanceRepository, LeavePolicyRepository};
use leavedesk_db::MemoryStore;
use leavedesk_shared::LeaveConfig;
use leavedesk_shared::types::LeavePolicyId;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn today() -> NaiveDate {
    date(2024, 1, 1)
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub company: Company,
    pub hr: Employee,
    pub manager: Employee,
    pub employee: Employee,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let company = Company::new("Acme Corp");
        let hr = Employee::new(company.id, "Hana", "hana@acme.test", Role::HrAdmin);
        let manager = Employee::new(company.id, "Mira", "mira@acme.test", Role::Manager);
        let employee = Employee::new(company.id, "Sam", "sam@acme.test", Role::Employee)
            .reporting_to(manager.id);

        store.insert_company(company.clone());
        store.insert_employee(hr.clone());
        store.insert_employee(manager.clone());
        store.insert_employee(employee.clone());

        Self {
            store,
            company,
            hr,
            manager,
            employee,
        }
    }

    pub fn hr_actor(&self) -> Actor {
        Actor::from(&self.hr)
    }

    pub fn manager_actor(&self) -> Actor {
        Actor::from(&self.manager)
    }

    pub fn employee_actor(&self) -> Actor {
        Actor::from(&self.employee)
    }

    /// Adds another employee of the same company reporting to the manager.
    pub fn add_report(&self, name: &str) -> Employee {
        let employee = Employee::new(
            self.company.id,
            name,
            format!("{}@acme.test", name.to_lowercase()),
            Role::Employee,
        )
        .reporting_to(self.manager.id);
        self.store.insert_employee(employee.clone());
        employee
    }

    pub fn leave_service(&self) -> LeaveApplicationService<MemoryStore, FixedClock> {
        self.leave_service_on(today())
    }

    pub fn leave_service_on(
        &self,
        today: NaiveDate,
    ) -> LeaveApplicationService<MemoryStore, FixedClock> {
        LeaveApplicationService::new(
            Arc::clone(&self.store),
            FixedClock(today),
            LeaveConfig::default(),
        )
    }

    pub fn balance_service(&self) -> LeaveBalanceService<MemoryStore> {
        LeaveBalanceService::new(Arc::clone(&self.store))
    }

    pub fn policy_service(&self) -> LeavePolicyService<MemoryStore> {
        LeavePolicyService::new(Arc::clone(&self.store))
    }

    pub fn holiday_service(&self) -> HolidayService<MemoryStore, FixedClock> {
        HolidayService::new(Arc::clone(&self.store), FixedClock(today()))
    }

    pub fn attendance_service(&self) -> AttendanceService<MemoryStore, FixedClock> {
        self.attendance_service_on(today())
    }

    pub fn attendance_service_on(
        &self,
        today: NaiveDate,
    ) -> AttendanceService<MemoryStore, FixedClock> {
        AttendanceService::new(Arc::clone(&self.store), FixedClock(today))
    }

    /// Stores an active policy directly, bypassing the service.
    pub fn seed_policy(&self, leave_type: LeaveType, annual_quota: Decimal) -> LeavePolicy {
        let input = LeavePolicyInput::new(leave_type, annual_quota);
        let policy = LeavePolicy {
            id: LeavePolicyId::new(),
            company_id: self.company.id,
            leave_type,
            annual_quota,
            monthly_accrual: input.monthly_accrual,
            carry_forward: input.carry_forward,
            max_carry_forward: Decimal::ZERO,
            encashment_allowed: input.encashment_allowed,
            half_day_allowed: input.half_day_allowed,
            active: input.active,
            deleted: false,
        };
        self.store.insert_policy(policy.clone()).unwrap();
        policy
    }

    /// Stores a fresh balance for `employee` directly.
    pub fn seed_balance(
        &self,
        employee: &Employee,
        leave_type: LeaveType,
        year: i32,
        quota: Decimal,
    ) -> LeaveBalance {
        let balance = LeaveBalance::new(employee.id, employee.company_id, leave_type, year, quota);
        self.store.insert_balance(balance.clone()).unwrap();
        balance
    }

    /// Seeds a policy and a 2024 balance for the fixture employee.
    pub fn with_casual_leave(&self, quota: Decimal) -> LeaveBalance {
        self.seed_policy(LeaveType::CasualLeave, quota);
        self.seed_balance(&self.employee, LeaveType::CasualLeave, 2024, quota)
    }

    pub fn balance_of(&self, employee: &Employee, leave_type: LeaveType, year: i32) -> LeaveBalance {
        self.store
            .find_balance(
                &leavedesk_core::leave::BalanceKey::new(employee.id, leave_type, year),
                false,
            )
            .unwrap()
            .unwrap()
    }
}
