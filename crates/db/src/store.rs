//! In-process store backing every repository trait.

use std::sync::Mutex;

use chrono::NaiveDate;
use dashmap::DashMap;
use tracing::debug;

use leavedesk_core::attendance::Attendance;
use leavedesk_core::holiday::Holiday;
use leavedesk_core::leave::{BalanceKey, LeaveApplication, LeaveBalance, LeavePolicy, LeaveType};
use leavedesk_core::org::{Company, Employee};
use leavedesk_shared::types::{
    AttendanceId, CompanyId, EmployeeId, HolidayId, LeaveApplicationId, LeavePolicyId,
};

/// Thread-safe in-memory store.
///
/// Each table is a [`DashMap`], so a write to one row only locks that
/// row's shard. Balance rows are keyed by `(employee, leave type, year)`,
/// which makes the key itself the unique constraint.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) companies: DashMap<CompanyId, Company>,
    pub(crate) employees: DashMap<EmployeeId, Employee>,
    pub(crate) applications: DashMap<LeaveApplicationId, LeaveApplication>,
    pub(crate) balances: DashMap<BalanceKey, LeaveBalance>,
    pub(crate) policies: DashMap<LeavePolicyId, LeavePolicy>,
    /// Live policy per (company, leave type).
    pub(crate) policy_index: DashMap<(CompanyId, LeaveType), LeavePolicyId>,
    /// Serializes policy writes that move index entries.
    pub(crate) policy_writes: Mutex<()>,
    pub(crate) holidays: DashMap<HolidayId, Holiday>,
    pub(crate) attendance: DashMap<AttendanceId, Attendance>,
    /// Live attendance record per (employee, date).
    pub(crate) attendance_days: DashMap<(EmployeeId, NaiveDate), AttendanceId>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a company.
    pub fn insert_company(&self, company: Company) {
        debug!(company_id = %company.id, name = %company.name, "Stored company");
        self.companies.insert(company.id, company);
    }

    /// Adds or replaces an employee.
    pub fn insert_employee(&self, employee: Employee) {
        debug!(
            employee_id = %employee.id,
            company_id = %employee.company_id,
            role = %employee.role,
            "Stored employee"
        );
        self.employees.insert(employee.id, employee);
    }

    /// Soft-deletes an employee. Returns false if the employee is unknown.
    pub fn soft_delete_employee(&self, id: EmployeeId) -> bool {
        self.employees
            .get_mut(&id)
            .map(|mut employee| employee.deleted = true)
            .is_some()
    }

    /// Soft-deletes a balance row. Returns false if no live row exists.
    pub fn soft_delete_balance(&self, key: &BalanceKey) -> bool {
        match self.balances.get_mut(key) {
            Some(mut balance) if !balance.deleted => {
                balance.deleted = true;
                true
            }
            _ => false,
        }
    }
}
