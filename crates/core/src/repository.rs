//! Storage seams.
//!
//! These traits are implemented by the db crate. Every query that can see
//! soft-deleted rows takes an explicit `include_deleted` flag; nothing is
//! filtered implicitly.

use thiserror::Error;

use chrono::NaiveDate;

use leavedesk_shared::types::{
    AttendanceId, CompanyId, EmployeeId, HolidayId, LeaveApplicationId, LeavePolicyId,
};

use crate::attendance::Attendance;
use crate::calendar::DateRange;
use crate::holiday::Holiday;
use crate::leave::{BalanceKey, LeaveApplication, LeaveBalance, LeavePolicy, LeaveStatus, LeaveType};
use crate::org::{Company, Employee};

/// Unique constraint guarding one live policy per (company, leave type).
pub const POLICY_UNIQUE_CONSTRAINT: &str = "leave_policies_company_leave_type";

/// Unique constraint guarding one balance row per (employee, leave type, year).
pub const BALANCE_UNIQUE_CONSTRAINT: &str = "leave_balances_employee_type_year";

/// Unique constraint guarding one live attendance record per (employee, date).
pub const ATTENDANCE_UNIQUE_CONSTRAINT: &str = "attendance_employee_date";

/// Failures reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A write would break a unique constraint.
    #[error("Unique constraint {constraint} violated")]
    UniqueViolation {
        /// Name of the violated constraint.
        constraint: String,
    },

    /// An update targeted a row that does not exist.
    #[error("{entity} {id} does not exist")]
    MissingRow {
        /// Entity kind.
        entity: &'static str,
        /// Row identifier.
        id: String,
    },

    /// A conditional update found the row in another state.
    #[error("{entity} {id} was modified concurrently")]
    StaleRow {
        /// Entity kind.
        entity: &'static str,
        /// Row identifier.
        id: String,
    },

    /// Any other backend failure.
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true if this is a violation of `constraint`.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint: c } if c == constraint)
    }
}

/// Read access to companies and employees.
pub trait EmployeeDirectory: Send + Sync {
    /// Find an employee by ID.
    fn find_employee(
        &self,
        id: EmployeeId,
        include_deleted: bool,
    ) -> Result<Option<Employee>, StoreError>;

    /// Employees whose manager is `manager_id`.
    fn list_direct_reports(
        &self,
        manager_id: EmployeeId,
        include_deleted: bool,
    ) -> Result<Vec<Employee>, StoreError>;

    /// Find a company by ID.
    fn find_company(
        &self,
        id: CompanyId,
        include_deleted: bool,
    ) -> Result<Option<Company>, StoreError>;
}

/// Persistence for leave applications.
pub trait LeaveApplicationRepository: Send + Sync {
    /// Insert a new application.
    fn insert_application(&self, application: LeaveApplication) -> Result<(), StoreError>;

    /// Replace an application whose stored status is still `expected`.
    ///
    /// Fails with `StoreError::StaleRow` if another writer moved it first.
    fn update_application(
        &self,
        application: &LeaveApplication,
        expected: LeaveStatus,
    ) -> Result<(), StoreError>;

    /// Find an application by ID.
    fn find_application(
        &self,
        id: LeaveApplicationId,
        include_deleted: bool,
    ) -> Result<Option<LeaveApplication>, StoreError>;

    /// Applications filed by `employee_id`, newest first.
    fn list_by_employee(
        &self,
        employee_id: EmployeeId,
        include_deleted: bool,
    ) -> Result<Vec<LeaveApplication>, StoreError>;

    /// Applications in a company, optionally restricted to one status, newest first.
    fn list_by_company(
        &self,
        company_id: CompanyId,
        status: Option<LeaveStatus>,
        include_deleted: bool,
    ) -> Result<Vec<LeaveApplication>, StoreError>;

    /// Live PENDING or APPROVED applications of `employee_id` sharing a date with `range`.
    fn find_overlapping(
        &self,
        employee_id: EmployeeId,
        range: &DateRange,
    ) -> Result<Vec<LeaveApplication>, StoreError>;
}

/// Persistence for leave balances.
pub trait LeaveBalanceRepository: Send + Sync {
    /// Insert a new balance row.
    ///
    /// Fails with [`BALANCE_UNIQUE_CONSTRAINT`] if a live row already exists for the key.
    fn insert_balance(&self, balance: LeaveBalance) -> Result<(), StoreError>;

    /// Find the balance row for `key`.
    fn find_balance(
        &self,
        key: &BalanceKey,
        include_deleted: bool,
    ) -> Result<Option<LeaveBalance>, StoreError>;

    /// All balances of an employee for a year.
    fn list_balances_for_employee(
        &self,
        employee_id: EmployeeId,
        year: i32,
        include_deleted: bool,
    ) -> Result<Vec<LeaveBalance>, StoreError>;

    /// All balances of a company for a year.
    fn list_balances_for_company(
        &self,
        company_id: CompanyId,
        year: i32,
        include_deleted: bool,
    ) -> Result<Vec<LeaveBalance>, StoreError>;

    /// Atomically read, mutate and write back the live balance row for `key`.
    ///
    /// Returns `None` without calling `f` when no live row exists. The
    /// closure runs while the row is locked, so concurrent callers are
    /// serialized.
    fn modify_balance<F, R>(&self, key: &BalanceKey, f: F) -> Result<Option<R>, StoreError>
    where
        F: FnOnce(&mut LeaveBalance) -> R;
}

/// Persistence for leave policies.
pub trait LeavePolicyRepository: Send + Sync {
    /// Insert a policy.
    ///
    /// Fails with [`POLICY_UNIQUE_CONSTRAINT`] if another live policy covers
    /// the same company and leave type.
    fn insert_policy(&self, policy: LeavePolicy) -> Result<(), StoreError>;

    /// Replace a policy, enforcing the same uniqueness as insert.
    fn update_policy(&self, policy: &LeavePolicy) -> Result<(), StoreError>;

    /// Find a policy by ID.
    fn find_policy(
        &self,
        id: LeavePolicyId,
        include_deleted: bool,
    ) -> Result<Option<LeavePolicy>, StoreError>;

    /// Find the policy of a company for one leave type.
    fn find_policy_by_type(
        &self,
        company_id: CompanyId,
        leave_type: LeaveType,
        include_deleted: bool,
    ) -> Result<Option<LeavePolicy>, StoreError>;

    /// Policies of a company.
    fn list_policies(
        &self,
        company_id: CompanyId,
        active_only: bool,
        include_deleted: bool,
    ) -> Result<Vec<LeavePolicy>, StoreError>;
}

/// Persistence for company holidays.
pub trait HolidayRepository: Send + Sync {
    /// Insert a holiday.
    fn insert_holiday(&self, holiday: Holiday) -> Result<(), StoreError>;

    /// Replace a holiday.
    fn update_holiday(&self, holiday: &Holiday) -> Result<(), StoreError>;

    /// Find a holiday by ID.
    fn find_holiday(&self, id: HolidayId, include_deleted: bool)
    -> Result<Option<Holiday>, StoreError>;

    /// Holidays of a company ordered by date.
    fn list_holidays(
        &self,
        company_id: CompanyId,
        active_only: bool,
        include_deleted: bool,
    ) -> Result<Vec<Holiday>, StoreError>;
}

/// Persistence for daily attendance records.
pub trait AttendanceRepository: Send + Sync {
    /// Insert a record.
    ///
    /// Fails with [`ATTENDANCE_UNIQUE_CONSTRAINT`] if the employee already
    /// has a live record for the date.
    fn insert_attendance(&self, attendance: Attendance) -> Result<(), StoreError>;

    /// Atomically read, mutate and write back a live record.
    ///
    /// Returns `None` without calling `f` when no live record exists.
    fn modify_attendance<F, R>(&self, id: AttendanceId, f: F) -> Result<Option<R>, StoreError>
    where
        F: FnOnce(&mut Attendance) -> R;

    /// Find a record by ID.
    fn find_attendance(
        &self,
        id: AttendanceId,
        include_deleted: bool,
    ) -> Result<Option<Attendance>, StoreError>;

    /// The live record of `employee_id` on `date`.
    fn find_attendance_on(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError>;

    /// Live records of an employee, optionally within `range`, newest first.
    fn list_attendance_for_employee(
        &self,
        employee_id: EmployeeId,
        range: Option<&DateRange>,
    ) -> Result<Vec<Attendance>, StoreError>;

    /// Live records of a company, optionally within `range`, newest first.
    fn list_attendance_for_company(
        &self,
        company_id: CompanyId,
        range: Option<&DateRange>,
    ) -> Result<Vec<Attendance>, StoreError>;

    /// Live records of a company with a correction awaiting review, oldest first.
    fn list_pending_corrections(&self, company_id: CompanyId)
    -> Result<Vec<Attendance>, StoreError>;
}

/// Everything the leave services need from storage.
pub trait LeaveStore:
    EmployeeDirectory + LeaveApplicationRepository + LeaveBalanceRepository + LeavePolicyRepository
{
}

impl<T> LeaveStore for T where
    T: EmployeeDirectory
        + LeaveApplicationRepository
        + LeaveBalanceRepository
        + LeavePolicyRepository
{
}
