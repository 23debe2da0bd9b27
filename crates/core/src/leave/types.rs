//! Leave domain types.
//!
//! This module defines leave categories, the application status machine's
//! states, leave applications and their audit fields, and per-company
//! leave policies.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use leavedesk_shared::types::{CompanyId, EmployeeId, LeaveApplicationId, LeavePolicyId};

use crate::calendar::DateRange;

/// Category of leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    /// Casual leave.
    CasualLeave,
    /// Sick leave.
    SickLeave,
    /// Earned (privilege) leave.
    EarnedLeave,
    /// Unpaid leave.
    LossOfPay,
    /// Compensatory off for extra days worked.
    CompOff,
    /// Employee-chosen optional holiday.
    OptionalHoliday,
}

impl LeaveType {
    /// Returns the string representation of the leave type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CasualLeave => "CASUAL_LEAVE",
            Self::SickLeave => "SICK_LEAVE",
            Self::EarnedLeave => "EARNED_LEAVE",
            Self::LossOfPay => "LOSS_OF_PAY",
            Self::CompOff => "COMP_OFF",
            Self::OptionalHoliday => "OPTIONAL_HOLIDAY",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leave application status.
///
/// The valid transitions are:
/// - Pending → Approved (manager approval, or HR approval after the manager)
/// - Pending → Rejected (manager or HR rejection)
/// - Pending → Cancelled (applicant)
/// - Approved → Cancelled (applicant, before the leave starts)
///
/// Rejected and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    /// Awaiting approval.
    Pending,
    /// Fully approved.
    Approved,
    /// Rejected by a manager or HR.
    Rejected,
    /// Withdrawn by the applicant.
    Cancelled,
}

impl LeaveStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }

    /// Returns true if an application in this status occupies its dates.
    #[must_use]
    pub fn occupies_dates(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign-off recorded on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    /// Who signed off.
    pub approved_by: EmployeeId,
    /// When.
    pub approved_on: NaiveDate,
}

/// Rejection recorded on an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Who rejected.
    pub rejected_by: EmployeeId,
    /// Reason given, if any.
    pub reason: Option<String>,
    /// When.
    pub rejected_on: NaiveDate,
}

/// A leave application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// Unique identifier.
    pub id: LeaveApplicationId,
    /// Applicant.
    pub employee_id: EmployeeId,
    /// Applicant's company at the time of applying.
    pub company_id: CompanyId,
    /// Leave category.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Half-day application (start and end are the same date).
    pub is_half_day: bool,
    /// Working days charged.
    pub number_of_days: Decimal,
    /// Applicant's reason.
    pub reason: Option<String>,
    /// Supporting document link.
    pub attachment_url: Option<String>,
    /// Current status.
    pub status: LeaveStatus,
    /// Needs HR sign-off after the manager.
    pub requires_hr_approval: bool,
    /// Year of the balance row the days were reserved against, if one existed.
    pub balance_year: Option<i32>,
    /// Manager sign-off.
    pub manager_approval: Option<Approval>,
    /// HR sign-off.
    pub hr_approval: Option<Approval>,
    /// Rejection details.
    pub rejection: Option<Rejection>,
    /// When the application was created.
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted: bool,
}

impl LeaveApplication {
    /// The dates covered by the application.
    #[must_use]
    pub fn range(&self) -> DateRange {
        // start <= end is enforced when the application is created
        DateRange::new(self.start_date, self.end_date)
            .unwrap_or_else(|_| DateRange::single(self.start_date))
    }

    /// Awaiting the applicant's manager.
    #[must_use]
    pub fn awaits_manager(&self) -> bool {
        self.status == LeaveStatus::Pending && self.manager_approval.is_none()
    }

    /// Manager-approved and waiting on HR.
    #[must_use]
    pub fn awaits_hr(&self) -> bool {
        self.status == LeaveStatus::Pending
            && self.requires_hr_approval
            && self.manager_approval.is_some()
            && self.hr_approval.is_none()
    }
}

/// Request to apply for leave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyLeaveInput {
    /// Leave category.
    pub leave_type: LeaveType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Half-day request.
    #[serde(default)]
    pub is_half_day: bool,
    /// Reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Supporting document link.
    #[serde(default)]
    pub attachment_url: Option<String>,
}

impl ApplyLeaveInput {
    /// A full-day request with no reason or attachment.
    #[must_use]
    pub fn full_days(leave_type: LeaveType, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            leave_type,
            start_date,
            end_date,
            is_half_day: false,
            reason: None,
            attachment_url: None,
        }
    }

    /// A half-day request on `date`.
    #[must_use]
    pub fn half_day(leave_type: LeaveType, date: NaiveDate) -> Self {
        Self {
            is_half_day: true,
            ..Self::full_days(leave_type, date, date)
        }
    }

    /// Attaches a reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// An approver's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDecision {
    /// Approve (`true`) or reject (`false`).
    pub approved: bool,
    /// Reason, recorded on rejection.
    #[serde(default)]
    pub reason: Option<String>,
}

impl LeaveDecision {
    /// Approve.
    #[must_use]
    pub fn approve() -> Self {
        Self {
            approved: true,
            reason: None,
        }
    }

    /// Reject with a reason.
    #[must_use]
    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: Some(reason.into()),
        }
    }
}

/// Per-company rules for one leave type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeavePolicy {
    /// Unique identifier.
    pub id: LeavePolicyId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Leave category governed by this policy.
    pub leave_type: LeaveType,
    /// Days granted per year.
    pub annual_quota: Decimal,
    /// Days added to the quota each month.
    pub monthly_accrual: Decimal,
    /// Unused days roll into next year.
    pub carry_forward: bool,
    /// Cap on days carried forward.
    pub max_carry_forward: Decimal,
    /// Unused days may be encashed.
    pub encashment_allowed: bool,
    /// Half-day applications accepted.
    pub half_day_allowed: bool,
    /// Applications accepted at all.
    pub active: bool,
    /// Soft-delete marker.
    pub deleted: bool,
}

/// Fields supplied when creating or updating a policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeavePolicyInput {
    /// Leave category.
    pub leave_type: LeaveType,
    /// Days granted per year.
    pub annual_quota: Decimal,
    /// Days added per month.
    #[serde(default)]
    pub monthly_accrual: Decimal,
    /// Roll unused days into next year.
    #[serde(default)]
    pub carry_forward: bool,
    /// Cap on carried days; required when `carry_forward` is set.
    #[serde(default)]
    pub max_carry_forward: Option<Decimal>,
    /// Unused days may be encashed.
    #[serde(default)]
    pub encashment_allowed: bool,
    /// Half-day applications accepted.
    #[serde(default = "default_true")]
    pub half_day_allowed: bool,
    /// Applications accepted at all.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl LeavePolicyInput {
    /// An active policy granting `annual_quota` days, half days allowed, no accrual or carry-forward.
    #[must_use]
    pub fn new(leave_type: LeaveType, annual_quota: Decimal) -> Self {
        Self {
            leave_type,
            annual_quota,
            monthly_accrual: Decimal::ZERO,
            carry_forward: false,
            max_carry_forward: None,
            encashment_allowed: false,
            half_day_allowed: true,
            active: true,
        }
    }
}
