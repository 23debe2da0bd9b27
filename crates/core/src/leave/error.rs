//! Leave error types.
//!
//! Every variant belongs to exactly one request-level category
//! (validation, authorization, not found, conflict) or is a storage
//! failure. The `From<LeaveError> for AppError` conversion preserves the
//! category.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use leavedesk_shared::AppError;
use leavedesk_shared::types::{EmployeeId, LeaveApplicationId, LeavePolicyId};

use super::balance::BalanceError;
use super::types::{LeaveStatus, LeaveType};
use crate::calendar::CalendarError;
use crate::org::AccessError;
use crate::repository::StoreError;

/// Errors that can occur during leave operations.
#[derive(Debug, Error)]
pub enum LeaveError {
    /// End date before start date.
    #[error("End date {end} is before start date {start}")]
    InvalidDateRange {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// Start date lies before today.
    #[error("Cannot apply for leave starting in the past ({0})")]
    StartDateInPast(NaiveDate),

    /// Half-day application covering more than one date.
    #[error("Half-day leave must start and end on the same date")]
    HalfDaySpansMultipleDays,

    /// Policy does not accept half days.
    #[error("Half-day leave is not allowed for {0}")]
    HalfDayNotAllowed(LeaveType),

    /// Policy exists but is switched off.
    #[error("Leave policy for {0} is not active")]
    PolicyInactive(LeaveType),

    /// Policy fields failed validation.
    #[error("Invalid leave policy: {0}")]
    InvalidPolicy(String),

    /// Month outside 1..=12.
    #[error("Invalid month {0}")]
    InvalidMonth(u32),

    /// No application with this ID.
    #[error("Leave application {0} not found")]
    ApplicationNotFound(LeaveApplicationId),

    /// No employee with this ID.
    #[error("Employee {0} not found")]
    EmployeeNotFound(EmployeeId),

    /// No policy with this ID.
    #[error("Leave policy {0} not found")]
    PolicyNotFound(LeavePolicyId),

    /// Company has no policy for the leave type.
    #[error("No leave policy configured for {0}")]
    NoPolicyForType(LeaveType),

    /// No balance row for the key.
    #[error("No {leave_type} balance for employee {employee_id} in {year}")]
    BalanceNotFound {
        /// Balance owner.
        employee_id: EmployeeId,
        /// Leave category.
        leave_type: LeaveType,
        /// Calendar year.
        year: i32,
    },

    /// Caller may not perform the operation.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Dates collide with an existing pending or approved application.
    #[error("Leave overlaps existing application {0}")]
    OverlappingLeave(LeaveApplicationId),

    /// Not enough days left.
    #[error("Insufficient leave balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Days requested.
        requested: Decimal,
        /// Days available.
        available: Decimal,
    },

    /// Approval attempted on an application that is no longer pending.
    #[error("Leave application is {0}, not PENDING")]
    NotPending(LeaveStatus),

    /// HR decision on an application that does not need one.
    #[error("HR approval is not required for this application")]
    HrApprovalNotRequired,

    /// HR decision before the manager signed off.
    #[error("Manager approval is required before HR approval")]
    ManagerApprovalMissing,

    /// Cancellation of a rejected or cancelled application.
    #[error("Leave application is already {0}")]
    AlreadyClosed(LeaveStatus),

    /// Cancellation of approved leave that has already begun.
    #[error("Cannot cancel leave that started on {0}")]
    LeaveAlreadyStarted(NaiveDate),

    /// A live policy already covers this leave type.
    #[error("A leave policy for {0} already exists")]
    DuplicatePolicy(LeaveType),

    /// Storage failure.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<CalendarError> for LeaveError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::EndBeforeStart { start, end } => Self::InvalidDateRange { start, end },
        }
    }
}

impl From<BalanceError> for LeaveError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::Insufficient {
                requested,
                available,
            } => Self::InsufficientBalance {
                requested,
                available,
            },
        }
    }
}

impl LeaveError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. }
            | Self::StartDateInPast(_)
            | Self::HalfDaySpansMultipleDays
            | Self::HalfDayNotAllowed(_)
            | Self::PolicyInactive(_)
            | Self::InvalidPolicy(_)
            | Self::InvalidMonth(_) => 400,

            Self::Access(_) => 403,

            Self::ApplicationNotFound(_)
            | Self::EmployeeNotFound(_)
            | Self::PolicyNotFound(_)
            | Self::NoPolicyForType(_)
            | Self::BalanceNotFound { .. } => 404,

            Self::OverlappingLeave(_)
            | Self::InsufficientBalance { .. }
            | Self::NotPending(_)
            | Self::HrApprovalNotRequired
            | Self::ManagerApprovalMissing
            | Self::AlreadyClosed(_)
            | Self::LeaveAlreadyStarted(_)
            | Self::DuplicatePolicy(_) => 409,

            Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::StartDateInPast(_) => "START_DATE_IN_PAST",
            Self::HalfDaySpansMultipleDays => "HALF_DAY_SPANS_MULTIPLE_DAYS",
            Self::HalfDayNotAllowed(_) => "HALF_DAY_NOT_ALLOWED",
            Self::PolicyInactive(_) => "POLICY_INACTIVE",
            Self::InvalidPolicy(_) => "INVALID_POLICY",
            Self::InvalidMonth(_) => "INVALID_MONTH",
            Self::ApplicationNotFound(_) => "APPLICATION_NOT_FOUND",
            Self::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            Self::PolicyNotFound(_) | Self::NoPolicyForType(_) => "POLICY_NOT_FOUND",
            Self::BalanceNotFound { .. } => "BALANCE_NOT_FOUND",
            Self::Access(_) => "ACCESS_DENIED",
            Self::OverlappingLeave(_) => "OVERLAPPING_LEAVE",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::NotPending(_) => "NOT_PENDING",
            Self::HrApprovalNotRequired => "HR_APPROVAL_NOT_REQUIRED",
            Self::ManagerApprovalMissing => "MANAGER_APPROVAL_MISSING",
            Self::AlreadyClosed(_) => "ALREADY_CLOSED",
            Self::LeaveAlreadyStarted(_) => "LEAVE_ALREADY_STARTED",
            Self::DuplicatePolicy(_) => "DUPLICATE_POLICY",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<LeaveError> for AppError {
    fn from(err: LeaveError) -> Self {
        let message = err.to_string();
        match err.status_code() {
            400 => Self::Validation(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Storage(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(LeaveError::HalfDaySpansMultipleDays, 400, "HALF_DAY_SPANS_MULTIPLE_DAYS")]
    #[case(LeaveError::PolicyInactive(LeaveType::SickLeave), 400, "POLICY_INACTIVE")]
    #[case(LeaveError::Access(AccessError::CompanyMismatch), 403, "ACCESS_DENIED")]
    #[case(LeaveError::ApplicationNotFound(LeaveApplicationId::new()), 404, "APPLICATION_NOT_FOUND")]
    #[case(LeaveError::OverlappingLeave(LeaveApplicationId::new()), 409, "OVERLAPPING_LEAVE")]
    #[case(LeaveError::NotPending(LeaveStatus::Approved), 409, "NOT_PENDING")]
    #[case(LeaveError::DuplicatePolicy(LeaveType::CasualLeave), 409, "DUPLICATE_POLICY")]
    #[case(LeaveError::Storage(StoreError::Backend("io".into())), 500, "STORAGE_ERROR")]
    fn test_status_and_code(
        #[case] err: LeaveError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_category_preserved_in_app_error() {
        let err = AppError::from(LeaveError::InsufficientBalance {
            requested: dec!(3),
            available: dec!(1),
        });
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.status_code(), 409);

        let err = AppError::from(LeaveError::NoPolicyForType(LeaveType::CompOff));
        assert!(matches!(err, AppError::NotFound(_)));

        let err = AppError::from(LeaveError::Access(AccessError::NotOwner("cancel")));
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = AppError::from(LeaveError::HalfDaySpansMultipleDays);
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_balance_error_converts() {
        let err: LeaveError = BalanceError::Insufficient {
            requested: dec!(2),
            available: dec!(0.5),
        }
        .into();
        assert!(err.to_string().contains("0.5"));
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
    }
}
