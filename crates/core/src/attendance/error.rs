//! Attendance error types.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use leavedesk_shared::AppError;
use leavedesk_shared::types::{AttendanceId, EmployeeId};

use crate::calendar::CalendarError;
use crate::org::AccessError;
use crate::repository::StoreError;

/// Errors that can occur during attendance operations.
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// Punches are only accepted for the current date.
    #[error("Can only punch in or out for today ({today}), not {date}")]
    PunchDateNotToday {
        /// Date on the punch.
        date: NaiveDate,
        /// Current date.
        today: NaiveDate,
    },

    /// Punch-out precedes punch-in.
    #[error("Punch-out time {punch_out} is before punch-in time {punch_in}")]
    PunchOutBeforePunchIn {
        /// Punch-in time.
        punch_in: NaiveTime,
        /// Punch-out time.
        punch_out: NaiveTime,
    },

    /// Query range ends before it starts.
    #[error(transparent)]
    InvalidRange(#[from] CalendarError),

    /// Month outside 1..=12.
    #[error("Invalid month {0}")]
    InvalidMonth(u32),

    /// No record with this ID.
    #[error("Attendance record {0} not found")]
    NotFound(AttendanceId),

    /// No employee with this ID.
    #[error("Employee {0} not found")]
    EmployeeNotFound(EmployeeId),

    /// A record for the date already exists.
    #[error("Already punched in on {0}")]
    AlreadyPunchedIn(NaiveDate),

    /// Punch-out with no record for the date.
    #[error("No punch-in recorded on {0}")]
    NotPunchedIn(NaiveDate),

    /// The record already has a punch-out.
    #[error("Already punched out on {0}")]
    AlreadyPunchedOut(NaiveDate),

    /// A correction request is already waiting.
    #[error("A correction request is already pending")]
    CorrectionPending,

    /// Review of a record with no open correction request.
    #[error("No correction request found for this attendance")]
    NoCorrectionRequested,

    /// The correction was already applied.
    #[error("Correction already approved")]
    CorrectionAlreadyApproved,

    /// Caller may not perform the operation.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Storage failure.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AttendanceError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PunchDateNotToday { .. }
            | Self::PunchOutBeforePunchIn { .. }
            | Self::InvalidRange(_)
            | Self::InvalidMonth(_) => 400,

            Self::Access(_) => 403,

            Self::NotFound(_) | Self::EmployeeNotFound(_) => 404,

            Self::AlreadyPunchedIn(_)
            | Self::NotPunchedIn(_)
            | Self::AlreadyPunchedOut(_)
            | Self::CorrectionPending
            | Self::NoCorrectionRequested
            | Self::CorrectionAlreadyApproved => 409,

            Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PunchDateNotToday { .. } => "PUNCH_DATE_NOT_TODAY",
            Self::PunchOutBeforePunchIn { .. } => "PUNCH_OUT_BEFORE_PUNCH_IN",
            Self::InvalidRange(_) => "INVALID_DATE_RANGE",
            Self::InvalidMonth(_) => "INVALID_MONTH",
            Self::NotFound(_) => "ATTENDANCE_NOT_FOUND",
            Self::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            Self::AlreadyPunchedIn(_) => "ALREADY_PUNCHED_IN",
            Self::NotPunchedIn(_) => "NOT_PUNCHED_IN",
            Self::AlreadyPunchedOut(_) => "ALREADY_PUNCHED_OUT",
            Self::CorrectionPending => "CORRECTION_PENDING",
            Self::NoCorrectionRequested => "NO_CORRECTION_REQUESTED",
            Self::CorrectionAlreadyApproved => "CORRECTION_ALREADY_APPROVED",
            Self::Access(_) => "ACCESS_DENIED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<AttendanceError> for AppError {
    fn from(err: AttendanceError) -> Self {
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

    #[rstest]
    #[case(AttendanceError::InvalidMonth(13), 400)]
    #[case(AttendanceError::Access(AccessError::NotOwner("correct attendance")), 403)]
    #[case(AttendanceError::NotFound(AttendanceId::new()), 404)]
    #[case(AttendanceError::CorrectionPending, 409)]
    fn test_status_codes(#[case] err: AttendanceError, #[case] status: u16) {
        assert_eq!(err.status_code(), status);
    }

    #[test]
    fn test_converts_to_app_error() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(matches!(
            AppError::from(AttendanceError::AlreadyPunchedIn(date)),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(AttendanceError::Storage(StoreError::Backend("down".into()))),
            AppError::Storage(_)
        ));
    }
}
