//! Holiday error types.

use chrono::NaiveDate;
use thiserror::Error;

use leavedesk_shared::AppError;
use leavedesk_shared::types::{CompanyId, HolidayId};

use crate::calendar::CalendarError;
use crate::org::AccessError;
use crate::repository::StoreError;

/// Errors that can occur during holiday operations.
#[derive(Debug, Error)]
pub enum HolidayError {
    /// Holiday name is blank.
    #[error("Holiday name is required")]
    NameRequired,

    /// Holiday date lies before today.
    #[error("Cannot create holiday for past date {0}")]
    DateInPast(NaiveDate),

    /// Query range ends before it starts.
    #[error(transparent)]
    InvalidRange(#[from] CalendarError),

    /// No holiday with this ID.
    #[error("Holiday {0} not found")]
    NotFound(HolidayId),

    /// No company with this ID.
    #[error("Company {0} not found")]
    CompanyNotFound(CompanyId),

    /// Caller may not perform the operation.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Storage failure.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl HolidayError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NameRequired | Self::DateInPast(_) | Self::InvalidRange(_) => 400,
            Self::Access(_) => 403,
            Self::NotFound(_) | Self::CompanyNotFound(_) => 404,
            Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NameRequired => "HOLIDAY_NAME_REQUIRED",
            Self::DateInPast(_) => "HOLIDAY_DATE_IN_PAST",
            Self::InvalidRange(_) => "INVALID_DATE_RANGE",
            Self::NotFound(_) => "HOLIDAY_NOT_FOUND",
            Self::CompanyNotFound(_) => "COMPANY_NOT_FOUND",
            Self::Access(_) => "ACCESS_DENIED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<HolidayError> for AppError {
    fn from(err: HolidayError) -> Self {
        let message = err.to_string();
        match err {
            HolidayError::NameRequired
            | HolidayError::DateInPast(_)
            | HolidayError::InvalidRange(_) => Self::Validation(message),
            HolidayError::Access(_) => Self::Forbidden(message),
            HolidayError::NotFound(_) | HolidayError::CompanyNotFound(_) => Self::NotFound(message),
            HolidayError::Storage(_) => Self::Storage(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holiday_error_categories() {
        assert_eq!(HolidayError::NameRequired.status_code(), 400);
        assert_eq!(HolidayError::NotFound(HolidayId::new()).error_code(), "HOLIDAY_NOT_FOUND");
        assert!(matches!(
            AppError::from(HolidayError::Access(AccessError::CompanyMismatch)),
            AppError::Forbidden(_)
        ));
    }
}
