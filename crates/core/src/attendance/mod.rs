//! Daily attendance.
//!
//! Employees punch in and out for the current day; a record can later be
//! corrected through a request that a reviewer approves or rejects. HR may
//! also mark a day's status directly.

pub mod error;
pub mod service;
pub mod types;

pub use error::AttendanceError;
pub use service::AttendanceService;
pub use types::{
    Attendance, AttendanceStatus, AttendanceSummary, CorrectionInput, CorrectionState, Punch,
    PunchInput, WorkType,
};
