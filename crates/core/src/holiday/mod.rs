//! Company holiday calendars.
//!
//! Holidays are informational: they are listed to employees but never
//! reduce the working days charged for a leave.

pub mod error;
pub mod service;
pub mod types;

pub use error::HolidayError;
pub use service::HolidayService;
pub use types::{Holiday, HolidayInput, HolidayKind};
