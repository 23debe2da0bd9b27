//! Core business logic for Leavedesk.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and balance arithmetic live here; storage
//! is reached only through the traits in [`repository`].
//!
//! # Modules
//!
//! - `calendar` - Date ranges and working-day counting
//! - `clock` - Injectable source of "today"
//! - `org` - Employees, roles, and authorization checks
//! - `leave` - Leave policies, balances, and the application approval lifecycle
//! - `holiday` - Company holiday calendars
//! - `attendance` - Daily punches and correction requests
//! - `repository` - Storage seams implemented by the db crate

pub mod attendance;
pub mod calendar;
pub mod clock;
pub mod holiday;
pub mod leave;
pub mod org;
pub mod repository;

pub use clock::{Clock, FixedClock, SystemClock};
