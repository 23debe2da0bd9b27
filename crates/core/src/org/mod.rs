//! Companies, employees, and caller authorization.
//!
//! # Modules
//!
//! - `types` - Company, Employee, Role, and the resolved caller (`Actor`)
//! - `access` - Explicit authorization checks run at the start of each operation

pub mod access;
pub mod types;

pub use access::{AccessError, HR_ROLES, REVIEWER_ROLES};
pub use types::{Actor, Company, Employee, Role};
