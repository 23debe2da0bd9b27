//! Leave management.
//!
//! This module implements leave balance bookkeeping, the application
//! approval state machine, and the services that drive them.
//!
//! # Modules
//!
//! - `types` - Leave types, statuses, applications and policies
//! - `balance` - Balance rows and their arithmetic
//! - `lifecycle` - Application state transitions
//! - `error` - Leave-specific error types
//! - `service` - Apply, approve and cancel
//! - `balance_service` - Initialization, accrual and carry-forward
//! - `policy_service` - Policy administration

pub mod balance;
pub mod balance_service;
pub mod error;
pub mod lifecycle;
pub mod policy_service;
pub mod service;
pub mod types;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod lifecycle_props;

pub use balance::{BalanceEffect, BalanceError, BalanceKey, LeaveBalance};
pub use balance_service::LeaveBalanceService;
pub use error::LeaveError;
pub use lifecycle::LeaveLifecycle;
pub use policy_service::LeavePolicyService;
pub use service::LeaveApplicationService;
pub use types::{
    ApplyLeaveInput, Approval, LeaveApplication, LeaveDecision, LeavePolicy, LeavePolicyInput,
    LeaveStatus, LeaveType, Rejection,
};
