//! Authorization checks.
//!
//! Every service operation calls one or more of these before touching state.
//! They are plain functions over the resolved [`Actor`] so they can be tested
//! without any transport or storage.

use thiserror::Error;

use leavedesk_shared::types::{CompanyId, EmployeeId};

use super::types::{Actor, Employee, Role};

/// Roles allowed to administer leave policies, holidays, and HR approvals.
pub const HR_ROLES: &[Role] = &[Role::HrAdmin, Role::SuperAdmin];

/// Roles allowed to review attendance corrections and company-wide attendance.
pub const REVIEWER_ROLES: &[Role] = &[Role::Manager, Role::HrAdmin, Role::SuperAdmin];

/// Authorization failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The caller's role is not allowed to perform the action.
    #[error("Role {role} is not allowed to {action}")]
    RoleNotAllowed {
        /// The caller's role.
        role: Role,
        /// What was attempted.
        action: &'static str,
    },

    /// The resource belongs to another company.
    #[error("Resource belongs to another company")]
    CompanyMismatch,

    /// The caller is not the applicant's direct manager.
    #[error("Employee {0} is not the direct manager of the applicant")]
    NotDirectManager(EmployeeId),

    /// Only the owner may perform the action.
    #[error("Only the owner can {0}")]
    NotOwner(&'static str),
}

/// Requires the caller to hold one of `allowed`.
pub fn ensure_role(actor: &Actor, allowed: &[Role], action: &'static str) -> Result<(), AccessError> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(AccessError::RoleNotAllowed {
            role: actor.role,
            action,
        })
    }
}

/// Requires the resource to belong to the caller's company.
pub fn ensure_same_company(actor: &Actor, company_id: CompanyId) -> Result<(), AccessError> {
    if actor.company_id == company_id {
        Ok(())
    } else {
        Err(AccessError::CompanyMismatch)
    }
}

/// Requires the caller to be `applicant`'s direct manager.
pub fn ensure_direct_manager(actor: &Actor, applicant: &Employee) -> Result<(), AccessError> {
    match applicant.manager_id {
        Some(manager_id) if manager_id == actor.employee_id => Ok(()),
        _ => Err(AccessError::NotDirectManager(actor.employee_id)),
    }
}

/// Requires the caller to be the employee identified by `owner`.
pub fn ensure_owner(
    actor: &Actor,
    owner: EmployeeId,
    action: &'static str,
) -> Result<(), AccessError> {
    if actor.employee_id == owner {
        Ok(())
    } else {
        Err(AccessError::NotOwner(action))
    }
}
