//! Organization domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

use leavedesk_shared::types::{CompanyId, EmployeeId};

/// Role of an employee within their company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform operator with access to every company.
    SuperAdmin,
    /// HR administrator of a company.
    HrAdmin,
    /// People manager.
    Manager,
    /// Regular employee.
    Employee,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::HrAdmin => "HR_ADMIN",
            Self::Manager => "MANAGER",
            Self::Employee => "EMPLOYEE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tenant company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier.
    pub id: CompanyId,
    /// Display name.
    pub name: String,
    /// Soft-delete marker.
    pub deleted: bool,
}

impl Company {
    /// Creates a live company with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CompanyId::new(),
            name: name.into(),
            deleted: false,
        }
    }
}

/// An employee record as seen by leave management.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier.
    pub id: EmployeeId,
    /// Company the employee belongs to.
    pub company_id: CompanyId,
    /// Full name.
    pub full_name: String,
    /// Work email.
    pub email: String,
    /// Role within the company.
    pub role: Role,
    /// Direct manager, if any.
    pub manager_id: Option<EmployeeId>,
    /// Soft-delete marker.
    pub deleted: bool,
}

impl Employee {
    /// Creates an employee with no manager.
    #[must_use]
    pub fn new(
        company_id: CompanyId,
        full_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: EmployeeId::new(),
            company_id,
            full_name: full_name.into(),
            email: email.into(),
            role,
            manager_id: None,
            deleted: false,
        }
    }

    /// Sets the direct manager.
    #[must_use]
    pub fn reporting_to(mut self, manager_id: EmployeeId) -> Self {
        self.manager_id = Some(manager_id);
        self
    }
}

/// The authenticated caller of an operation.
///
/// Built by the boundary layer from a verified token; the core trusts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The caller's employee record.
    pub employee_id: EmployeeId,
    /// The caller's company.
    pub company_id: CompanyId,
    /// The caller's role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor from explicit identity parts.
    #[must_use]
    pub const fn new(employee_id: EmployeeId, company_id: CompanyId, role: Role) -> Self {
        Self {
            employee_id,
            company_id,
            role,
        }
    }
}

impl From<&Employee> for Actor {
    fn from(employee: &Employee) -> Self {
        Self::new(employee.id, employee.company_id, employee.role)
    }
}
