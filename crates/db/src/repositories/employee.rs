//! Employee directory.

use leavedesk_core::org::{Company, Employee};
use leavedesk_core::repository::{EmployeeDirectory, StoreError};
use leavedesk_shared::types::{CompanyId, EmployeeId};

use crate::store::MemoryStore;

impl EmployeeDirectory for MemoryStore {
    fn find_employee(
        &self,
        id: EmployeeId,
        include_deleted: bool,
    ) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .employees
            .get(&id)
            .filter(|e| include_deleted || !e.deleted)
            .map(|e| e.value().clone()))
    }

    fn list_direct_reports(
        &self,
        manager_id: EmployeeId,
        include_deleted: bool,
    ) -> Result<Vec<Employee>, StoreError> {
        let mut reports: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| e.manager_id == Some(manager_id) && (include_deleted || !e.deleted))
            .map(|e| e.value().clone())
            .collect();
        reports.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(reports)
    }

    fn find_company(
        &self,
        id: CompanyId,
        include_deleted: bool,
    ) -> Result<Option<Company>, StoreError> {
        Ok(self
            .companies
            .get(&id)
            .filter(|c| include_deleted || !c.deleted)
            .map(|c| c.value().clone()))
    }
}
