//! Leave application table.

use tracing::debug;

use leavedesk_core::calendar::DateRange;
use leavedesk_core::leave::{LeaveApplication, LeaveStatus};
use leavedesk_core::repository::{LeaveApplicationRepository, StoreError};
use leavedesk_shared::types::{CompanyId, EmployeeId, LeaveApplicationId};

use crate::store::MemoryStore;

impl MemoryStore {
    fn collect_applications<P>(&self, predicate: P) -> Vec<LeaveApplication>
    where
        P: Fn(&LeaveApplication) -> bool,
    {
        let mut applications: Vec<LeaveApplication> = self
            .applications
            .iter()
            .filter(|a| predicate(a.value()))
            .map(|a| a.value().clone())
            .collect();
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        applications
    }
}

impl LeaveApplicationRepository for MemoryStore {
    fn insert_application(&self, application: LeaveApplication) -> Result<(), StoreError> {
        debug!(application_id = %application.id, status = %application.status, "Inserting leave application");
        self.applications.insert(application.id, application);
        Ok(())
    }

    fn update_application(
        &self,
        application: &LeaveApplication,
        expected: LeaveStatus,
    ) -> Result<(), StoreError> {
        let mut row = self
            .applications
            .get_mut(&application.id)
            .ok_or_else(|| StoreError::MissingRow {
                entity: "leave application",
                id: application.id.to_string(),
            })?;
        // The shard lock is held from this check until the write.
        if row.status != expected {
            return Err(StoreError::StaleRow {
                entity: "leave application",
                id: application.id.to_string(),
            });
        }
        *row = application.clone();
        debug!(application_id = %application.id, status = %application.status, "Updated leave application");
        Ok(())
    }

    fn find_application(
        &self,
        id: LeaveApplicationId,
        include_deleted: bool,
    ) -> Result<Option<LeaveApplication>, StoreError> {
        Ok(self
            .applications
            .get(&id)
            .filter(|a| include_deleted || !a.deleted)
            .map(|a| a.value().clone()))
    }

    fn list_by_employee(
        &self,
        employee_id: EmployeeId,
        include_deleted: bool,
    ) -> Result<Vec<LeaveApplication>, StoreError> {
        Ok(self.collect_applications(|a| {
            a.employee_id == employee_id && (include_deleted || !a.deleted)
        }))
    }

    fn list_by_company(
        &self,
        company_id: CompanyId,
        status: Option<LeaveStatus>,
        include_deleted: bool,
    ) -> Result<Vec<LeaveApplication>, StoreError> {
        Ok(self.collect_applications(|a| {
            a.company_id == company_id
                && status.is_none_or(|s| a.status == s)
                && (include_deleted || !a.deleted)
        }))
    }

    fn find_overlapping(
        &self,
        employee_id: EmployeeId,
        range: &DateRange,
    ) -> Result<Vec<LeaveApplication>, StoreError> {
        Ok(self.collect_applications(|a| {
            a.employee_id == employee_id
                && !a.deleted
                && a.status.occupies_dates()
                && a.range().overlaps(range)
        }))
    }
}
