//! Attendance table.

use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use leavedesk_core::attendance::Attendance;
use leavedesk_core::calendar::DateRange;
use leavedesk_core::repository::{ATTENDANCE_UNIQUE_CONSTRAINT, AttendanceRepository, StoreError};
use leavedesk_shared::types::{AttendanceId, CompanyId, EmployeeId};

use crate::store::MemoryStore;

impl MemoryStore {
    fn collect_attendance<P>(&self, predicate: P) -> Vec<Attendance>
    where
        P: Fn(&Attendance) -> bool,
    {
        let mut records: Vec<Attendance> = self
            .attendance
            .iter()
            .filter(|a| !a.deleted && predicate(a.value()))
            .map(|a| a.value().clone())
            .collect();
        records.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.employee_id.cmp(&b.employee_id))
        });
        records
    }
}

fn in_range(range: Option<&DateRange>, date: NaiveDate) -> bool {
    range.is_none_or(|r| r.contains(date))
}

impl AttendanceRepository for MemoryStore {
    fn insert_attendance(&self, attendance: Attendance) -> Result<(), StoreError> {
        let day = (attendance.employee_id, attendance.date);
        match self.attendance_days.entry(day) {
            Entry::Occupied(existing)
                if self
                    .attendance
                    .get(existing.get())
                    .is_some_and(|a| !a.deleted) =>
            {
                Err(StoreError::UniqueViolation {
                    constraint: ATTENDANCE_UNIQUE_CONSTRAINT.to_string(),
                })
            }
            // A soft-deleted record frees its day.
            Entry::Occupied(mut existing) => {
                existing.insert(attendance.id);
                self.attendance.insert(attendance.id, attendance);
                Ok(())
            }
            Entry::Vacant(slot) => {
                debug!(
                    attendance_id = %attendance.id,
                    employee_id = %attendance.employee_id,
                    date = %attendance.date,
                    status = %attendance.status,
                    "Inserting attendance"
                );
                slot.insert(attendance.id);
                self.attendance.insert(attendance.id, attendance);
                Ok(())
            }
        }
    }

    fn modify_attendance<F, R>(&self, id: AttendanceId, f: F) -> Result<Option<R>, StoreError>
    where
        F: FnOnce(&mut Attendance) -> R,
    {
        match self.attendance.get_mut(&id) {
            Some(mut row) if !row.deleted => Ok(Some(f(row.value_mut()))),
            _ => Ok(None),
        }
    }

    fn find_attendance(
        &self,
        id: AttendanceId,
        include_deleted: bool,
    ) -> Result<Option<Attendance>, StoreError> {
        Ok(self
            .attendance
            .get(&id)
            .filter(|a| include_deleted || !a.deleted)
            .map(|a| a.value().clone()))
    }

    fn find_attendance_on(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError> {
        let Some(id) = self.attendance_days.get(&(employee_id, date)).map(|id| *id) else {
            return Ok(None);
        };
        self.find_attendance(id, false)
    }

    fn list_attendance_for_employee(
        &self,
        employee_id: EmployeeId,
        range: Option<&DateRange>,
    ) -> Result<Vec<Attendance>, StoreError> {
        Ok(self.collect_attendance(|a| a.employee_id == employee_id && in_range(range, a.date)))
    }

    fn list_attendance_for_company(
        &self,
        company_id: CompanyId,
        range: Option<&DateRange>,
    ) -> Result<Vec<Attendance>, StoreError> {
        Ok(self.collect_attendance(|a| a.company_id == company_id && in_range(range, a.date)))
    }

    fn list_pending_corrections(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<Attendance>, StoreError> {
        let mut records =
            self.collect_attendance(|a| a.company_id == company_id && a.correction_pending());
        records.reverse();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leavedesk_core::attendance::{AttendanceStatus, CorrectionState};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn record(employee_id: EmployeeId, company_id: CompanyId, date: NaiveDate) -> Attendance {
        Attendance {
            id: AttendanceId::new(),
            employee_id,
            company_id,
            date,
            punch_in: None,
            punch_out: None,
            work_type: None,
            status: AttendanceStatus::Present,
            remarks: None,
            correction: CorrectionState::NotRequested,
            deleted: false,
        }
    }

    #[test]
    fn test_one_record_per_employee_and_date() {
        let store = MemoryStore::new();
        let (employee, company) = (EmployeeId::new(), CompanyId::new());
        store.insert_attendance(record(employee, company, day(4))).unwrap();

        let err = store
            .insert_attendance(record(employee, company, day(4)))
            .unwrap_err();
        assert!(err.is_unique_violation(ATTENDANCE_UNIQUE_CONSTRAINT));
        assert!(store.insert_attendance(record(employee, company, day(5))).is_ok());
        assert!(store.insert_attendance(record(EmployeeId::new(), company, day(4))).is_ok());
    }

    #[test]
    fn test_soft_deleted_record_frees_its_day() {
        let store = MemoryStore::new();
        let (employee, company) = (EmployeeId::new(), CompanyId::new());
        let first = record(employee, company, day(4));
        let first_id = first.id;
        store.insert_attendance(first).unwrap();
        store.attendance.get_mut(&first_id).unwrap().deleted = true;

        let second = record(employee, company, day(4));
        let second_id = second.id;
        store.insert_attendance(second).unwrap();
        assert_eq!(
            store.find_attendance_on(employee, day(4)).unwrap().map(|a| a.id),
            Some(second_id)
        );
        assert!(store.modify_attendance(first_id, |_| ()).unwrap().is_none());
    }

    #[test]
    fn test_listing_filters_by_range_and_orders_newest_first() {
        let store = MemoryStore::new();
        let (employee, company) = (EmployeeId::new(), CompanyId::new());
        for d in [4, 6, 5, 11] {
            store.insert_attendance(record(employee, company, day(d))).unwrap();
        }
        let week = DateRange::new(day(4), day(8)).unwrap();

        let dates: Vec<NaiveDate> = store
            .list_attendance_for_employee(employee, Some(&week))
            .unwrap()
            .into_iter()
            .map(|a| a.date)
            .collect();
        assert_eq!(dates, vec![day(6), day(5), day(4)]);
        assert_eq!(store.list_attendance_for_company(company, None).unwrap().len(), 4);
        assert!(store
            .list_attendance_for_company(CompanyId::new(), None)
            .unwrap()
            .is_empty());
    }
}
