//! Attendance service: punches and correction reviews.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, warn};

use leavedesk_shared::types::{AttendanceId, EmployeeId};

use super::error::AttendanceError;
use super::types::{
    Attendance, AttendanceStatus, AttendanceSummary, CorrectionInput, CorrectionState, Punch,
    PunchInput,
};
use crate::calendar::DateRange;
use crate::clock::Clock;
use crate::org::Actor;
use crate::org::access::{HR_ROLES, REVIEWER_ROLES, ensure_owner, ensure_role, ensure_same_company};
use crate::repository::{ATTENDANCE_UNIQUE_CONSTRAINT, AttendanceRepository, EmployeeDirectory};

/// Service for daily attendance records.
pub struct AttendanceService<S, C>
where
    S: AttendanceRepository + EmployeeDirectory,
    C: Clock,
{
    store: Arc<S>,
    clock: C,
}

impl<S, C> AttendanceService<S, C>
where
    S: AttendanceRepository + EmployeeDirectory,
    C: Clock,
{
    /// Create a new attendance service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: C) -> Self {
        Self { store, clock }
    }

    /// Record the caller's punch-in or punch-out for today.
    ///
    /// A punch-in creates the day's record with status PRESENT. A punch-out
    /// completes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is not today, a punch-in finds an
    /// existing record, or a punch-out finds no record, an existing
    /// punch-out, or a time before the punch-in.
    pub fn punch(&self, actor: &Actor, input: PunchInput) -> Result<Attendance, AttendanceError> {
        let today = self.clock.today();
        if input.date != today {
            return Err(AttendanceError::PunchDateNotToday {
                date: input.date,
                today,
            });
        }
        let employee = self
            .store
            .find_employee(actor.employee_id, false)?
            .ok_or(AttendanceError::EmployeeNotFound(actor.employee_id))?;

        match input.punch {
            Punch::In => {
                let attendance = Attendance {
                    id: AttendanceId::new(),
                    employee_id: employee.id,
                    company_id: employee.company_id,
                    date: input.date,
                    punch_in: Some(input.time),
                    punch_out: None,
                    work_type: input.work_type,
                    status: AttendanceStatus::Present,
                    remarks: None,
                    correction: CorrectionState::NotRequested,
                    deleted: false,
                };
                self.store
                    .insert_attendance(attendance.clone())
                    .map_err(|err| {
                        if err.is_unique_violation(ATTENDANCE_UNIQUE_CONSTRAINT) {
                            AttendanceError::AlreadyPunchedIn(input.date)
                        } else {
                            err.into()
                        }
                    })?;

                info!(
                    attendance_id = %attendance.id,
                    employee_id = %attendance.employee_id,
                    date = %attendance.date,
                    "Punched in"
                );
                Ok(attendance)
            }
            Punch::Out => {
                let existing = self
                    .store
                    .find_attendance_on(employee.id, input.date)?
                    .ok_or(AttendanceError::NotPunchedIn(input.date))?;
                let attendance = self.modify(existing.id, |record| {
                    let Some(punch_in) = record.punch_in else {
                        return Err(AttendanceError::NotPunchedIn(record.date));
                    };
                    if record.punch_out.is_some() {
                        return Err(AttendanceError::AlreadyPunchedOut(record.date));
                    }
                    ensure_ordered(punch_in, input.time)?;
                    record.punch_out = Some(input.time);
                    Ok(())
                })?;

                info!(
                    attendance_id = %attendance.id,
                    employee_id = %attendance.employee_id,
                    date = %attendance.date,
                    "Punched out"
                );
                Ok(attendance)
            }
        }
    }

    /// Ask for a correction of one of the caller's own records.
    ///
    /// The current punch times and work type are written to the remarks,
    /// followed by the caller's explanation.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is not the caller's, a request is
    /// already pending, or the proposed punch-out precedes the punch-in.
    pub fn request_correction(
        &self,
        actor: &Actor,
        id: AttendanceId,
        input: CorrectionInput,
    ) -> Result<Attendance, AttendanceError> {
        let existing = self.find(id)?;
        ensure_owner(actor, existing.employee_id, "request an attendance correction")?;
        if let (Some(punch_in), Some(punch_out)) = (input.punch_in, input.punch_out) {
            ensure_ordered(punch_in, punch_out)?;
        }

        let attendance = self.modify(id, |record| {
            if record.correction_pending() {
                return Err(AttendanceError::CorrectionPending);
            }
            let original = format!(
                "Original - In: {}, Out: {}, Type: {}",
                display_or_none(record.punch_in),
                display_or_none(record.punch_out),
                display_or_none(record.work_type),
            );
            record.remarks = Some(match input.remarks.as_deref() {
                Some(remarks) => format!("{original} | {remarks}"),
                None => original,
            });
            record.correction = CorrectionState::Pending;
            Ok(())
        })?;

        info!(attendance_id = %attendance.id, "Attendance correction requested");
        Ok(attendance)
    }

    /// Apply a pending correction.
    ///
    /// Fields left `None` in `input` keep their current value.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not a reviewer of the record's
    /// company, no correction is pending, or the corrected punch-out would
    /// precede the punch-in.
    pub fn approve_correction(
        &self,
        actor: &Actor,
        id: AttendanceId,
        input: CorrectionInput,
    ) -> Result<Attendance, AttendanceError> {
        ensure_role(actor, REVIEWER_ROLES, "review attendance corrections")?;
        let existing = self.find(id)?;
        ensure_same_company(actor, existing.company_id)?;

        let attendance = self.modify(id, |record| {
            ensure_correction_open(record)?;
            let punch_in = input.punch_in.or(record.punch_in);
            let punch_out = input.punch_out.or(record.punch_out);
            if let (Some(punch_in), Some(punch_out)) = (punch_in, punch_out) {
                ensure_ordered(punch_in, punch_out)?;
            }
            record.punch_in = punch_in;
            record.punch_out = punch_out;
            if let Some(work_type) = input.work_type {
                record.work_type = Some(work_type);
            }
            record.correction = CorrectionState::Approved;
            Ok(())
        })?;

        info!(
            attendance_id = %attendance.id,
            reviewer_id = %actor.employee_id,
            "Attendance correction approved"
        );
        Ok(attendance)
    }

    /// Turn down a pending correction, leaving the record's times untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not a reviewer of the record's
    /// company or no correction is pending.
    pub fn reject_correction(
        &self,
        actor: &Actor,
        id: AttendanceId,
        reason: Option<&str>,
    ) -> Result<Attendance, AttendanceError> {
        ensure_role(actor, REVIEWER_ROLES, "review attendance corrections")?;
        let existing = self.find(id)?;
        ensure_same_company(actor, existing.company_id)?;

        let attendance = self.modify(id, |record| {
            ensure_correction_open(record)?;
            record.correction = CorrectionState::NotRequested;
            if let Some(reason) = reason {
                record.append_remark(&format!("Rejection Reason: {reason}"));
            }
            Ok(())
        })?;

        info!(
            attendance_id = %attendance.id,
            reviewer_id = %actor.employee_id,
            "Attendance correction rejected"
        );
        Ok(attendance)
    }

    /// Set the status of an employee's day, creating the record if needed.
    ///
    /// Existing remarks are replaced only when `remarks` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an HR administrator of the
    /// employee's company or the employee does not exist.
    pub fn mark(
        &self,
        actor: &Actor,
        employee_id: EmployeeId,
        date: NaiveDate,
        status: AttendanceStatus,
        remarks: Option<String>,
    ) -> Result<Attendance, AttendanceError> {
        ensure_role(actor, HR_ROLES, "mark attendance")?;
        let employee = self
            .store
            .find_employee(employee_id, false)?
            .ok_or(AttendanceError::EmployeeNotFound(employee_id))?;
        ensure_same_company(actor, employee.company_id)?;

        let update = |record: &mut Attendance| -> Result<(), AttendanceError> {
            record.status = status;
            if let Some(remarks) = &remarks {
                record.remarks = Some(remarks.clone());
            }
            Ok(())
        };

        let attendance = if let Some(existing) = self.store.find_attendance_on(employee.id, date)? {
            self.modify(existing.id, update)?
        } else {
            let attendance = Attendance {
                id: AttendanceId::new(),
                employee_id: employee.id,
                company_id: employee.company_id,
                date,
                punch_in: None,
                punch_out: None,
                work_type: None,
                status,
                remarks: remarks.clone(),
                correction: CorrectionState::NotRequested,
                deleted: false,
            };
            match self.store.insert_attendance(attendance.clone()) {
                Ok(()) => attendance,
                Err(err) if err.is_unique_violation(ATTENDANCE_UNIQUE_CONSTRAINT) => {
                    warn!(
                        employee_id = %employee.id,
                        date = %date,
                        "Attendance created concurrently, updating instead"
                    );
                    let existing = self
                        .store
                        .find_attendance_on(employee.id, date)?
                        .ok_or(AttendanceError::Storage(err))?;
                    self.modify(existing.id, update)?
                }
                Err(err) => return Err(err.into()),
            }
        };

        info!(
            attendance_id = %attendance.id,
            employee_id = %attendance.employee_id,
            date = %attendance.date,
            status = %attendance.status,
            marked_by = %actor.employee_id,
            "Attendance marked"
        );
        Ok(attendance)
    }

    /// Fetch a record of the caller's company.
    ///
    /// # Errors
    ///
    /// Returns an error if it does not exist or belongs to another company.
    pub fn get(&self, actor: &Actor, id: AttendanceId) -> Result<Attendance, AttendanceError> {
        let attendance = self.find(id)?;
        ensure_same_company(actor, attendance.company_id)?;
        Ok(attendance)
    }

    /// The caller's record for today, if any.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn today(&self, actor: &Actor) -> Result<Option<Attendance>, AttendanceError> {
        Ok(self
            .store
            .find_attendance_on(actor.employee_id, self.clock.today())?)
    }

    /// All of the caller's records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn list_mine(&self, actor: &Actor) -> Result<Vec<Attendance>, AttendanceError> {
        Ok(self
            .store
            .list_attendance_for_employee(actor.employee_id, None)?)
    }

    /// The caller's records within `start..=end`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if `end` is before `start`.
    pub fn list_mine_by_date_range(
        &self,
        actor: &Actor,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Attendance>, AttendanceError> {
        let range = DateRange::new(start, end)?;
        Ok(self
            .store
            .list_attendance_for_employee(actor.employee_id, Some(&range))?)
    }

    /// Every record of the caller's company within `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not a reviewer or `end` is before
    /// `start`.
    pub fn list_by_date_range(
        &self,
        actor: &Actor,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Attendance>, AttendanceError> {
        ensure_role(actor, REVIEWER_ROLES, "view company attendance")?;
        let range = DateRange::new(start, end)?;
        Ok(self
            .store
            .list_attendance_for_company(actor.company_id, Some(&range))?)
    }

    /// Records of the caller's company with a correction awaiting review.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not a reviewer.
    pub fn pending_corrections(&self, actor: &Actor) -> Result<Vec<Attendance>, AttendanceError> {
        ensure_role(actor, REVIEWER_ROLES, "review attendance corrections")?;
        Ok(self.store.list_pending_corrections(actor.company_id)?)
    }

    /// The caller's attendance rate for one calendar month.
    ///
    /// # Errors
    ///
    /// Returns an error if `month` is not 1 through 12.
    pub fn monthly_summary(
        &self,
        actor: &Actor,
        year: i32,
        month: u32,
    ) -> Result<AttendanceSummary, AttendanceError> {
        let range = DateRange::month(year, month).ok_or(AttendanceError::InvalidMonth(month))?;
        let records = self
            .store
            .list_attendance_for_employee(actor.employee_id, Some(&range))?;
        Ok(summarize(year, month, &records))
    }

    fn find(&self, id: AttendanceId) -> Result<Attendance, AttendanceError> {
        self.store
            .find_attendance(id, false)?
            .ok_or(AttendanceError::NotFound(id))
    }

    /// Runs `f` on the locked row and returns the record as written.
    ///
    /// The row is left untouched when `f` fails.
    fn modify<F>(&self, id: AttendanceId, f: F) -> Result<Attendance, AttendanceError>
    where
        F: FnOnce(&mut Attendance) -> Result<(), AttendanceError>,
    {
        self.store
            .modify_attendance(id, |row| -> Result<Attendance, AttendanceError> {
                let mut draft = row.clone();
                f(&mut draft)?;
                *row = draft.clone();
                Ok(draft)
            })?
            .ok_or(AttendanceError::NotFound(id))?
    }
}

/// Counts PRESENT records against everything recorded in the month.
fn summarize(year: i32, month: u32, records: &[Attendance]) -> AttendanceSummary {
    let recorded = records.len();
    let present = records
        .iter()
        .filter(|record| record.status == AttendanceStatus::Present)
        .count();
    let rate = if recorded == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(present) * Decimal::ONE_HUNDRED / Decimal::from(recorded))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    };
    AttendanceSummary {
        year,
        month,
        present_days: u32::try_from(present).unwrap_or(u32::MAX),
        recorded_days: u32::try_from(recorded).unwrap_or(u32::MAX),
        rate,
    }
}

fn ensure_ordered(punch_in: NaiveTime, punch_out: NaiveTime) -> Result<(), AttendanceError> {
    if punch_out < punch_in {
        return Err(AttendanceError::PunchOutBeforePunchIn {
            punch_in,
            punch_out,
        });
    }
    Ok(())
}

fn ensure_correction_open(record: &Attendance) -> Result<(), AttendanceError> {
    match record.correction {
        CorrectionState::Pending => Ok(()),
        CorrectionState::Approved => Err(AttendanceError::CorrectionAlreadyApproved),
        CorrectionState::NotRequested => Err(AttendanceError::NoCorrectionRequested),
    }
}

fn display_or_none<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "none".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use leavedesk_shared::types::CompanyId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn record(date: NaiveDate, status: AttendanceStatus) -> Attendance {
        Attendance {
            id: AttendanceId::new(),
            employee_id: EmployeeId::new(),
            company_id: CompanyId::new(),
            date,
            punch_in: None,
            punch_out: None,
            work_type: None,
            status,
            remarks: None,
            correction: CorrectionState::NotRequested,
            deleted: false,
        }
    }

    fn month_of(statuses: &[AttendanceStatus]) -> Vec<Attendance> {
        let first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        statuses
            .iter()
            .zip(first.iter_days())
            .map(|(status, date)| record(date, *status))
            .collect()
    }

    #[rstest]
    #[case(&[], dec!(0))]
    #[case(&[AttendanceStatus::Present, AttendanceStatus::Present], dec!(100))]
    #[case(
        &[AttendanceStatus::Present, AttendanceStatus::Absent, AttendanceStatus::HalfDay],
        dec!(33.3)
    )]
    #[case(
        &[AttendanceStatus::Present, AttendanceStatus::Present, AttendanceStatus::WorkFromHome],
        dec!(66.7)
    )]
    fn test_summary_counts_present_only(
        #[case] statuses: &[AttendanceStatus],
        #[case] rate: Decimal,
    ) {
        let summary = summarize(2024, 3, &month_of(statuses));
        assert_eq!(summary.rate, rate);
        assert_eq!(summary.recorded_days as usize, statuses.len());
    }

    #[test]
    fn test_correction_must_be_pending() {
        let mut attendance = record(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            AttendanceStatus::Present,
        );
        assert!(matches!(
            ensure_correction_open(&attendance),
            Err(AttendanceError::NoCorrectionRequested)
        ));
        attendance.correction = CorrectionState::Approved;
        assert!(matches!(
            ensure_correction_open(&attendance),
            Err(AttendanceError::CorrectionAlreadyApproved)
        ));
        attendance.correction = CorrectionState::Pending;
        assert!(ensure_correction_open(&attendance).is_ok());
    }
}
