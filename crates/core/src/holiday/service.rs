//! Holiday calendar service.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use leavedesk_shared::types::HolidayId;

use super::error::HolidayError;
use super::types::{Holiday, HolidayInput};
use crate::calendar::DateRange;
use crate::clock::Clock;
use crate::org::Actor;
use crate::org::access::{HR_ROLES, ensure_role, ensure_same_company};
use crate::repository::{EmployeeDirectory, HolidayRepository};

/// Service for company holidays.
pub struct HolidayService<S, C>
where
    S: HolidayRepository + EmployeeDirectory,
    C: Clock,
{
    store: Arc<S>,
    clock: C,
}

impl<S, C> HolidayService<S, C>
where
    S: HolidayRepository + EmployeeDirectory,
    C: Clock,
{
    /// Create a new holiday service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: C) -> Self {
        Self { store, clock }
    }

    /// Add a holiday to the caller's company calendar.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an HR administrator, the name
    /// is blank, or the date is in the past.
    pub fn create(&self, actor: &Actor, input: HolidayInput) -> Result<Holiday, HolidayError> {
        ensure_role(actor, HR_ROLES, "manage holidays")?;
        let company = self
            .store
            .find_company(actor.company_id, false)?
            .ok_or(HolidayError::CompanyNotFound(actor.company_id))?;
        let name = validated_name(&input.name)?;
        if input.date < self.clock.today() {
            return Err(HolidayError::DateInPast(input.date));
        }

        let holiday = Holiday {
            id: HolidayId::new(),
            company_id: company.id,
            name,
            date: input.date,
            kind: input.kind,
            state: input.state,
            active: input.active,
            deleted: false,
        };
        self.store.insert_holiday(holiday.clone())?;

        info!(
            holiday_id = %holiday.id,
            company_id = %holiday.company_id,
            date = %holiday.date,
            kind = %holiday.kind,
            "Holiday created"
        );
        Ok(holiday)
    }

    /// Replace the fields of a holiday.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an HR administrator of the
    /// holiday's company, the holiday does not exist, or the name is blank.
    pub fn update(
        &self,
        actor: &Actor,
        id: HolidayId,
        input: HolidayInput,
    ) -> Result<Holiday, HolidayError> {
        ensure_role(actor, HR_ROLES, "manage holidays")?;
        let mut holiday = self.get(actor, id)?;
        holiday.name = validated_name(&input.name)?;
        holiday.date = input.date;
        holiday.kind = input.kind;
        holiday.state = input.state;
        holiday.active = input.active;
        self.store.update_holiday(&holiday)?;

        info!(holiday_id = %holiday.id, date = %holiday.date, "Holiday updated");
        Ok(holiday)
    }

    /// Soft-delete a holiday.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an HR administrator of the
    /// holiday's company or the holiday does not exist.
    pub fn delete(&self, actor: &Actor, id: HolidayId) -> Result<(), HolidayError> {
        ensure_role(actor, HR_ROLES, "manage holidays")?;
        let mut holiday = self.get(actor, id)?;
        holiday.deleted = true;
        self.store.update_holiday(&holiday)?;

        info!(holiday_id = %holiday.id, "Holiday deleted");
        Ok(())
    }

    /// Fetch a holiday of the caller's company.
    ///
    /// # Errors
    ///
    /// Returns an error if it does not exist or belongs to another company.
    pub fn get(&self, actor: &Actor, id: HolidayId) -> Result<Holiday, HolidayError> {
        let holiday = self
            .store
            .find_holiday(id, false)?
            .ok_or(HolidayError::NotFound(id))?;
        ensure_same_company(actor, holiday.company_id)?;
        Ok(holiday)
    }

    /// Every live holiday of the caller's company, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn list_all(&self, actor: &Actor) -> Result<Vec<Holiday>, HolidayError> {
        Ok(self.store.list_holidays(actor.company_id, false, false)?)
    }

    /// Live, active holidays of the caller's company, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn list_active(&self, actor: &Actor) -> Result<Vec<Holiday>, HolidayError> {
        Ok(self.store.list_holidays(actor.company_id, true, false)?)
    }

    /// Active holidays of the caller's company falling within `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns an error if `end` is before `start`.
    pub fn list_by_date_range(
        &self,
        actor: &Actor,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Holiday>, HolidayError> {
        let range = DateRange::new(start, end)?;
        Ok(self
            .list_active(actor)?
            .into_iter()
            .filter(|holiday| range.contains(holiday.date))
            .collect())
    }
}

fn validated_name(name: &str) -> Result<String, HolidayError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HolidayError::NameRequired);
    }
    Ok(name.to_string())
}
