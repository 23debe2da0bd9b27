//! Holiday table.

use tracing::debug;

use leavedesk_core::holiday::Holiday;
use leavedesk_core::repository::{HolidayRepository, StoreError};
use leavedesk_shared::types::{CompanyId, HolidayId};

use crate::store::MemoryStore;

impl HolidayRepository for MemoryStore {
    fn insert_holiday(&self, holiday: Holiday) -> Result<(), StoreError> {
        debug!(holiday_id = %holiday.id, date = %holiday.date, "Inserting holiday");
        self.holidays.insert(holiday.id, holiday);
        Ok(())
    }

    fn update_holiday(&self, holiday: &Holiday) -> Result<(), StoreError> {
        let mut row = self
            .holidays
            .get_mut(&holiday.id)
            .ok_or_else(|| StoreError::MissingRow {
                entity: "holiday",
                id: holiday.id.to_string(),
            })?;
        *row = holiday.clone();
        Ok(())
    }

    fn find_holiday(
        &self,
        id: HolidayId,
        include_deleted: bool,
    ) -> Result<Option<Holiday>, StoreError> {
        Ok(self
            .holidays
            .get(&id)
            .filter(|h| include_deleted || !h.deleted)
            .map(|h| h.value().clone()))
    }

    fn list_holidays(
        &self,
        company_id: CompanyId,
        active_only: bool,
        include_deleted: bool,
    ) -> Result<Vec<Holiday>, StoreError> {
        let mut holidays: Vec<Holiday> = self
            .holidays
            .iter()
            .filter(|h| {
                h.company_id == company_id
                    && (!active_only || h.active)
                    && (include_deleted || !h.deleted)
            })
            .map(|h| h.value().clone())
            .collect();
        holidays.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        Ok(holidays)
    }
}
