//! Leave balance table.

use dashmap::mapref::entry::Entry;
use tracing::debug;

use leavedesk_core::leave::{BalanceKey, LeaveBalance};
use leavedesk_core::repository::{BALANCE_UNIQUE_CONSTRAINT, LeaveBalanceRepository, StoreError};
use leavedesk_shared::types::{CompanyId, EmployeeId};

use crate::store::MemoryStore;

impl MemoryStore {
    fn collect_balances<P>(&self, predicate: P) -> Vec<LeaveBalance>
    where
        P: Fn(&LeaveBalance) -> bool,
    {
        let mut balances: Vec<LeaveBalance> = self
            .balances
            .iter()
            .filter(|b| predicate(b.value()))
            .map(|b| b.value().clone())
            .collect();
        balances.sort_by(|a, b| {
            a.employee_id
                .cmp(&b.employee_id)
                .then(a.leave_type.cmp(&b.leave_type))
        });
        balances
    }
}

impl LeaveBalanceRepository for MemoryStore {
    fn insert_balance(&self, balance: LeaveBalance) -> Result<(), StoreError> {
        match self.balances.entry(balance.key()) {
            Entry::Occupied(existing) if !existing.get().deleted => {
                Err(StoreError::UniqueViolation {
                    constraint: BALANCE_UNIQUE_CONSTRAINT.to_string(),
                })
            }
            // A soft-deleted row frees its key.
            Entry::Occupied(mut existing) => {
                existing.insert(balance);
                Ok(())
            }
            Entry::Vacant(slot) => {
                debug!(
                    employee_id = %balance.employee_id,
                    leave_type = %balance.leave_type,
                    year = balance.year,
                    total_quota = %balance.total_quota,
                    "Inserting leave balance"
                );
                slot.insert(balance);
                Ok(())
            }
        }
    }

    fn find_balance(
        &self,
        key: &BalanceKey,
        include_deleted: bool,
    ) -> Result<Option<LeaveBalance>, StoreError> {
        Ok(self
            .balances
            .get(key)
            .filter(|b| include_deleted || !b.deleted)
            .map(|b| b.value().clone()))
    }

    fn list_balances_for_employee(
        &self,
        employee_id: EmployeeId,
        year: i32,
        include_deleted: bool,
    ) -> Result<Vec<LeaveBalance>, StoreError> {
        Ok(self.collect_balances(|b| {
            b.employee_id == employee_id && b.year == year && (include_deleted || !b.deleted)
        }))
    }

    fn list_balances_for_company(
        &self,
        company_id: CompanyId,
        year: i32,
        include_deleted: bool,
    ) -> Result<Vec<LeaveBalance>, StoreError> {
        Ok(self.collect_balances(|b| {
            b.company_id == company_id && b.year == year && (include_deleted || !b.deleted)
        }))
    }

    fn modify_balance<F, R>(&self, key: &BalanceKey, f: F) -> Result<Option<R>, StoreError>
    where
        F: FnOnce(&mut LeaveBalance) -> R,
    {
        // The shard stays write-locked until `row` drops, so `f` sees and
        // leaves a consistent row.
        let Some(mut row) = self.balances.get_mut(key) else {
            return Ok(None);
        };
        if row.deleted {
            return Ok(None);
        }
        Ok(Some(f(row.value_mut())))
    }
}
