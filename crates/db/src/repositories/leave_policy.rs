//! Leave policy table.
//!
//! At most one live policy may exist per (company, leave type). The
//! secondary index enforces it the way a partial unique index would.

use dashmap::mapref::entry::Entry;
use tracing::debug;

use leavedesk_core::leave::{LeavePolicy, LeaveType};
use leavedesk_core::repository::{
    LeavePolicyRepository, POLICY_UNIQUE_CONSTRAINT, StoreError,
};
use leavedesk_shared::types::{CompanyId, LeavePolicyId};

use crate::store::MemoryStore;

fn duplicate() -> StoreError {
    StoreError::UniqueViolation {
        constraint: POLICY_UNIQUE_CONSTRAINT.to_string(),
    }
}

impl MemoryStore {
    fn lock_policy_writes(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.policy_writes
            .lock()
            .map_err(|_| StoreError::Backend("policy write lock poisoned".to_string()))
    }

    /// Points the index slot for `slot` at `id`, failing if another live policy holds it.
    fn claim_policy_slot(
        &self,
        slot: (CompanyId, LeaveType),
        id: LeavePolicyId,
    ) -> Result<(), StoreError> {
        match self.policy_index.entry(slot) {
            Entry::Occupied(holder) if *holder.get() != id => Err(duplicate()),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(vacant) => {
                vacant.insert(id);
                Ok(())
            }
        }
    }

    fn release_policy_slot(&self, slot: (CompanyId, LeaveType), id: LeavePolicyId) {
        self.policy_index.remove_if(&slot, |_, holder| *holder == id);
    }
}

impl LeavePolicyRepository for MemoryStore {
    fn insert_policy(&self, policy: LeavePolicy) -> Result<(), StoreError> {
        let _guard = self.lock_policy_writes()?;
        if !policy.deleted {
            self.claim_policy_slot((policy.company_id, policy.leave_type), policy.id)?;
        }
        debug!(policy_id = %policy.id, leave_type = %policy.leave_type, "Inserting leave policy");
        self.policies.insert(policy.id, policy);
        Ok(())
    }

    fn update_policy(&self, policy: &LeavePolicy) -> Result<(), StoreError> {
        let _guard = self.lock_policy_writes()?;
        let previous = self
            .policies
            .get(&policy.id)
            .map(|p| (p.company_id, p.leave_type))
            .ok_or_else(|| StoreError::MissingRow {
                entity: "leave policy",
                id: policy.id.to_string(),
            })?;

        let slot = (policy.company_id, policy.leave_type);
        if policy.deleted {
            self.release_policy_slot(previous, policy.id);
        } else {
            self.claim_policy_slot(slot, policy.id)?;
            if previous != slot {
                self.release_policy_slot(previous, policy.id);
            }
        }

        self.policies.insert(policy.id, policy.clone());
        debug!(policy_id = %policy.id, deleted = policy.deleted, "Updated leave policy");
        Ok(())
    }

    fn find_policy(
        &self,
        id: LeavePolicyId,
        include_deleted: bool,
    ) -> Result<Option<LeavePolicy>, StoreError> {
        Ok(self
            .policies
            .get(&id)
            .filter(|p| include_deleted || !p.deleted)
            .map(|p| p.value().clone()))
    }

    fn find_policy_by_type(
        &self,
        company_id: CompanyId,
        leave_type: LeaveType,
        include_deleted: bool,
    ) -> Result<Option<LeavePolicy>, StoreError> {
        if !include_deleted {
            let Some(id) = self.policy_index.get(&(company_id, leave_type)).map(|id| *id) else {
                return Ok(None);
            };
            return self.find_policy(id, false);
        }
        Ok(self
            .policies
            .iter()
            .find(|p| p.company_id == company_id && p.leave_type == leave_type)
            .map(|p| p.value().clone()))
    }

    fn list_policies(
        &self,
        company_id: CompanyId,
        active_only: bool,
        include_deleted: bool,
    ) -> Result<Vec<LeavePolicy>, StoreError> {
        let mut policies: Vec<LeavePolicy> = self
            .policies
            .iter()
            .filter(|p| {
                p.company_id == company_id
                    && (!active_only || p.active)
                    && (include_deleted || !p.deleted)
            })
            .map(|p| p.value().clone())
            .collect();
        policies.sort_by_key(|p| p.leave_type);
        Ok(policies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn policy(company_id: CompanyId, leave_type: LeaveType) -> LeavePolicy {
        LeavePolicy {
            id: LeavePolicyId::new(),
            company_id,
            leave_type,
            annual_quota: Decimal::from(12),
            monthly_accrual: Decimal::ZERO,
            carry_forward: false,
            max_carry_forward: Decimal::ZERO,
            encashment_allowed: false,
            half_day_allowed: true,
            active: true,
            deleted: false,
        }
    }

    #[test]
    fn test_one_live_policy_per_type() {
        let store = MemoryStore::new();
        let company = CompanyId::new();
        let casual = policy(company, LeaveType::CasualLeave);
        store.insert_policy(casual.clone()).unwrap();

        let err = store
            .insert_policy(policy(company, LeaveType::CasualLeave))
            .unwrap_err();
        assert!(err.is_unique_violation(POLICY_UNIQUE_CONSTRAINT));

        // Another company may use the same type.
        store.insert_policy(policy(CompanyId::new(), LeaveType::CasualLeave)).unwrap();

        // Deleting frees the slot.
        let mut deleted = casual.clone();
        deleted.deleted = true;
        store.update_policy(&deleted).unwrap();
        store.insert_policy(policy(company, LeaveType::CasualLeave)).unwrap();
        assert_eq!(store.list_policies(company, false, true).unwrap().len(), 2);
        assert_eq!(store.list_policies(company, false, false).unwrap().len(), 1);
    }

    #[test]
    fn test_update_rechecks_type_change() {
        let store = MemoryStore::new();
        let company = CompanyId::new();
        let casual = policy(company, LeaveType::CasualLeave);
        let sick = policy(company, LeaveType::SickLeave);
        store.insert_policy(casual.clone()).unwrap();
        store.insert_policy(sick.clone()).unwrap();

        let mut clash = sick.clone();
        clash.leave_type = LeaveType::CasualLeave;
        assert!(store.update_policy(&clash).is_err());
        assert_eq!(
            store.find_policy(sick.id, false).unwrap().unwrap().leave_type,
            LeaveType::SickLeave
        );

        let mut moved = sick.clone();
        moved.leave_type = LeaveType::CompOff;
        store.update_policy(&moved).unwrap();
        assert!(store.find_policy_by_type(company, LeaveType::SickLeave, false).unwrap().is_none());
        assert_eq!(
            store.find_policy_by_type(company, LeaveType::CompOff, false).unwrap().unwrap().id,
            sick.id
        );
    }
}
