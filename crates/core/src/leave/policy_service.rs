//! Leave policy administration.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use leavedesk_shared::types::LeavePolicyId;

use super::error::LeaveError;
use super::types::{LeavePolicy, LeavePolicyInput, LeaveType};
use crate::org::Actor;
use crate::org::access::{HR_ROLES, ensure_role, ensure_same_company};
use crate::repository::{LeaveStore, POLICY_UNIQUE_CONSTRAINT, StoreError};

impl LeavePolicyInput {
    /// Checks quota fields and resolves the carry-forward cap.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::InvalidPolicy` if a quantity is negative or a
    /// carry-forward policy has no cap.
    pub fn validate(&self) -> Result<Decimal, LeaveError> {
        if self.annual_quota < Decimal::ZERO {
            return Err(LeaveError::InvalidPolicy(
                "annual quota must not be negative".to_string(),
            ));
        }
        if self.monthly_accrual < Decimal::ZERO {
            return Err(LeaveError::InvalidPolicy(
                "monthly accrual must not be negative".to_string(),
            ));
        }
        match self.max_carry_forward {
            Some(max) if max < Decimal::ZERO => Err(LeaveError::InvalidPolicy(
                "max carry forward must not be negative".to_string(),
            )),
            Some(max) => Ok(max),
            None if self.carry_forward => Err(LeaveError::InvalidPolicy(
                "max carry forward is required when carry forward is enabled".to_string(),
            )),
            None => Ok(Decimal::ZERO),
        }
    }
}

/// Service for leave policy CRUD.
pub struct LeavePolicyService<S: LeaveStore> {
    store: Arc<S>,
}

impl<S: LeaveStore> LeavePolicyService<S> {
    /// Create a new leave policy service.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a policy for the caller's company.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an HR administrator, the input
    /// is invalid, or a live policy already covers the leave type.
    pub fn create(&self, actor: &Actor, input: LeavePolicyInput) -> Result<LeavePolicy, LeaveError> {
        ensure_role(actor, HR_ROLES, "manage leave policies")?;
        let max_carry_forward = input.validate()?;

        let policy = LeavePolicy {
            id: LeavePolicyId::new(),
            company_id: actor.company_id,
            leave_type: input.leave_type,
            annual_quota: input.annual_quota,
            monthly_accrual: input.monthly_accrual,
            carry_forward: input.carry_forward,
            max_carry_forward,
            encashment_allowed: input.encashment_allowed,
            half_day_allowed: input.half_day_allowed,
            active: input.active,
            deleted: false,
        };
        self.store
            .insert_policy(policy.clone())
            .map_err(|err| translate(err, policy.leave_type))?;

        info!(
            policy_id = %policy.id,
            company_id = %policy.company_id,
            leave_type = %policy.leave_type,
            annual_quota = %policy.annual_quota,
            "Leave policy created"
        );
        Ok(policy)
    }

    /// Replace the fields of an existing policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an HR administrator of the
    /// policy's company, the policy does not exist, the input is invalid,
    /// or the new leave type is already covered by another policy.
    pub fn update(
        &self,
        actor: &Actor,
        id: LeavePolicyId,
        input: LeavePolicyInput,
    ) -> Result<LeavePolicy, LeaveError> {
        ensure_role(actor, HR_ROLES, "manage leave policies")?;
        let mut policy = self.get(actor, id)?;
        let max_carry_forward = input.validate()?;

        policy.leave_type = input.leave_type;
        policy.annual_quota = input.annual_quota;
        policy.monthly_accrual = input.monthly_accrual;
        policy.carry_forward = input.carry_forward;
        policy.max_carry_forward = max_carry_forward;
        policy.encashment_allowed = input.encashment_allowed;
        policy.half_day_allowed = input.half_day_allowed;
        policy.active = input.active;
        self.store
            .update_policy(&policy)
            .map_err(|err| translate(err, policy.leave_type))?;

        info!(policy_id = %policy.id, leave_type = %policy.leave_type, "Leave policy updated");
        Ok(policy)
    }

    /// Soft-delete a policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an HR administrator of the
    /// policy's company or the policy does not exist.
    pub fn delete(&self, actor: &Actor, id: LeavePolicyId) -> Result<(), LeaveError> {
        ensure_role(actor, HR_ROLES, "manage leave policies")?;
        let mut policy = self.get(actor, id)?;
        policy.deleted = true;
        self.store.update_policy(&policy)?;

        info!(policy_id = %policy.id, leave_type = %policy.leave_type, "Leave policy deleted");
        Ok(())
    }

    /// Fetch a policy of the caller's company.
    ///
    /// # Errors
    ///
    /// Returns an error if it does not exist or belongs to another company.
    pub fn get(&self, actor: &Actor, id: LeavePolicyId) -> Result<LeavePolicy, LeaveError> {
        let policy = self
            .store
            .find_policy(id, false)?
            .ok_or(LeaveError::PolicyNotFound(id))?;
        ensure_same_company(actor, policy.company_id)?;
        Ok(policy)
    }

    /// Every live policy of the caller's company.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn list_all(&self, actor: &Actor) -> Result<Vec<LeavePolicy>, LeaveError> {
        Ok(self.store.list_policies(actor.company_id, false, false)?)
    }

    /// Live, active policies of the caller's company.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn list_active(&self, actor: &Actor) -> Result<Vec<LeavePolicy>, LeaveError> {
        Ok(self.store.list_policies(actor.company_id, true, false)?)
    }
}

/// Maps the per-type uniqueness violation to a conflict the caller can act on.
fn translate(err: StoreError, leave_type: LeaveType) -> LeaveError {
    if err.is_unique_violation(POLICY_UNIQUE_CONSTRAINT) {
        LeaveError::DuplicatePolicy(leave_type)
    } else {
        LeaveError::Storage(err)
    }
}
