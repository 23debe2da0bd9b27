//! Leave application service.
//!
//! Orchestrates applying, approving and cancelling leave against the
//! storage seams. Every balance change goes through
//! [`modify_balance`](crate::repository::LeaveBalanceRepository::modify_balance) so the read-modify-write is
//! atomic per balance row.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info, warn};

use leavedesk_shared::LeaveConfig;
use leavedesk_shared::types::LeaveApplicationId;

use super::balance::{BalanceEffect, BalanceKey};
use super::error::LeaveError;
use super::lifecycle::LeaveLifecycle;
use super::types::{ApplyLeaveInput, LeaveApplication, LeaveDecision, LeaveStatus};
use crate::calendar::{DateRange, leave_days};
use crate::clock::Clock;
use crate::org::access::{
    HR_ROLES, ensure_direct_manager, ensure_owner, ensure_role, ensure_same_company,
};
use crate::org::{Actor, Employee};
use crate::repository::{LeaveStore, StoreError};

/// Service for the leave application lifecycle.
pub struct LeaveApplicationService<S: LeaveStore, C: Clock> {
    store: Arc<S>,
    clock: C,
    config: LeaveConfig,
}

impl<S: LeaveStore, C: Clock> LeaveApplicationService<S, C> {
    /// Create a new leave application service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: C, config: LeaveConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Apply for leave on behalf of the caller.
    ///
    /// Reserves the computed days against the caller's current-year balance
    /// when one exists; an employee without a balance row may still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The date range is inverted, a half day spans several dates, the
    ///   start is in the past, or the policy is inactive or forbids half
    ///   days (validation)
    /// - The caller or the policy does not exist (not found)
    /// - The dates overlap a pending or approved application, or the
    ///   balance is insufficient (conflict)
    pub fn apply(
        &self,
        actor: &Actor,
        input: ApplyLeaveInput,
    ) -> Result<LeaveApplication, LeaveError> {
        let employee = self.load_employee(actor)?;
        let range = DateRange::new(input.start_date, input.end_date)?;
        if input.is_half_day && !range.is_single_day() {
            return Err(LeaveError::HalfDaySpansMultipleDays);
        }

        let today = self.clock.today();
        if !self.config.allow_backdated && range.start() < today {
            return Err(LeaveError::StartDateInPast(range.start()));
        }

        let policy = self
            .store
            .find_policy_by_type(employee.company_id, input.leave_type, false)?
            .ok_or(LeaveError::NoPolicyForType(input.leave_type))?;
        if !policy.active {
            return Err(LeaveError::PolicyInactive(input.leave_type));
        }
        if input.is_half_day && !policy.half_day_allowed {
            return Err(LeaveError::HalfDayNotAllowed(input.leave_type));
        }

        // A weekend-only range is accepted and holds zero days.
        let days = leave_days(&range, input.is_half_day);

        if let Some(existing) = self
            .store
            .find_overlapping(employee.id, &range)?
            .into_iter()
            .next()
        {
            return Err(LeaveError::OverlappingLeave(existing.id));
        }

        let key = BalanceKey::new(employee.id, input.leave_type, today.year());
        let balance_year = match self
            .store
            .modify_balance(&key, |balance| balance.try_reserve(days))?
        {
            Some(reserved) => {
                reserved?;
                debug!(
                    employee_id = %employee.id,
                    leave_type = %input.leave_type,
                    year = key.year,
                    days = %days,
                    "Reserved pending leave days"
                );
                Some(key.year)
            }
            None => {
                warn!(
                    employee_id = %employee.id,
                    leave_type = %input.leave_type,
                    year = key.year,
                    "No leave balance initialized, applying without reservation"
                );
                None
            }
        };

        let application = LeaveApplication {
            id: LeaveApplicationId::new(),
            employee_id: employee.id,
            company_id: employee.company_id,
            leave_type: input.leave_type,
            start_date: range.start(),
            end_date: range.end(),
            is_half_day: input.is_half_day,
            number_of_days: days,
            reason: input.reason,
            attachment_url: input.attachment_url,
            status: LeaveStatus::Pending,
            requires_hr_approval: days > self.config.hr_approval_threshold_days,
            balance_year,
            manager_approval: None,
            hr_approval: None,
            rejection: None,
            created_at: Utc::now(),
            deleted: false,
        };

        if let Err(err) = self.store.insert_application(application.clone()) {
            // Hand the reservation back before surfacing the failure.
            self.apply_effect(&application, BalanceEffect::ReleasePending)?;
            return Err(err.into());
        }

        info!(
            application_id = %application.id,
            employee_id = %application.employee_id,
            leave_type = %application.leave_type,
            days = %application.number_of_days,
            requires_hr_approval = application.requires_hr_approval,
            "Leave application submitted"
        );
        Ok(application)
    }

    /// Record the applicant's direct manager's decision.
    ///
    /// # Errors
    ///
    /// Returns an error if the application does not exist, the caller is
    /// not the applicant's direct manager in the same company, or the
    /// application is not awaiting the manager.
    pub fn approve_by_manager(
        &self,
        actor: &Actor,
        application_id: LeaveApplicationId,
        decision: &LeaveDecision,
    ) -> Result<LeaveApplication, LeaveError> {
        let mut application = self.load_application(application_id)?;
        ensure_same_company(actor, application.company_id)?;
        let applicant = self
            .store
            .find_employee(application.employee_id, true)?
            .ok_or(LeaveError::EmployeeNotFound(application.employee_id))?;
        ensure_direct_manager(actor, &applicant)?;

        let prior = application.status;
        let effect = LeaveLifecycle::manager_decision(
            &mut application,
            decision,
            actor.employee_id,
            self.clock.today(),
        )?;
        self.persist_transition(&application, prior)?;
        self.apply_effect(&application, effect)?;

        info!(
            application_id = %application.id,
            manager_id = %actor.employee_id,
            approved = decision.approved,
            status = %application.status,
            awaiting_hr = application.awaits_hr(),
            "Manager reviewed leave application"
        );
        Ok(application)
    }

    /// Record HR's decision on a manager-approved application.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an HR administrator of the
    /// application's company, the application does not exist, or it does
    /// not need or is not ready for HR review.
    pub fn approve_by_hr(
        &self,
        actor: &Actor,
        application_id: LeaveApplicationId,
        decision: &LeaveDecision,
    ) -> Result<LeaveApplication, LeaveError> {
        ensure_role(actor, HR_ROLES, "approve leave as HR")?;
        let mut application = self.load_application(application_id)?;
        ensure_same_company(actor, application.company_id)?;

        let prior = application.status;
        let effect = LeaveLifecycle::hr_decision(
            &mut application,
            decision,
            actor.employee_id,
            self.clock.today(),
        )?;
        self.persist_transition(&application, prior)?;
        self.apply_effect(&application, effect)?;

        info!(
            application_id = %application.id,
            hr_id = %actor.employee_id,
            approved = decision.approved,
            status = %application.status,
            "HR reviewed leave application"
        );
        Ok(application)
    }

    /// Cancel one of the caller's own applications.
    ///
    /// # Errors
    ///
    /// Returns an error if the application does not exist, belongs to
    /// someone else, is already closed, or is approved and already started.
    pub fn cancel(
        &self,
        actor: &Actor,
        application_id: LeaveApplicationId,
    ) -> Result<LeaveApplication, LeaveError> {
        let mut application = self.load_application(application_id)?;
        ensure_owner(actor, application.employee_id, "cancel leave")?;

        let prior = application.status;
        let effect = LeaveLifecycle::cancel(&mut application, self.clock.today())?;
        self.persist_transition(&application, prior)?;
        self.apply_effect(&application, effect)?;

        info!(
            application_id = %application.id,
            employee_id = %application.employee_id,
            prior_status = %prior,
            "Leave application cancelled"
        );
        Ok(application)
    }

    /// Fetch an application visible to the caller.
    ///
    /// The applicant and any member of the applicant's company may view it.
    ///
    /// # Errors
    ///
    /// Returns an error if it does not exist or belongs to another company.
    pub fn get(
        &self,
        actor: &Actor,
        application_id: LeaveApplicationId,
    ) -> Result<LeaveApplication, LeaveError> {
        let application = self.load_application(application_id)?;
        if application.employee_id != actor.employee_id {
            ensure_same_company(actor, application.company_id)?;
        }
        Ok(application)
    }

    /// The caller's own applications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn list_mine(&self, actor: &Actor) -> Result<Vec<LeaveApplication>, LeaveError> {
        Ok(self.store.list_by_employee(actor.employee_id, false)?)
    }

    /// Applications of the caller's direct reports waiting on the caller.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn pending_for_manager(&self, actor: &Actor) -> Result<Vec<LeaveApplication>, LeaveError> {
        let mut pending = Vec::new();
        for report in self.store.list_direct_reports(actor.employee_id, false)? {
            pending.extend(
                self.store
                    .list_by_employee(report.id, false)?
                    .into_iter()
                    .filter(LeaveApplication::awaits_manager),
            );
        }
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    /// Manager-approved applications in the caller's company waiting on HR.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an HR administrator.
    pub fn pending_for_hr(&self, actor: &Actor) -> Result<Vec<LeaveApplication>, LeaveError> {
        ensure_role(actor, HR_ROLES, "view HR approvals")?;
        Ok(self
            .store
            .list_by_company(actor.company_id, Some(LeaveStatus::Pending), false)?
            .into_iter()
            .filter(LeaveApplication::awaits_hr)
            .collect())
    }

    /// Applications in the caller's company lying entirely within `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns an error if `end` is before `start`.
    pub fn list_by_date_range(
        &self,
        actor: &Actor,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveApplication>, LeaveError> {
        let range = DateRange::new(start, end)?;
        Ok(self
            .store
            .list_by_company(actor.company_id, None, false)?
            .into_iter()
            .filter(|application| range.encloses(&application.range()))
            .collect())
    }

    fn load_employee(&self, actor: &Actor) -> Result<Employee, LeaveError> {
        self.store
            .find_employee(actor.employee_id, false)?
            .ok_or(LeaveError::EmployeeNotFound(actor.employee_id))
    }

    fn load_application(&self, id: LeaveApplicationId) -> Result<LeaveApplication, LeaveError> {
        self.store
            .find_application(id, false)?
            .ok_or(LeaveError::ApplicationNotFound(id))
    }

    /// Stores a transitioned application if nobody moved it since it was loaded.
    ///
    /// The loser of a race between two decisions sees the winner's status
    /// and never touches the balance.
    fn persist_transition(
        &self,
        application: &LeaveApplication,
        prior: LeaveStatus,
    ) -> Result<(), LeaveError> {
        match self.store.update_application(application, prior) {
            Ok(()) => Ok(()),
            Err(StoreError::StaleRow { .. }) => {
                let current = self.load_application(application.id)?.status;
                warn!(
                    application_id = %application.id,
                    expected = %prior,
                    current = %current,
                    "Leave application changed concurrently"
                );
                if current.is_terminal() {
                    Err(LeaveError::AlreadyClosed(current))
                } else {
                    Err(LeaveError::NotPending(current))
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Applies `effect` to the balance row the application reserved against.
    fn apply_effect(
        &self,
        application: &LeaveApplication,
        effect: BalanceEffect,
    ) -> Result<(), LeaveError> {
        if effect == BalanceEffect::None {
            return Ok(());
        }
        let Some(year) = application.balance_year else {
            debug!(
                application_id = %application.id,
                effect = ?effect,
                "Application holds no balance reservation"
            );
            return Ok(());
        };

        let key = BalanceKey::new(application.employee_id, application.leave_type, year);
        let days = application.number_of_days;
        match self
            .store
            .modify_balance(&key, |balance| balance.apply(effect, days).map(|()| balance.clone()))?
        {
            Some(updated) => {
                let balance = updated?;
                debug!(
                    application_id = %application.id,
                    effect = ?effect,
                    days = %days,
                    used = %balance.used,
                    pending = %balance.pending,
                    available = %balance.available,
                    "Leave balance updated"
                );
            }
            None => warn!(
                application_id = %application.id,
                employee_id = %application.employee_id,
                year,
                "Reserved leave balance no longer exists"
            ),
        }
        Ok(())
    }
}
