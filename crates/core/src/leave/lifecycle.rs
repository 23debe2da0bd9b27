//! Leave application state transitions.
//!
//! Pure functions over a [`LeaveApplication`]. Each transition either
//! fails and leaves the application untouched, or updates it and returns
//! the [`BalanceEffect`] the caller must apply to the applicant's balance.
//! Authorization is checked by the service before calling in here.

use chrono::NaiveDate;

use leavedesk_shared::types::EmployeeId;

use super::balance::BalanceEffect;
use super::error::LeaveError;
use super::types::{Approval, LeaveApplication, LeaveDecision, LeaveStatus, Rejection};

/// Stateless leave application state machine.
pub struct LeaveLifecycle;

impl LeaveLifecycle {
    /// Applies the direct manager's decision.
    ///
    /// Approval of an application that needs HR sign-off records the
    /// manager's approval and keeps it PENDING with the days still held.
    /// While it waits for HR the manager may decide again: a second
    /// approval re-records the sign-off, a rejection closes it.
    ///
    /// # Errors
    ///
    /// - `NotPending` if the application is not PENDING
    pub fn manager_decision(
        application: &mut LeaveApplication,
        decision: &LeaveDecision,
        manager_id: EmployeeId,
        today: NaiveDate,
    ) -> Result<BalanceEffect, LeaveError> {
        if application.status != LeaveStatus::Pending {
            return Err(LeaveError::NotPending(application.status));
        }

        if !decision.approved {
            Self::reject(application, decision, manager_id, today);
            return Ok(BalanceEffect::ReleasePending);
        }

        application.manager_approval = Some(Approval {
            approved_by: manager_id,
            approved_on: today,
        });
        if application.requires_hr_approval {
            return Ok(BalanceEffect::None);
        }
        Self::move_to(application, LeaveStatus::Approved);
        Ok(BalanceEffect::Commit)
    }

    /// Applies HR's decision on a manager-approved application.
    ///
    /// # Errors
    ///
    /// - `NotPending` if the application is not PENDING
    /// - `HrApprovalNotRequired` if the application never needed HR
    /// - `ManagerApprovalMissing` if the manager has not signed off yet
    pub fn hr_decision(
        application: &mut LeaveApplication,
        decision: &LeaveDecision,
        hr_id: EmployeeId,
        today: NaiveDate,
    ) -> Result<BalanceEffect, LeaveError> {
        if application.status != LeaveStatus::Pending {
            return Err(LeaveError::NotPending(application.status));
        }
        if !application.requires_hr_approval {
            return Err(LeaveError::HrApprovalNotRequired);
        }
        if application.manager_approval.is_none() {
            return Err(LeaveError::ManagerApprovalMissing);
        }

        if !decision.approved {
            Self::reject(application, decision, hr_id, today);
            return Ok(BalanceEffect::ReleasePending);
        }

        application.hr_approval = Some(Approval {
            approved_by: hr_id,
            approved_on: today,
        });
        Self::move_to(application, LeaveStatus::Approved);
        Ok(BalanceEffect::Commit)
    }

    /// Cancels a pending application, or an approved one that has not started.
    ///
    /// Leave starting today may still be cancelled.
    ///
    /// # Errors
    ///
    /// - `AlreadyClosed` if the application is REJECTED or CANCELLED
    /// - `LeaveAlreadyStarted` if it is APPROVED and started before `today`
    pub fn cancel(
        application: &mut LeaveApplication,
        today: NaiveDate,
    ) -> Result<BalanceEffect, LeaveError> {
        if application.status.is_terminal() {
            return Err(LeaveError::AlreadyClosed(application.status));
        }
        let effect = if application.status == LeaveStatus::Approved {
            if application.start_date < today {
                return Err(LeaveError::LeaveAlreadyStarted(application.start_date));
            }
            BalanceEffect::ReleaseUsed
        } else {
            BalanceEffect::ReleasePending
        };
        Self::move_to(application, LeaveStatus::Cancelled);
        Ok(effect)
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Approved
    /// - Pending → Rejected
    /// - Pending → Cancelled
    /// - Approved → Cancelled
    #[must_use]
    pub fn is_valid_transition(from: LeaveStatus, to: LeaveStatus) -> bool {
        matches!(
            (from, to),
            (
                LeaveStatus::Pending,
                LeaveStatus::Approved | LeaveStatus::Rejected | LeaveStatus::Cancelled
            ) | (LeaveStatus::Approved, LeaveStatus::Cancelled)
        )
    }

    fn move_to(application: &mut LeaveApplication, to: LeaveStatus) {
        debug_assert!(
            Self::is_valid_transition(application.status, to),
            "illegal leave transition {} -> {to}",
            application.status
        );
        application.status = to;
    }

    fn reject(
        application: &mut LeaveApplication,
        decision: &LeaveDecision,
        rejected_by: EmployeeId,
        today: NaiveDate,
    ) {
        Self::move_to(application, LeaveStatus::Rejected);
        application.rejection = Some(Rejection {
            rejected_by,
            reason: decision.reason.clone(),
            rejected_on: today,
        });
    }
}
