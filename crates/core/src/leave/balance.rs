//! Leave balance bookkeeping.
//!
//! A balance row tracks one employee's days for one leave type in one
//! year. `available` is always derived: after every mutation
//! `available == total_quota - used - pending`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use leavedesk_shared::types::{CompanyId, EmployeeId, LeaveBalanceId};

use super::types::LeaveType;

/// Identifies a balance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    /// Balance owner.
    pub employee_id: EmployeeId,
    /// Leave category.
    pub leave_type: LeaveType,
    /// Calendar year.
    pub year: i32,
}

impl BalanceKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(employee_id: EmployeeId, leave_type: LeaveType, year: i32) -> Self {
        Self {
            employee_id,
            leave_type,
            year,
        }
    }
}

/// Change a lifecycle transition makes to the applicant's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceEffect {
    /// Nothing moves.
    None,
    /// Days become pending.
    Reserve,
    /// Pending days become used.
    Commit,
    /// Pending days return to available.
    ReleasePending,
    /// Used days return to available.
    ReleaseUsed,
}

/// Balance arithmetic failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    /// Not enough available days.
    #[error("Insufficient leave balance: requested {requested}, available {available}")]
    Insufficient {
        /// Days requested.
        requested: Decimal,
        /// Days available.
        available: Decimal,
    },
}

/// A year's balance of one leave type for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Unique identifier.
    pub id: LeaveBalanceId,
    /// Balance owner.
    pub employee_id: EmployeeId,
    /// Owner's company.
    pub company_id: CompanyId,
    /// Leave category.
    pub leave_type: LeaveType,
    /// Calendar year.
    pub year: i32,
    /// Days granted, including accruals and carried-forward days.
    pub total_quota: Decimal,
    /// Days taken on approved leave.
    pub used: Decimal,
    /// Days held by applications awaiting approval.
    pub pending: Decimal,
    /// Days still free to apply for.
    pub available: Decimal,
    /// Days brought in from the previous year.
    pub carried_forward: Decimal,
    /// Soft-delete marker.
    pub deleted: bool,
}

impl LeaveBalance {
    /// Creates a fresh balance with the whole quota available.
    #[must_use]
    pub fn new(
        employee_id: EmployeeId,
        company_id: CompanyId,
        leave_type: LeaveType,
        year: i32,
        total_quota: Decimal,
    ) -> Self {
        Self {
            id: LeaveBalanceId::new(),
            employee_id,
            company_id,
            leave_type,
            year,
            total_quota,
            used: Decimal::ZERO,
            pending: Decimal::ZERO,
            available: total_quota,
            carried_forward: Decimal::ZERO,
            deleted: false,
        }
    }

    /// The row's key.
    #[must_use]
    pub const fn key(&self) -> BalanceKey {
        BalanceKey::new(self.employee_id, self.leave_type, self.year)
    }

    fn recompute(&mut self) {
        self.available = self.total_quota - self.used - self.pending;
    }

    /// Moves `days` from available to pending.
    ///
    /// # Errors
    ///
    /// Returns `BalanceError::Insufficient` if fewer than `days` are available.
    pub fn try_reserve(&mut self, days: Decimal) -> Result<(), BalanceError> {
        if self.available < days {
            return Err(BalanceError::Insufficient {
                requested: days,
                available: self.available,
            });
        }
        self.pending += days;
        self.recompute();
        Ok(())
    }

    /// Moves `days` from pending to used.
    pub fn commit(&mut self, days: Decimal) {
        let moved = days.min(self.pending);
        self.pending -= moved;
        self.used += moved;
        self.recompute();
    }

    /// Returns `days` of pending to available.
    pub fn release_pending(&mut self, days: Decimal) {
        self.pending = (self.pending - days).max(Decimal::ZERO);
        self.recompute();
    }

    /// Returns `days` of used to available.
    pub fn release_used(&mut self, days: Decimal) {
        self.used = (self.used - days).max(Decimal::ZERO);
        self.recompute();
    }

    /// Adds accrued days to the quota.
    pub fn accrue(&mut self, days: Decimal) {
        self.total_quota += days;
        self.recompute();
    }

    /// Records days carried in from the previous year.
    ///
    /// Replaces any earlier carry-in, so repeating a year-end run does not
    /// grant the days twice.
    pub fn carry_in(&mut self, days: Decimal) {
        self.total_quota += days - self.carried_forward;
        self.carried_forward = days;
        self.recompute();
    }

    /// Days that may roll into next year under a cap of `max`.
    #[must_use]
    pub fn carry_forward_amount(&self, max: Decimal) -> Decimal {
        self.available.min(max).max(Decimal::ZERO)
    }

    /// Applies a lifecycle effect for an application of `days`.
    ///
    /// `Reserve` is checked against the available days; the other effects
    /// only ever return days or move them between buckets.
    ///
    /// # Errors
    ///
    /// Returns `BalanceError::Insufficient` if a reservation does not fit.
    pub fn apply(&mut self, effect: BalanceEffect, days: Decimal) -> Result<(), BalanceError> {
        match effect {
            BalanceEffect::None => {}
            BalanceEffect::Reserve => self.try_reserve(days)?,
            BalanceEffect::Commit => self.commit(days),
            BalanceEffect::ReleasePending => self.release_pending(days),
            BalanceEffect::ReleaseUsed => self.release_used(days),
        }
        Ok(())
    }

    /// Checks the derived-available invariant and that no bucket is negative.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.available == self.total_quota - self.used - self.pending
            && self.used >= Decimal::ZERO
            && self.pending >= Decimal::ZERO
            && self.total_quota >= Decimal::ZERO
            && self.carried_forward >= Decimal::ZERO
    }
}
