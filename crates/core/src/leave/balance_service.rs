//! Leave balance service.
//!
//! Initializes yearly balances from company policies, runs the periodic
//! accrual and year-end carry-forward, and answers balance queries.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};

use leavedesk_shared::types::{CompanyId, EmployeeId};

use super::balance::{BalanceKey, LeaveBalance};
use super::error::LeaveError;
use super::types::LeaveType;
use crate::org::access::{HR_ROLES, ensure_role, ensure_same_company};
use crate::org::{Actor, Employee};
use crate::repository::{BALANCE_UNIQUE_CONSTRAINT, LeaveStore};

/// Service for leave balances.
pub struct LeaveBalanceService<S: LeaveStore> {
    store: Arc<S>,
}

impl<S: LeaveStore> LeaveBalanceService<S> {
    /// Create a new leave balance service.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a balance for every active policy of the employee's company.
    ///
    /// Existing balances are left alone, so calling this twice is harmless.
    /// Returns the balances created by this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an HR administrator of the
    /// employee's company or the employee does not exist.
    pub fn initialize_for_employee(
        &self,
        actor: &Actor,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, LeaveError> {
        ensure_role(actor, HR_ROLES, "initialize leave balances")?;
        let employee = self.load_employee(employee_id)?;
        ensure_same_company(actor, employee.company_id)?;

        let mut created = Vec::new();
        for policy in self.store.list_policies(employee.company_id, true, false)? {
            let key = BalanceKey::new(employee.id, policy.leave_type, year);
            if self.store.find_balance(&key, false)?.is_some() {
                continue;
            }
            let balance = LeaveBalance::new(
                employee.id,
                employee.company_id,
                policy.leave_type,
                year,
                policy.annual_quota,
            );
            match self.store.insert_balance(balance.clone()) {
                Ok(()) => created.push(balance),
                // Lost a race with a concurrent initialization.
                Err(err) if err.is_unique_violation(BALANCE_UNIQUE_CONSTRAINT) => {}
                Err(err) => return Err(err.into()),
            }
        }

        info!(
            employee_id = %employee.id,
            year,
            created = created.len(),
            "Leave balances initialized"
        );
        Ok(created)
    }

    /// Add one month's accrual to every balance of the company for `year`.
    ///
    /// Only active policies with a positive monthly accrual contribute.
    /// Returns the number of balances updated.
    ///
    /// # Errors
    ///
    /// Returns an error if `month` is outside 1..=12 or the caller is not an
    /// HR administrator of the company.
    pub fn process_monthly_accrual(
        &self,
        actor: &Actor,
        company_id: CompanyId,
        year: i32,
        month: u32,
    ) -> Result<usize, LeaveError> {
        ensure_role(actor, HR_ROLES, "run leave accrual")?;
        ensure_same_company(actor, company_id)?;
        if !(1..=12).contains(&month) {
            return Err(LeaveError::InvalidMonth(month));
        }

        let balances = self.store.list_balances_for_company(company_id, year, false)?;
        let mut updated = 0;
        for policy in self.store.list_policies(company_id, true, false)? {
            if policy.monthly_accrual <= Decimal::ZERO {
                continue;
            }
            for balance in balances.iter().filter(|b| b.leave_type == policy.leave_type) {
                let accrual = policy.monthly_accrual;
                if self
                    .store
                    .modify_balance(&balance.key(), |b| b.accrue(accrual))?
                    .is_some()
                {
                    updated += 1;
                }
            }
        }

        info!(company_id = %company_id, year, month, updated, "Monthly leave accrual processed");
        Ok(updated)
    }

    /// Roll unused days of `year` into `year + 1` for carry-forward policies.
    ///
    /// Each balance carries `min(available, max_carry_forward)`. Employees
    /// without a next-year balance are skipped. Returns the number of
    /// next-year balances updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an HR administrator of the company.
    pub fn process_year_end_carry_forward(
        &self,
        actor: &Actor,
        company_id: CompanyId,
        year: i32,
    ) -> Result<usize, LeaveError> {
        ensure_role(actor, HR_ROLES, "run year-end carry-forward")?;
        ensure_same_company(actor, company_id)?;

        let balances = self.store.list_balances_for_company(company_id, year, false)?;
        let mut updated = 0;
        for policy in self.store.list_policies(company_id, true, false)? {
            if !policy.carry_forward {
                continue;
            }
            for balance in balances.iter().filter(|b| b.leave_type == policy.leave_type) {
                let amount = balance.carry_forward_amount(policy.max_carry_forward);
                let next = BalanceKey::new(balance.employee_id, balance.leave_type, year + 1);
                match self.store.modify_balance(&next, |b| b.carry_in(amount))? {
                    Some(()) => {
                        debug!(
                            employee_id = %balance.employee_id,
                            leave_type = %balance.leave_type,
                            days = %amount,
                            "Carried leave forward"
                        );
                        updated += 1;
                    }
                    None => debug!(
                        employee_id = %balance.employee_id,
                        leave_type = %balance.leave_type,
                        year = year + 1,
                        "No next-year balance, skipping carry-forward"
                    ),
                }
            }
        }

        info!(company_id = %company_id, year, updated, "Year-end carry-forward processed");
        Ok(updated)
    }

    /// One balance of an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller may not view the employee or the
    /// balance does not exist.
    pub fn get_balance(
        &self,
        actor: &Actor,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<LeaveBalance, LeaveError> {
        self.authorize_view(actor, employee_id)?;
        self.store
            .find_balance(&BalanceKey::new(employee_id, leave_type, year), false)?
            .ok_or(LeaveError::BalanceNotFound {
                employee_id,
                leave_type,
                year,
            })
    }

    /// All balances of an employee for a year.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller may not view the employee.
    pub fn employee_balances(
        &self,
        actor: &Actor,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, LeaveError> {
        self.authorize_view(actor, employee_id)?;
        Ok(self.store.list_balances_for_employee(employee_id, year, false)?)
    }

    /// Days of unpaid leave taken by an employee in a year.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller may not view the employee.
    pub fn loss_of_pay_days(
        &self,
        actor: &Actor,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<Decimal, LeaveError> {
        Ok(self
            .employee_balances(actor, employee_id, year)?
            .iter()
            .filter(|b| b.leave_type == LeaveType::LossOfPay)
            .map(|b| b.used)
            .sum())
    }

    fn load_employee(&self, employee_id: EmployeeId) -> Result<Employee, LeaveError> {
        self.store
            .find_employee(employee_id, false)?
            .ok_or(LeaveError::EmployeeNotFound(employee_id))
    }

    /// Employees see their own balances; anyone else must share the company.
    fn authorize_view(&self, actor: &Actor, employee_id: EmployeeId) -> Result<(), LeaveError> {
        if actor.employee_id == employee_id {
            return Ok(());
        }
        let employee = self.load_employee(employee_id)?;
        ensure_same_company(actor, employee.company_id)?;
        Ok(())
    }
}
