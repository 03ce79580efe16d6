//! Payroll output models.
//!
//! This module contains the itemized [`PayrollLine`], the audit structures
//! that explain how a line was derived, and the [`PayrollRecord`] that a
//! payroll sink stores once a line is attributed to an employee and period.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PayPeriod, PeriodAttendanceTotals};
use crate::error::{EngineError, EngineResult};

/// Number of decimal places monetary values are stored with.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Rounds a monetary amount to storage precision, half away from zero.
///
/// # Example
///
/// ```
/// use payroll_engine::models::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("4999.985").unwrap()), Decimal::from_str("4999.99").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// An itemized payroll computation for one employee and one period.
///
/// Every component is rounded to two decimal places and the aggregate
/// fields are summed from the rounded components, so the identities
/// `gross_pay = basic_salary + overtime_pay`,
/// `total_deductions = tax + provident fund + trust fund + other` and
/// `net_pay = gross_pay - total_deductions` hold exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollLine {
    /// Base salary for the period.
    pub basic_salary: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// Basic salary plus overtime pay.
    pub gross_pay: Decimal,
    /// Progressive income tax.
    pub tax_deduction: Decimal,
    /// Employee provident fund contribution.
    pub provident_fund_deduction: Decimal,
    /// Secondary statutory (trust fund) contribution.
    pub trust_fund_deduction: Decimal,
    /// Any other deduction, such as unpaid leave.
    pub other_deduction: Decimal,
    /// Sum of all deductions.
    pub total_deductions: Decimal,
    /// Gross pay minus total deductions.
    pub net_pay: Decimal,
}

impl PayrollLine {
    /// Builds a line from its components, rounding each and deriving the
    /// aggregates.
    ///
    /// Returns `None` if an aggregate does not fit in a [`Decimal`].
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::PayrollLine;
    /// use rust_decimal::Decimal;
    ///
    /// let line = PayrollLine::from_components(
    ///     Decimal::new(100_000, 0),
    ///     Decimal::ZERO,
    ///     Decimal::ZERO,
    ///     Decimal::new(8_000, 0),
    ///     Decimal::ZERO,
    ///     Decimal::ZERO,
    /// )
    /// .unwrap();
    /// assert_eq!(line.net_pay, Decimal::new(92_000, 0));
    /// ```
    pub fn from_components(
        basic_salary: Decimal,
        overtime_pay: Decimal,
        tax_deduction: Decimal,
        provident_fund_deduction: Decimal,
        trust_fund_deduction: Decimal,
        other_deduction: Decimal,
    ) -> Option<Self> {
        let basic_salary = round_money(basic_salary);
        let overtime_pay = round_money(overtime_pay);
        let tax_deduction = round_money(tax_deduction);
        let provident_fund_deduction = round_money(provident_fund_deduction);
        let trust_fund_deduction = round_money(trust_fund_deduction);
        let other_deduction = round_money(other_deduction);

        let gross_pay = basic_salary.checked_add(overtime_pay)?;
        let total_deductions = tax_deduction
            .checked_add(provident_fund_deduction)?
            .checked_add(trust_fund_deduction)?
            .checked_add(other_deduction)?;

        Some(Self {
            basic_salary,
            overtime_pay,
            gross_pay,
            tax_deduction,
            provident_fund_deduction,
            trust_fund_deduction,
            other_deduction,
            total_deductions,
            net_pay: gross_pay.checked_sub(total_deductions)?,
        })
    }

    /// Returns true if deductions exceed gross pay.
    ///
    /// Callers treat this as a validation failure rather than clamping.
    pub fn has_negative_net_pay(&self) -> bool {
        self.net_pay < Decimal::ZERO
    }
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The ordered audit steps for one payroll computation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
}

/// A payroll line together with the trace that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollCalculation {
    /// The computed line.
    pub line: PayrollLine,
    /// How the line was derived.
    pub audit_trace: AuditTrace,
    /// Version label of the policy used.
    pub policy_version: String,
}

/// Lifecycle status of a stored payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Computed, awaiting approval.
    #[default]
    Pending,
    /// Approved for payment.
    Approved,
    /// Disbursed.
    Paid,
    /// Withdrawn.
    Cancelled,
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayrollStatus::Pending => "pending",
            PayrollStatus::Approved => "approved",
            PayrollStatus::Paid => "paid",
            PayrollStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A payroll line attributed to an employee, period and processing actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Unique identifier for this record.
    pub id: Uuid,
    /// Internal id of the employee.
    pub employee_id: i64,
    /// External employee code.
    pub employee_code: String,
    /// The pay period covered.
    pub pay_period: PayPeriod,
    /// The computed line.
    pub line: PayrollLine,
    /// The attendance totals the line was computed from.
    pub attendance: PeriodAttendanceTotals,
    /// Lifecycle status.
    pub status: PayrollStatus,
    /// Id of the actor who processed the record, if known.
    pub processed_by: Option<i64>,
    /// When the record was last processed.
    pub processed_at: DateTime<Utc>,
    /// Payment date, set once paid.
    pub pay_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: String,
}

impl PayrollRecord {
    /// Moves a pending record to approved.
    pub fn approve(&mut self, approved_by: Option<i64>, at: DateTime<Utc>) -> EngineResult<()> {
        self.transition(PayrollStatus::Approved, &[PayrollStatus::Pending])?;
        self.processed_by = approved_by;
        self.processed_at = at;
        Ok(())
    }

    /// Moves an approved record to paid.
    pub fn mark_paid(&mut self, pay_date: NaiveDate) -> EngineResult<()> {
        self.transition(PayrollStatus::Paid, &[PayrollStatus::Approved])?;
        self.pay_date = Some(pay_date);
        Ok(())
    }

    /// Cancels a record that has not been paid.
    pub fn cancel(&mut self) -> EngineResult<()> {
        self.transition(
            PayrollStatus::Cancelled,
            &[PayrollStatus::Pending, PayrollStatus::Approved],
        )
    }

    fn transition(&mut self, to: PayrollStatus, allowed_from: &[PayrollStatus]) -> EngineResult<()> {
        if !allowed_from.contains(&self.status) {
            return Err(EngineError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}
