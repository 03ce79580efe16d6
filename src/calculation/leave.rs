//! Leave deduction.
//!
//! Under the default policy leave is paid and costs nothing. When leave is
//! configured as unpaid, every leave day deducts a daily share of the base
//! salary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// The result of applying the leave policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDeductionResult {
    /// Amount to deduct, unrounded.
    pub deduction: Decimal,
    /// The audit step recording this decision.
    pub audit_step: AuditStep,
}

/// Applies the leave policy to a period's leave days.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if the daily rate or the deduction
/// does not fit in a [`Decimal`].
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_leave_deduction;
/// use payroll_engine::config::LeavePolicy;
/// use rust_decimal::Decimal;
///
/// let policy = LeavePolicy::Unpaid { working_days_per_month: Decimal::new(20, 0) };
/// let result = calculate_leave_deduction(Decimal::new(200_000, 0), 2, &policy, 1).unwrap();
/// assert_eq!(result.deduction, Decimal::new(20_000, 0));
/// ```
pub fn calculate_leave_deduction(
    base_salary: Decimal,
    leave_days: u32,
    policy: &LeavePolicy,
    step_number: u32,
) -> EngineResult<LeaveDeductionResult> {
    let (deduction, reasoning) = match policy {
        LeavePolicy::Paid => (
            Decimal::ZERO,
            format!("{} leave days are paid, no deduction", leave_days),
        ),
        LeavePolicy::Unpaid {
            working_days_per_month,
        } => {
            let daily_rate = base_salary
                .checked_div(*working_days_per_month)
                .ok_or_else(|| EngineError::amount_out_of_range("base_salary"))?;
            let deduction = daily_rate
                .checked_mul(Decimal::from(leave_days))
                .ok_or_else(|| EngineError::amount_out_of_range("base_salary"))?;
            (
                deduction,
                format!(
                    "{} unpaid leave days at {} per day ({} / {} working days)",
                    leave_days,
                    daily_rate.normalize(),
                    base_salary.normalize(),
                    working_days_per_month.normalize()
                ),
            )
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "leave_deduction".to_string(),
        rule_name: "Leave Deduction".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.normalize().to_string(),
            "leave_days": leave_days,
            "policy": policy
        }),
        output: serde_json::json!({
            "deduction": deduction.normalize().to_string()
        }),
        reasoning,
    };

    Ok(LeaveDeductionResult {
        deduction,
        audit_step,
    })
}
