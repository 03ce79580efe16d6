//! Overtime pay calculation.
//!
//! Overtime is paid at the employee's hourly rate, derived by spreading the
//! monthly base salary over a standard number of monthly hours.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// Default number of standard hours in a month (40 hours over 4 weeks).
pub const DEFAULT_STANDARD_MONTHLY_HOURS: Decimal = Decimal::from_parts(160, 0, 0, false, 0);

/// The result of an overtime pay calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimePayResult {
    /// Base salary divided by the standard monthly hours.
    pub hourly_rate: Decimal,
    /// Overtime hours multiplied by the hourly rate, unrounded.
    pub overtime_pay: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates overtime pay for a period.
///
/// `hourly_rate = base_salary / standard_monthly_hours` and
/// `overtime_pay = overtime_hours * hourly_rate`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if `standard_monthly_hours` is not
/// positive, or if the rate or the pay does not fit in a [`Decimal`].
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_overtime_pay, DEFAULT_STANDARD_MONTHLY_HOURS};
/// use rust_decimal::Decimal;
///
/// let result = calculate_overtime_pay(
///     Decimal::new(320_000, 0),
///     Decimal::new(10, 0),
///     DEFAULT_STANDARD_MONTHLY_HOURS,
///     1,
/// )
/// .unwrap();
///
/// assert_eq!(result.hourly_rate, Decimal::new(2_000, 0));
/// assert_eq!(result.overtime_pay, Decimal::new(20_000, 0));
/// ```
pub fn calculate_overtime_pay(
    base_salary: Decimal,
    overtime_hours: Decimal,
    standard_monthly_hours: Decimal,
    step_number: u32,
) -> EngineResult<OvertimePayResult> {
    if standard_monthly_hours <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "standard_monthly_hours",
            format!("must be positive, got {}", standard_monthly_hours),
        ));
    }

    let hourly_rate = base_salary
        .checked_div(standard_monthly_hours)
        .ok_or_else(|| EngineError::amount_out_of_range("base_salary"))?;
    let overtime_pay = overtime_hours
        .checked_mul(hourly_rate)
        .ok_or_else(|| EngineError::amount_out_of_range("base_salary"))?;

    let reasoning = if overtime_hours.is_zero() {
        "No overtime hours recorded, no overtime pay".to_string()
    } else {
        format!(
            "{} overtime hours at {} per hour ({} / {} standard hours)",
            overtime_hours.normalize(),
            hourly_rate.normalize(),
            base_salary.normalize(),
            standard_monthly_hours.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime_pay".to_string(),
        rule_name: "Overtime Pay".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.normalize().to_string(),
            "overtime_hours": overtime_hours.normalize().to_string(),
            "standard_monthly_hours": standard_monthly_hours.normalize().to_string()
        }),
        output: serde_json::json!({
            "hourly_rate": hourly_rate.normalize().to_string(),
            "overtime_pay": overtime_pay.normalize().to_string()
        }),
        reasoning,
    };

    Ok(OvertimePayResult {
        hourly_rate,
        overtime_pay,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_no_overtime_hours() {
        let result =
            calculate_overtime_pay(dec("100000"), Decimal::ZERO, DEFAULT_STANDARD_MONTHLY_HOURS, 1)
                .unwrap();

        assert_eq!(result.hourly_rate, dec("625"));
        assert_eq!(result.overtime_pay, Decimal::ZERO);
        assert!(result.audit_step.reasoning.contains("No overtime"));
    }

    #[test]
    fn test_ten_hours_at_two_thousand() {
        let result =
            calculate_overtime_pay(dec("320000"), dec("10"), DEFAULT_STANDARD_MONTHLY_HOURS, 1)
                .unwrap();

        assert_eq!(result.hourly_rate, dec("2000"));
        assert_eq!(result.overtime_pay, dec("20000"));
        assert_eq!(result.audit_step.output["overtime_pay"].as_str().unwrap(), "20000");
    }

    #[test]
    fn test_fractional_hours() {
        let result =
            calculate_overtime_pay(dec("185000"), dec("2.5"), DEFAULT_STANDARD_MONTHLY_HOURS, 1)
                .unwrap();

        assert_eq!(result.hourly_rate, dec("1156.25"));
        assert_eq!(result.overtime_pay, dec("2890.625"));
    }

    #[test]
    fn test_custom_standard_hours() {
        let result = calculate_overtime_pay(dec("176000"), dec("4"), dec("176"), 1).unwrap();

        assert_eq!(result.hourly_rate, dec("1000"));
        assert_eq!(result.overtime_pay, dec("4000"));
        assert_eq!(
            result.audit_step.input["standard_monthly_hours"].as_str().unwrap(),
            "176"
        );
    }

    #[test]
    fn test_zero_standard_hours_rejected() {
        let result = calculate_overtime_pay(dec("100000"), dec("1"), Decimal::ZERO, 1);
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_overflowing_pay_is_rejected() {
        let result = calculate_overtime_pay(Decimal::MAX, dec("200"), DEFAULT_STANDARD_MONTHLY_HOURS, 1);

        match result {
            Err(EngineError::InvalidInput { field, message }) => {
                assert_eq!(field, "base_salary");
                assert_eq!(message, "amount out of range");
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_tiny_standard_hours_overflow_rate() {
        let result = calculate_overtime_pay(Decimal::MAX, Decimal::ZERO, dec("0.001"), 1);
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_audit_step_identity() {
        let result =
            calculate_overtime_pay(dec("100000"), dec("1"), DEFAULT_STANDARD_MONTHLY_HOURS, 4)
                .unwrap();
        assert_eq!(result.audit_step.step_number, 4);
        assert_eq!(result.audit_step.rule_id, "overtime_pay");
        assert_eq!(result.audit_step.rule_name, "Overtime Pay");
    }
}
