//! Payroll line computation.
//!
//! Chains the overtime, statutory deduction and leave rules into a single
//! [`PayrollLine`]. Components are rounded to cents as they are produced, and
//! deductions are assessed on the rounded gross pay, so the line's identities
//! hold exactly and provident fund is always `round(rate * gross)`.

use rust_decimal::Decimal;

use super::deductions::calculate_statutory_deductions;
use super::leave::calculate_leave_deduction;
use super::overtime::calculate_overtime_pay;
use crate::config::PayrollPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, EmployeeFinancialProfile, PayrollCalculation, PayrollLine,
    PeriodAttendanceTotals, round_money,
};

/// Computes the payroll line for one employee and period.
///
/// Equivalent to [`compute_payroll_with_audit`] without the trace.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if the base salary or either hours
/// total is negative, if the policy is invalid, or if an amount does not fit
/// in a [`Decimal`]. A negative net pay is not an error here; see
/// [`ensure_payable`].
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::compute_payroll;
/// use payroll_engine::config::PayrollPolicy;
/// use payroll_engine::models::{
///     EmployeeFinancialProfile, EmployeeStatus, EmploymentClassification, PeriodAttendanceTotals,
/// };
/// use rust_decimal::Decimal;
///
/// let profile = EmployeeFinancialProfile {
///     id: 1,
///     employee_code: "EMP001".to_string(),
///     base_salary: Decimal::new(200_000, 0),
///     classification: EmploymentClassification::FullTime,
///     status: EmployeeStatus::Active,
/// };
///
/// let line = compute_payroll(
///     &profile,
///     &PeriodAttendanceTotals::default(),
///     &PayrollPolicy::default(),
/// )
/// .unwrap();
///
/// assert_eq!(line.tax_deduction, Decimal::new(3_000, 0));
/// assert_eq!(line.net_pay, Decimal::new(181_000, 0));
/// ```
pub fn compute_payroll(
    profile: &EmployeeFinancialProfile,
    totals: &PeriodAttendanceTotals,
    policy: &PayrollPolicy,
) -> EngineResult<PayrollLine> {
    compute_payroll_with_audit(profile, totals, policy).map(|calculation| calculation.line)
}

/// Computes the payroll line together with an audit trace of every rule
/// applied and the version of the policy used.
///
/// # Errors
///
/// See [`compute_payroll`].
pub fn compute_payroll_with_audit(
    profile: &EmployeeFinancialProfile,
    totals: &PeriodAttendanceTotals,
    policy: &PayrollPolicy,
) -> EngineResult<PayrollCalculation> {
    validate_inputs(profile, totals, policy)?;

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut step_number: u32 = 1;

    let overtime = calculate_overtime_pay(
        profile.base_salary,
        totals.total_overtime_hours,
        policy.settings.standard_monthly_hours,
        step_number,
    )?;
    steps.push(overtime.audit_step);
    step_number += 1;

    let basic_salary = round_money(profile.base_salary);
    let overtime_pay = round_money(overtime.overtime_pay);
    let gross_pay = basic_salary
        .checked_add(overtime_pay)
        .ok_or_else(|| EngineError::amount_out_of_range("base_salary"))?;

    let deductions =
        calculate_statutory_deductions(gross_pay, profile.classification, policy, step_number);
    step_number += deductions.audit_steps.len() as u32;
    steps.extend(deductions.audit_steps);

    let leave = calculate_leave_deduction(
        profile.base_salary,
        totals.leave_days,
        &policy.settings.leave,
        step_number,
    )?;
    steps.push(leave.audit_step);
    step_number += 1;

    let line = PayrollLine::from_components(
        basic_salary,
        overtime_pay,
        deductions.tax,
        deductions.provident_fund,
        deductions.trust_fund,
        leave.deduction,
    )
    .ok_or_else(|| EngineError::amount_out_of_range("base_salary"))?;
    steps.push(totals_step(&line, step_number));

    Ok(PayrollCalculation {
        line,
        audit_trace: AuditTrace { steps },
        policy_version: policy.version(),
    })
}

fn validate_inputs(
    profile: &EmployeeFinancialProfile,
    totals: &PeriodAttendanceTotals,
    policy: &PayrollPolicy,
) -> EngineResult<()> {
    if profile.base_salary < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "base_salary",
            format!("must not be negative, got {}", profile.base_salary),
        ));
    }
    if totals.total_hours < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "total_hours",
            format!("must not be negative, got {}", totals.total_hours),
        ));
    }
    if totals.total_overtime_hours < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "total_overtime_hours",
            format!("must not be negative, got {}", totals.total_overtime_hours),
        ));
    }
    policy
        .settings
        .validate()
        .and_then(|()| policy.tax_table.validate())
        .map_err(|message| EngineError::invalid_input("policy", message))
}

/// Rejects a line whose deductions exceed its gross pay.
///
/// Net pay is never clamped, so a line that cannot be paid out is reported
/// as invalid input on `net_pay`.
pub fn ensure_payable(line: &PayrollLine) -> EngineResult<()> {
    if line.has_negative_net_pay() {
        return Err(EngineError::invalid_input(
            "net_pay",
            format!(
                "deductions {} exceed gross pay {}",
                line.total_deductions, line.gross_pay
            ),
        ));
    }
    Ok(())
}

fn totals_step(line: &PayrollLine, step_number: u32) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "payroll_totals".to_string(),
        rule_name: "Payroll Totals".to_string(),
        input: serde_json::json!({
            "basic_salary": line.basic_salary.normalize().to_string(),
            "overtime_pay": line.overtime_pay.normalize().to_string(),
            "tax_deduction": line.tax_deduction.normalize().to_string(),
            "provident_fund_deduction": line.provident_fund_deduction.normalize().to_string(),
            "trust_fund_deduction": line.trust_fund_deduction.normalize().to_string(),
            "other_deduction": line.other_deduction.normalize().to_string()
        }),
        output: serde_json::json!({
            "gross_pay": line.gross_pay.normalize().to_string(),
            "total_deductions": line.total_deductions.normalize().to_string(),
            "net_pay": line.net_pay.normalize().to_string()
        }),
        reasoning: format!(
            "Net pay {} = gross pay {} - deductions {}",
            line.net_pay.normalize(),
            line.gross_pay.normalize(),
            line.total_deductions.normalize()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LeavePolicy, PolicySettings};
    use crate::models::{EmployeeStatus, EmploymentClassification};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_profile(salary: &str, classification: EmploymentClassification) -> EmployeeFinancialProfile {
        EmployeeFinancialProfile {
            id: 1,
            employee_code: "EMP001".to_string(),
            base_salary: dec(salary),
            classification,
            status: EmployeeStatus::Active,
        }
    }

    fn create_totals(days: u32, hours: &str, overtime: &str) -> PeriodAttendanceTotals {
        PeriodAttendanceTotals {
            days_worked: days,
            absent_days: 0,
            leave_days: 0,
            total_hours: dec(hours),
            total_overtime_hours: dec(overtime),
        }
    }

    #[test]
    fn test_below_threshold_pays_no_tax() {
        let line = compute_payroll(
            &create_profile("100000", EmploymentClassification::FullTime),
            &create_totals(20, "160", "0"),
            &PayrollPolicy::default(),
        )
        .unwrap();

        assert_eq!(line.gross_pay, dec("100000"));
        assert_eq!(line.tax_deduction, Decimal::ZERO);
        assert_eq!(line.provident_fund_deduction, dec("8000"));
        assert_eq!(line.net_pay, dec("92000"));
    }

    #[test]
    fn test_first_bracket_full_time() {
        let line = compute_payroll(
            &create_profile("200000", EmploymentClassification::FullTime),
            &create_totals(20, "160", "0"),
            &PayrollPolicy::default(),
        )
        .unwrap();

        assert_eq!(line.tax_deduction, dec("3000"));
        assert_eq!(line.provident_fund_deduction, dec("16000"));
        assert_eq!(line.total_deductions, dec("19000"));
        assert_eq!(line.net_pay, dec("181000"));
    }

    #[test]
    fn test_intern_is_exempt() {
        let line = compute_payroll(
            &create_profile("160000", EmploymentClassification::Intern),
            &create_totals(20, "160", "0"),
            &PayrollPolicy::default(),
        )
        .unwrap();

        assert_eq!(line.tax_deduction, Decimal::ZERO);
        assert_eq!(line.provident_fund_deduction, Decimal::ZERO);
        assert_eq!(line.net_pay, line.gross_pay);
        assert_eq!(line.net_pay, dec("160000"));
    }

    #[test]
    fn test_overtime_across_five_brackets() {
        let calculation = compute_payroll_with_audit(
            &create_profile("320000", EmploymentClassification::FullTime),
            &create_totals(20, "170", "10"),
            &PayrollPolicy::default(),
        )
        .unwrap();
        let line = calculation.line;

        assert_eq!(line.overtime_pay, dec("20000"));
        assert_eq!(line.gross_pay, dec("340000"));
        assert_eq!(line.tax_deduction, dec("29500.08"));
        assert_eq!(line.provident_fund_deduction, dec("27200"));
        assert_eq!(line.total_deductions, dec("56700.08"));
        assert_eq!(line.net_pay, dec("283299.92"));

        let overtime_step = &calculation.audit_trace.steps[0];
        assert_eq!(overtime_step.output["hourly_rate"].as_str().unwrap(), "2000");
    }

    #[test]
    fn test_no_attendance_pays_base_salary() {
        let line = compute_payroll(
            &create_profile("150000", EmploymentClassification::PartTime),
            &PeriodAttendanceTotals::default(),
            &PayrollPolicy::default(),
        )
        .unwrap();

        assert_eq!(line.overtime_pay, Decimal::ZERO);
        assert_eq!(line.gross_pay, dec("150000"));
        assert_eq!(line.tax_deduction, Decimal::ZERO);
        assert_eq!(line.net_pay, dec("138000"));
    }

    #[test]
    fn test_fractional_overtime_rounds_before_deductions() {
        let line = compute_payroll(
            &create_profile("185000", EmploymentClassification::FullTime),
            &create_totals(20, "162.5", "2.5"),
            &PayrollPolicy::default(),
        )
        .unwrap();

        // 2.5 * 1156.25 = 2890.625, rounded half away from zero
        assert_eq!(line.overtime_pay, dec("2890.63"));
        assert_eq!(line.gross_pay, dec("187890.63"));
        assert_eq!(line.provident_fund_deduction, round_money(dec("0.08") * line.gross_pay));
        assert_eq!(line.net_pay, line.gross_pay - line.total_deductions);
    }

    #[test]
    fn test_audit_trace_order() {
        let calculation = compute_payroll_with_audit(
            &create_profile("250000", EmploymentClassification::Contract),
            &create_totals(20, "160", "0"),
            &PayrollPolicy::default(),
        )
        .unwrap();

        let rules: Vec<&str> = calculation
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            rules,
            vec![
                "overtime_pay",
                "income_tax",
                "provident_fund",
                "trust_fund",
                "leave_deduction",
                "payroll_totals"
            ]
        );
        let numbers: Vec<u32> = calculation
            .audit_trace
            .steps
            .iter()
            .map(|s| s.step_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert!(calculation.policy_version.starts_with("built-in@"));
    }

    #[test]
    fn test_intern_audit_trace_records_exemption() {
        let calculation = compute_payroll_with_audit(
            &create_profile("160000", EmploymentClassification::Intern),
            &PeriodAttendanceTotals::default(),
            &PayrollPolicy::default(),
        )
        .unwrap();

        let rules: Vec<&str> = calculation
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            rules,
            vec!["overtime_pay", "statutory_exemption", "leave_deduction", "payroll_totals"]
        );
        assert_eq!(calculation.audit_trace.steps[3].step_number, 4);
    }

    #[test]
    fn test_unpaid_leave_policy_deducts_other() {
        let policy = PayrollPolicy {
            settings: PolicySettings {
                leave: LeavePolicy::Unpaid {
                    working_days_per_month: dec("20"),
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let totals = PeriodAttendanceTotals {
            leave_days: 2,
            ..create_totals(18, "144", "0")
        };

        let line = compute_payroll(
            &create_profile("100000", EmploymentClassification::FullTime),
            &totals,
            &policy,
        )
        .unwrap();

        assert_eq!(line.other_deduction, dec("10000"));
        assert_eq!(line.total_deductions, dec("18000"));
        assert_eq!(line.net_pay, dec("82000"));
    }

    #[test]
    fn test_paid_leave_does_not_change_pay() {
        let with_leave = PeriodAttendanceTotals {
            leave_days: 3,
            ..create_totals(17, "136", "0")
        };
        let line = compute_payroll(
            &create_profile("100000", EmploymentClassification::FullTime),
            &with_leave,
            &PayrollPolicy::default(),
        )
        .unwrap();

        assert_eq!(line.other_deduction, Decimal::ZERO);
        assert_eq!(line.net_pay, dec("92000"));
    }

    #[test]
    fn test_negative_salary_rejected() {
        let result = compute_payroll(
            &create_profile("-1", EmploymentClassification::FullTime),
            &PeriodAttendanceTotals::default(),
            &PayrollPolicy::default(),
        );

        match result {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "base_salary"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_overtime_rejected() {
        let result = compute_payroll(
            &create_profile("100000", EmploymentClassification::FullTime),
            &create_totals(1, "8", "-2"),
            &PayrollPolicy::default(),
        );

        match result {
            Err(EngineError::InvalidInput { field, .. }) => {
                assert_eq!(field, "total_overtime_hours")
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_standard_hours_rejected() {
        let policy = PayrollPolicy {
            settings: PolicySettings {
                standard_monthly_hours: Decimal::ZERO,
                ..Default::default()
            },
            ..Default::default()
        };

        let result = compute_payroll(
            &create_profile("100000", EmploymentClassification::FullTime),
            &PeriodAttendanceTotals::default(),
            &policy,
        );
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_same_inputs_same_output() {
        let profile = create_profile("275123.45", EmploymentClassification::FullTime);
        let totals = create_totals(21, "175.5", "7.25");
        let policy = PayrollPolicy::default();

        let first = compute_payroll_with_audit(&profile, &totals, &policy).unwrap();
        let second = compute_payroll_with_audit(&profile, &totals, &policy).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_overflowing_overtime_is_invalid_input() {
        let profile = EmployeeFinancialProfile {
            base_salary: Decimal::MAX,
            ..create_profile("0", EmploymentClassification::FullTime)
        };

        let result = compute_payroll(&profile, &create_totals(20, "360", "200"), &PayrollPolicy::default());

        assert_eq!(result, Err(EngineError::amount_out_of_range("base_salary")));
    }

    #[test]
    fn test_largest_salary_without_overtime_still_computes() {
        let profile = EmployeeFinancialProfile {
            base_salary: Decimal::MAX,
            ..create_profile("0", EmploymentClassification::FullTime)
        };

        let line = compute_payroll(&profile, &PeriodAttendanceTotals::default(), &PayrollPolicy::default())
            .unwrap();

        assert_eq!(line.gross_pay, Decimal::MAX);
        assert_eq!(line.net_pay, line.gross_pay - line.total_deductions);
        assert!(!line.has_negative_net_pay());
    }

    #[test]
    fn test_invalid_tax_table_rejected() {
        let mut policy = PayrollPolicy::default();
        policy.tax_table.brackets[1].rate = dec("1.5");

        let result = compute_payroll(
            &create_profile("200000", EmploymentClassification::FullTime),
            &PeriodAttendanceTotals::default(),
            &policy,
        );

        match result {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "policy"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_payable() {
        let policy = PayrollPolicy {
            settings: PolicySettings {
                leave: LeavePolicy::Unpaid {
                    working_days_per_month: dec("20"),
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let totals = PeriodAttendanceTotals {
            leave_days: 30,
            ..Default::default()
        };
        let profile = create_profile("100000", EmploymentClassification::FullTime);

        let line = compute_payroll(&profile, &totals, &policy).unwrap();
        assert_eq!(line.net_pay, dec("-58000"));
        match ensure_payable(&line) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "net_pay"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }

        let paid = compute_payroll(&profile, &PeriodAttendanceTotals::default(), &policy).unwrap();
        assert_eq!(ensure_payable(&paid), Ok(()));
    }
}
