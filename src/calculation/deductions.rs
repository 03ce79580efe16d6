//! Statutory deductions.
//!
//! Income tax, provident fund and trust fund contributions, all computed on
//! gross pay and all waived for statutory-exempt classifications.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tax::calculate_income_tax;
use crate::config::PayrollPolicy;
use crate::models::{AuditStep, EmploymentClassification};

/// Default provident fund rate: 8% of gross pay.
pub const DEFAULT_PROVIDENT_FUND_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Default trust fund rate. Not currently levied.
pub const DEFAULT_TRUST_FUND_RATE: Decimal = Decimal::ZERO;

/// The statutory deductions for one payroll line, unrounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryDeductions {
    /// Progressive income tax.
    pub tax: Decimal,
    /// Provident fund contribution.
    pub provident_fund: Decimal,
    /// Trust fund contribution.
    pub trust_fund: Decimal,
    /// Whether the classification waived every deduction.
    pub exempt: bool,
    /// Audit steps, one per deduction (or a single exemption step).
    pub audit_steps: Vec<AuditStep>,
}

/// Calculates tax, provident fund and trust fund on gross pay.
///
/// Exempt classifications (see
/// [`EmploymentClassification::is_statutory_exempt`]) get zero for every
/// deduction and a single audit step recording the exemption.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_statutory_deductions;
/// use payroll_engine::config::PayrollPolicy;
/// use payroll_engine::models::EmploymentClassification;
/// use rust_decimal::Decimal;
///
/// let deductions = calculate_statutory_deductions(
///     Decimal::new(200_000, 0),
///     EmploymentClassification::FullTime,
///     &PayrollPolicy::default(),
///     2,
/// );
/// assert_eq!(deductions.tax, Decimal::new(3_000, 0));
/// assert_eq!(deductions.provident_fund, Decimal::new(16_000, 0));
/// ```
pub fn calculate_statutory_deductions(
    gross_pay: Decimal,
    classification: EmploymentClassification,
    policy: &PayrollPolicy,
    step_number_start: u32,
) -> StatutoryDeductions {
    if classification.is_statutory_exempt() {
        let audit_step = AuditStep {
            step_number: step_number_start,
            rule_id: "statutory_exemption".to_string(),
            rule_name: "Statutory Deduction Exemption".to_string(),
            input: serde_json::json!({
                "gross_pay": gross_pay.normalize().to_string(),
                "classification": classification.as_str()
            }),
            output: serde_json::json!({
                "tax": "0",
                "provident_fund": "0",
                "trust_fund": "0"
            }),
            reasoning: format!(
                "Classification '{}' is exempt from tax, provident fund and trust fund",
                classification
            ),
        };

        return StatutoryDeductions {
            tax: Decimal::ZERO,
            provident_fund: Decimal::ZERO,
            trust_fund: Decimal::ZERO,
            exempt: true,
            audit_steps: vec![audit_step],
        };
    }

    let tax_result = calculate_income_tax(gross_pay, &policy.tax_table, step_number_start);

    let provident_fund = gross_pay * policy.settings.provident_fund_rate;
    let provident_fund_step = fund_step(
        step_number_start + 1,
        "provident_fund",
        "Provident Fund Contribution",
        gross_pay,
        policy.settings.provident_fund_rate,
        provident_fund,
    );

    let trust_fund = gross_pay * policy.settings.trust_fund_rate;
    let trust_fund_step = fund_step(
        step_number_start + 2,
        "trust_fund",
        "Trust Fund Contribution",
        gross_pay,
        policy.settings.trust_fund_rate,
        trust_fund,
    );

    StatutoryDeductions {
        tax: tax_result.tax,
        provident_fund,
        trust_fund,
        exempt: false,
        audit_steps: vec![tax_result.audit_step, provident_fund_step, trust_fund_step],
    }
}

fn fund_step(
    step_number: u32,
    rule_id: &str,
    rule_name: &str,
    gross_pay: Decimal,
    rate: Decimal,
    amount: Decimal,
) -> AuditStep {
    let reasoning = if rate.is_zero() {
        format!("{} is not levied under the current policy", rule_name)
    } else {
        format!(
            "{}% of gross pay {}",
            (rate * Decimal::ONE_HUNDRED).normalize(),
            gross_pay.normalize()
        )
    };

    AuditStep {
        step_number,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.normalize().to_string(),
            "rate": rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    }
}
