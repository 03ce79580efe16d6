//! Progressive income tax calculation.
//!
//! Tax is evaluated against an ordered bracket ladder. Each bracket taxes
//! only the slice of gross pay that falls between the previous bracket's
//! upper bound and its own, at its own marginal rate:
//!
//! ```text
//! tax = Σ max(0, min(gross, upper_i) - upper_{i-1}) * rate_i
//! ```
//!
//! which is continuous at every boundary and non-decreasing in gross pay.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{TaxBracket, TaxTable};
use crate::models::AuditStep;

/// The built-in monthly bracket ladder.
///
/// | Upper bound | Marginal rate |
/// |---|---|
/// | 150,000 | 0% |
/// | 233,333 | 6% |
/// | 275,000 | 18% |
/// | 316,666 | 24% |
/// | 358,333 | 30% |
/// | unbounded | 30% |
pub fn default_tax_brackets() -> Vec<TaxBracket> {
    [
        (Some(150_000), 0),
        (Some(233_333), 6),
        (Some(275_000), 18),
        (Some(316_666), 24),
        (Some(358_333), 30),
        (None, 30),
    ]
    .into_iter()
    .map(|(upper, percent)| TaxBracket {
        upper_bound: upper.map(|u: i64| Decimal::new(u, 0)),
        rate: Decimal::new(percent, 2),
    })
    .collect()
}

/// The portion of gross pay taxed within one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    /// Lower end of the bracket (exclusive).
    pub lower_bound: Decimal,
    /// Upper end of the bracket, `None` if unbounded.
    pub upper_bound: Option<Decimal>,
    /// Marginal rate.
    pub rate: Decimal,
    /// Amount of gross pay inside the bracket.
    pub taxable_amount: Decimal,
    /// `taxable_amount * rate`.
    pub tax: Decimal,
}

/// The result of an income tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Total tax, unrounded.
    pub tax: Decimal,
    /// Contribution of each bracket reached by gross pay.
    pub slices: Vec<BracketSlice>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Splits gross pay across the brackets.
///
/// Brackets entirely above gross pay are omitted. Negative gross pay yields
/// no slices.
pub fn bracket_slices(gross_pay: Decimal, brackets: &[TaxBracket]) -> Vec<BracketSlice> {
    let mut slices = Vec::new();
    let mut lower_bound = Decimal::ZERO;

    for bracket in brackets {
        if gross_pay <= lower_bound {
            break;
        }
        let ceiling = match bracket.upper_bound {
            Some(upper) => gross_pay.min(upper),
            None => gross_pay,
        };
        let taxable_amount = (ceiling - lower_bound).max(Decimal::ZERO);
        slices.push(BracketSlice {
            lower_bound,
            upper_bound: bracket.upper_bound,
            rate: bracket.rate,
            taxable_amount,
            tax: taxable_amount * bracket.rate,
        });

        match bracket.upper_bound {
            Some(upper) => lower_bound = upper,
            None => break,
        }
    }

    slices
}

/// Evaluates the bracket ladder for a gross pay amount, unrounded.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{bracket_tax, default_tax_brackets};
/// use rust_decimal::Decimal;
///
/// let tax = bracket_tax(Decimal::new(200_000, 0), &default_tax_brackets());
/// assert_eq!(tax, Decimal::new(3_000, 0));
/// ```
pub fn bracket_tax(gross_pay: Decimal, brackets: &[TaxBracket]) -> Decimal {
    bracket_slices(gross_pay, brackets)
        .iter()
        .map(|slice| slice.tax)
        .sum()
}

/// Calculates progressive income tax on gross pay.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_income_tax;
/// use payroll_engine::config::TaxTable;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let result = calculate_income_tax(Decimal::new(340_000, 0), &TaxTable::default(), 2);
/// assert_eq!(result.tax, Decimal::from_str("29500.08").unwrap());
/// assert_eq!(result.slices.len(), 5);
/// ```
pub fn calculate_income_tax(gross_pay: Decimal, table: &TaxTable, step_number: u32) -> TaxResult {
    let slices = bracket_slices(gross_pay, &table.brackets);
    let tax: Decimal = slices.iter().map(|slice| slice.tax).sum();

    let taxed_slices: Vec<&BracketSlice> = slices
        .iter()
        .filter(|slice| !slice.tax.is_zero())
        .collect();

    let reasoning = if taxed_slices.is_empty() {
        format!(
            "Gross pay {} falls within the tax-free threshold",
            gross_pay.normalize()
        )
    } else {
        let parts: Vec<String> = taxed_slices
            .iter()
            .map(|slice| {
                format!(
                    "{} at {}%",
                    slice.taxable_amount.normalize(),
                    (slice.rate * Decimal::ONE_HUNDRED).normalize()
                )
            })
            .collect();
        format!(
            "Gross pay {} taxed progressively: {}",
            gross_pay.normalize(),
            parts.join(", ")
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax".to_string(),
        rule_name: "Progressive Income Tax".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.normalize().to_string(),
            "tax_table_effective_date": table.effective_date.to_string()
        }),
        output: serde_json::json!({
            "tax": tax.normalize().to_string(),
            "brackets_applied": taxed_slices.len()
        }),
        reasoning,
    };

    TaxResult {
        tax,
        slices,
        audit_step,
    }
}
