//! Configuration types for payroll policy.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{
    DEFAULT_PROVIDENT_FUND_RATE, DEFAULT_STANDARD_MONTHLY_HOURS, DEFAULT_TRUST_FUND_RATE,
    default_tax_brackets,
};

/// One rung of a progressive tax ladder.
///
/// The bracket covers gross pay from the previous bracket's upper bound up
/// to `upper_bound`; `None` means the bracket is unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Upper end of the bracket, inclusive.
    pub upper_bound: Option<Decimal>,
    /// Marginal rate applied to the slice of pay inside the bracket.
    pub rate: Decimal,
}

/// A progressive tax table effective from a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTable {
    /// First date the table applies to.
    pub effective_date: NaiveDate,
    /// Brackets ordered by ascending upper bound.
    pub brackets: Vec<TaxBracket>,
}

impl TaxTable {
    /// Checks that the table describes a continuous step function.
    ///
    /// Requires at least one bracket, strictly increasing positive upper
    /// bounds, a final unbounded bracket and rates within `[0, 1]`.
    pub fn validate(&self) -> Result<(), String> {
        let Some(last) = self.brackets.last() else {
            return Err("tax table has no brackets".to_string());
        };
        if last.upper_bound.is_some() {
            return Err("last tax bracket must be unbounded".to_string());
        }

        let mut previous = Decimal::ZERO;
        for (index, bracket) in self.brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(format!(
                    "bracket {} has rate {} outside [0, 1]",
                    index + 1,
                    bracket.rate
                ));
            }
            match bracket.upper_bound {
                Some(bound) if bound <= previous => {
                    return Err(format!(
                        "bracket {} upper bound {} does not exceed {}",
                        index + 1,
                        bound,
                        previous
                    ));
                }
                Some(bound) => previous = bound,
                None if index + 1 != self.brackets.len() => {
                    return Err(format!("bracket {} is unbounded but not last", index + 1));
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl Default for TaxTable {
    fn default() -> Self {
        Self {
            effective_date: NaiveDate::MIN,
            brackets: default_tax_brackets(),
        }
    }
}

/// How leave days affect pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LeavePolicy {
    /// Leave is fully paid; base salary is not reduced.
    #[default]
    Paid,
    /// Each leave day deducts a daily share of base salary.
    Unpaid {
        /// Divisor turning monthly base salary into a daily rate.
        working_days_per_month: Decimal,
    },
}

/// Policy settings from `policy.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySettings {
    /// Version label recorded with every calculation.
    pub version: String,
    /// Divisor turning monthly base salary into an hourly overtime rate.
    pub standard_monthly_hours: Decimal,
    /// Provident fund rate applied to gross pay.
    pub provident_fund_rate: Decimal,
    /// Trust fund rate applied to gross pay.
    #[serde(default)]
    pub trust_fund_rate: Decimal,
    /// Leave treatment.
    #[serde(default)]
    pub leave: LeavePolicy,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            version: "built-in".to_string(),
            standard_monthly_hours: DEFAULT_STANDARD_MONTHLY_HOURS,
            provident_fund_rate: DEFAULT_PROVIDENT_FUND_RATE,
            trust_fund_rate: DEFAULT_TRUST_FUND_RATE,
            leave: LeavePolicy::Paid,
        }
    }
}

impl PolicySettings {
    /// Checks that divisors are positive and rates lie within `[0, 1]`.
    pub fn validate(&self) -> Result<(), String> {
        if self.standard_monthly_hours <= Decimal::ZERO {
            return Err("standard_monthly_hours must be positive".to_string());
        }
        for (name, rate) in [
            ("provident_fund_rate", self.provident_fund_rate),
            ("trust_fund_rate", self.trust_fund_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(format!("{} {} is outside [0, 1]", name, rate));
            }
        }
        if let LeavePolicy::Unpaid {
            working_days_per_month,
        } = self.leave
        {
            if working_days_per_month <= Decimal::ZERO {
                return Err("working_days_per_month must be positive".to_string());
            }
        }
        Ok(())
    }
}

/// Everything the calculator needs to turn totals into a payroll line.
///
/// [`PayrollPolicy::default`] carries the built-in policy: 160 standard
/// monthly hours, 8% provident fund, no trust fund, paid leave and the
/// default tax ladder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollPolicy {
    /// Scalar policy settings.
    pub settings: PolicySettings,
    /// The tax table in force.
    pub tax_table: TaxTable,
}

impl PayrollPolicy {
    /// Combines settings with a tax table.
    pub fn new(settings: PolicySettings, tax_table: TaxTable) -> Self {
        Self {
            settings,
            tax_table,
        }
    }

    /// Version label combining the settings version and table date.
    pub fn version(&self) -> String {
        format!(
            "{}@{}",
            self.settings.version, self.tax_table.effective_date
        )
    }
}

/// The complete policy configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    settings: PolicySettings,
    /// Tax tables by effective date (sorted oldest first).
    tax_tables: Vec<TaxTable>,
}

impl PolicyConfig {
    /// Creates a PolicyConfig from its component parts.
    pub fn new(settings: PolicySettings, tax_tables: Vec<TaxTable>) -> Self {
        let mut sorted_tables = tax_tables;
        sorted_tables.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            settings,
            tax_tables: sorted_tables,
        }
    }

    /// Returns the policy settings.
    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    /// Returns all tax tables, oldest first.
    pub fn tax_tables(&self) -> &[TaxTable] {
        &self.tax_tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn table(brackets: Vec<TaxBracket>) -> TaxTable {
        TaxTable {
            effective_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            brackets,
        }
    }

    #[test]
    fn test_default_tax_table_is_valid() {
        assert_eq!(TaxTable::default().validate(), Ok(()));
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(table(vec![]).validate().is_err());
    }

    #[test]
    fn test_bounded_last_bracket_rejected() {
        let result = table(vec![TaxBracket {
            upper_bound: Some(dec("1000")),
            rate: dec("0.1"),
        }])
        .validate();
        assert!(result.unwrap_err().contains("unbounded"));
    }

    #[test]
    fn test_non_increasing_bounds_rejected() {
        let result = table(vec![
            TaxBracket {
                upper_bound: Some(dec("1000")),
                rate: Decimal::ZERO,
            },
            TaxBracket {
                upper_bound: Some(dec("1000")),
                rate: dec("0.1"),
            },
            TaxBracket {
                upper_bound: None,
                rate: dec("0.2"),
            },
        ])
        .validate();
        assert!(result.unwrap_err().contains("does not exceed"));
    }

    #[test]
    fn test_unbounded_middle_bracket_rejected() {
        let result = table(vec![
            TaxBracket {
                upper_bound: None,
                rate: Decimal::ZERO,
            },
            TaxBracket {
                upper_bound: None,
                rate: dec("0.1"),
            },
        ])
        .validate();
        assert!(result.unwrap_err().contains("not last"));
    }

    #[test]
    fn test_rate_above_one_rejected() {
        let result = table(vec![TaxBracket {
            upper_bound: None,
            rate: dec("1.5"),
        }])
        .validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = PolicySettings::default();
        assert_eq!(settings.standard_monthly_hours, dec("160"));
        assert_eq!(settings.provident_fund_rate, dec("0.08"));
        assert_eq!(settings.trust_fund_rate, Decimal::ZERO);
        assert_eq!(settings.leave, LeavePolicy::Paid);
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn test_zero_standard_hours_rejected() {
        let settings = PolicySettings {
            standard_monthly_hours: Decimal::ZERO,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_leave_policy_yaml() {
        let paid: LeavePolicy = serde_yaml::from_str("kind: paid").unwrap();
        assert_eq!(paid, LeavePolicy::Paid);

        let unpaid: LeavePolicy =
            serde_yaml::from_str("kind: unpaid\nworking_days_per_month: \"22\"").unwrap();
        assert_eq!(
            unpaid,
            LeavePolicy::Unpaid {
                working_days_per_month: dec("22")
            }
        );
    }

    #[test]
    fn test_policy_config_sorts_tables() {
        let newer = TaxTable {
            effective_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            brackets: default_tax_brackets(),
        };
        let older = TaxTable {
            effective_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            brackets: default_tax_brackets(),
        };

        let config = PolicyConfig::new(PolicySettings::default(), vec![newer, older]);
        let dates: Vec<_> = config.tax_tables().iter().map(|t| t.effective_date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn test_policy_version_label() {
        let policy = PayrollPolicy::new(
            PolicySettings {
                version: "standard-2025".to_string(),
                ..Default::default()
            },
            table(default_tax_brackets()),
        );
        assert_eq!(policy.version(), "standard-2025@2025-04-01");
    }
}
