//! Employee financial profile and related types.
//!
//! This module defines the [`EmployeeFinancialProfile`] struct and the
//! [`EmploymentClassification`] enum that governs statutory deductions.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The employment arrangement of an employee.
///
/// Deserializing an unknown classification string fails, and so does
/// [`FromStr`]; both surface as invalid input at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentClassification {
    /// Permanent full-time employment.
    FullTime,
    /// Permanent part-time employment.
    PartTime,
    /// Fixed-term contract.
    Contract,
    /// Internship. Exempt from income tax and provident fund.
    Intern,
}

impl EmploymentClassification {
    /// All recognized classifications.
    pub const ALL: [EmploymentClassification; 4] = [
        EmploymentClassification::FullTime,
        EmploymentClassification::PartTime,
        EmploymentClassification::Contract,
        EmploymentClassification::Intern,
    ];

    /// Returns true if statutory deductions (tax, provident fund and trust
    /// fund) do not apply to this classification.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::EmploymentClassification;
    ///
    /// assert!(EmploymentClassification::Intern.is_statutory_exempt());
    /// assert!(!EmploymentClassification::Contract.is_statutory_exempt());
    /// ```
    pub fn is_statutory_exempt(self) -> bool {
        matches!(self, EmploymentClassification::Intern)
    }

    /// The snake_case name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            EmploymentClassification::FullTime => "full_time",
            EmploymentClassification::PartTime => "part_time",
            EmploymentClassification::Contract => "contract",
            EmploymentClassification::Intern => "intern",
        }
    }
}

impl fmt::Display for EmploymentClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmploymentClassification {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                EngineError::invalid_input(
                    "classification",
                    format!("unrecognized employment classification '{}'", s),
                )
            })
    }
}

/// Whether an employee is currently on the books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently employed; included in bulk payroll runs.
    #[default]
    Active,
    /// Temporarily inactive.
    Inactive,
    /// No longer employed.
    Terminated,
}

/// The slice of an employee record that payroll needs.
///
/// Identity fields are used only for attribution; computation reads
/// `base_salary` and `classification`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFinancialProfile {
    /// Internal id.
    pub id: i64,
    /// External employee code (e.g., "EMP007").
    pub employee_code: String,
    /// Fixed monthly base compensation.
    pub base_salary: Decimal,
    /// The employment arrangement.
    pub classification: EmploymentClassification,
    /// Employment status.
    #[serde(default)]
    pub status: EmployeeStatus,
}

impl EmployeeFinancialProfile {
    /// Returns true if the employee should be included in bulk runs.
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}
