//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing payroll.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the payroll engine.
///
/// Every fallible operation in the crate returns this error type. None of
/// the variants describe transient conditions, so nothing is ever retried.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::InvalidInput {
///     field: "base_salary".to_string(),
///     message: "must not be negative".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid input 'base_salary': must not be negative");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// An input value was malformed or out of domain.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The offending field.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// A payroll record already exists for the employee and pay period.
    #[error("Payroll already exists for employee {employee_id} for period {start_date} to {end_date}")]
    DuplicatePeriod {
        /// Internal id of the employee.
        employee_id: i64,
        /// First day of the pay period.
        start_date: NaiveDate,
        /// Last day of the pay period.
        end_date: NaiveDate,
    },

    /// The employee directory has no entry for the given key.
    #[error("Employee not found: {key}")]
    EmployeeNotFound {
        /// The id or employee code that was looked up.
        key: String,
    },

    /// A payroll record was asked to move to a status it cannot reach.
    #[error("Cannot move payroll record from '{from}' to '{to}'")]
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No tax table is effective on the requested date.
    #[error("No tax table effective on {date}")]
    TaxTableNotFound {
        /// The date for which a table was requested.
        date: NaiveDate,
    },
}

impl EngineError {
    /// Shorthand for building an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// An [`EngineError::InvalidInput`] for arithmetic that would leave the
    /// range of [`rust_decimal::Decimal`].
    pub fn amount_out_of_range(field: impl Into<String>) -> Self {
        Self::invalid_input(field, "amount out of range")
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
