//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod employee;
mod pay_period;
mod payroll;

pub use attendance::{AttendanceRecord, AttendanceStatus, PeriodAttendanceTotals};
pub use employee::{EmployeeFinancialProfile, EmployeeStatus, EmploymentClassification};
pub use pay_period::PayPeriod;
pub use payroll::{
    AuditStep, AuditTrace, MONEY_DECIMAL_PLACES, PayrollCalculation, PayrollLine, PayrollRecord,
    PayrollStatus, round_money,
};
