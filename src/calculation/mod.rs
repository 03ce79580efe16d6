//! Calculation logic for the payroll engine.
//!
//! This module contains the attendance aggregation and every rule that turns
//! period totals into a payroll line: overtime pay, progressive income tax,
//! provident and trust fund contributions, and the leave deduction. Each
//! rule returns its value along with an [`AuditStep`](crate::models::AuditStep)
//! so the full derivation can be replayed.

mod attendance;
mod deductions;
mod leave;
mod overtime;
mod payroll;
mod tax;

pub(crate) use attendance::find_negative_hours;
pub use attendance::{aggregate_attendance, aggregate_attendance_in_period};
pub use deductions::{
    DEFAULT_PROVIDENT_FUND_RATE, DEFAULT_TRUST_FUND_RATE, StatutoryDeductions,
    calculate_statutory_deductions,
};
pub use leave::{LeaveDeductionResult, calculate_leave_deduction};
pub use overtime::{DEFAULT_STANDARD_MONTHLY_HOURS, OvertimePayResult, calculate_overtime_pay};
pub use payroll::{compute_payroll, compute_payroll_with_audit, ensure_payable};
pub use tax::{
    BracketSlice, TaxResult, bracket_slices, bracket_tax, calculate_income_tax,
    default_tax_brackets,
};
