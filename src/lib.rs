//! Payroll calculation engine.
//!
//! This crate turns per-day attendance and an employee's financial profile
//! into an itemized payroll line: overtime pay, gross pay, progressive income
//! tax, provident and trust fund contributions and net pay, each step
//! recorded in an audit trace. Bulk runs compute a whole workforce for one
//! pay period, isolating per-employee failures and flagging periods that
//! were already paid.
//!
//! - [`calculation`]: attendance aggregation and the payroll rules.
//! - [`batch`]: bulk previews and runs.
//! - [`store`]: the employee, attendance and payroll collaborator traits.
//! - [`config`]: YAML payroll policy and effective-dated tax tables.
//! - [`api`]: the axum HTTP surface.

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
