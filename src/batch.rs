//! Bulk payroll runs.
//!
//! A batch computes one payroll line per employee for a single pay period.
//! Employees are processed independently: a failure for one employee is
//! recorded as a [`BatchError`] and the rest of the batch carries on. An
//! employee that already has payroll for the period, or that reappears after
//! a line was computed for it earlier in the batch, is reported as
//! [`EngineError::DuplicatePeriod`], never silently skipped.
//!
//! [`preview_batch`] and [`run_batch`] work on pre-aggregated inputs.
//! [`PayrollRun`] drives a full run against the collaborator traits in
//! [`crate::store`] and commits the results as pending payroll records.

use std::collections::HashSet;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{
    aggregate_attendance_in_period, compute_payroll_with_audit, ensure_payable,
    find_negative_hours,
};
use crate::config::PayrollPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    EmployeeFinancialProfile, EmploymentClassification, PayPeriod, PayrollLine, PayrollRecord,
    PayrollStatus, PeriodAttendanceTotals,
};
use crate::store::{AttendanceLedger, EmployeeDirectory, PayrollSink};

/// One employee's input to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInput {
    /// The employee being paid.
    pub profile: EmployeeFinancialProfile,
    /// Aggregated attendance for the period.
    pub totals: PeriodAttendanceTotals,
}

/// A successfully computed batch entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLine {
    /// Internal id of the employee.
    pub employee_id: i64,
    /// External employee code.
    pub employee_code: String,
    /// Employment classification.
    pub classification: EmploymentClassification,
    /// Whether statutory deductions were waived.
    pub statutory_exempt: bool,
    /// The attendance totals the line was computed from.
    pub attendance: PeriodAttendanceTotals,
    /// The computed line.
    pub line: PayrollLine,
}

/// A batch entry that could not be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    /// Internal id of the employee.
    pub employee_id: i64,
    /// External employee code.
    pub employee_code: String,
    /// Why the entry failed.
    pub error: EngineError,
}

impl BatchError {
    fn new(profile: &EmployeeFinancialProfile, error: EngineError) -> Self {
        Self {
            employee_id: profile.id,
            employee_code: profile.employee_code.clone(),
            error,
        }
    }
}

/// Aggregate figures over the successful lines of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchTotals {
    /// Sum of gross pay.
    pub total_gross: Decimal,
    /// Sum of total deductions.
    pub total_deductions: Decimal,
    /// Sum of net pay.
    pub total_net: Decimal,
    /// Number of successful lines.
    pub employee_count: usize,
}

impl BatchTotals {
    /// Sums the given lines, saturating at the bounds of [`Decimal`].
    pub fn from_lines(lines: &[BatchLine]) -> Self {
        lines.iter().fold(Self::default(), |totals, entry| Self {
            total_gross: totals.total_gross.saturating_add(entry.line.gross_pay),
            total_deductions: totals
                .total_deductions
                .saturating_add(entry.line.total_deductions),
            total_net: totals.total_net.saturating_add(entry.line.net_pay),
            employee_count: totals.employee_count + 1,
        })
    }

    /// Adds one line, or returns `None` if a sum leaves the range of
    /// [`Decimal`].
    pub fn with_line(&self, line: &PayrollLine) -> Option<Self> {
        Some(Self {
            total_gross: self.total_gross.checked_add(line.gross_pay)?,
            total_deductions: self.total_deductions.checked_add(line.total_deductions)?,
            total_net: self.total_net.checked_add(line.net_pay)?,
            employee_count: self.employee_count + 1,
        })
    }
}

/// The result of a batch: successful lines and per-employee errors, each in
/// input order, plus totals over the successful lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// The pay period the batch covers.
    pub pay_period: PayPeriod,
    /// Successfully computed entries.
    pub lines: Vec<BatchLine>,
    /// Entries that failed.
    pub errors: Vec<BatchError>,
    /// Totals over `lines`.
    pub totals: BatchTotals,
}

impl BatchOutcome {
    /// Returns true if no entry failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Computes a batch without consulting any stored payroll.
///
/// Only repeats of an employee within `inputs` are flagged as duplicates.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if the pay period is inverted.
/// Per-employee failures never fail the call; they appear in
/// [`BatchOutcome::errors`].
pub fn preview_batch(
    pay_period: &PayPeriod,
    inputs: &[BatchInput],
    policy: &PayrollPolicy,
) -> EngineResult<BatchOutcome> {
    process_batch(pay_period, inputs, policy, |_| Ok(false))
}

/// Computes a batch, flagging employees that `sink` already holds payroll
/// for in this period.
///
/// Nothing is written to `sink`.
///
/// # Errors
///
/// See [`preview_batch`].
pub fn run_batch(
    pay_period: &PayPeriod,
    inputs: &[BatchInput],
    policy: &PayrollPolicy,
    sink: &dyn PayrollSink,
) -> EngineResult<BatchOutcome> {
    process_batch(pay_period, inputs, policy, |employee_id| {
        sink.exists(employee_id, pay_period)
    })
}

fn process_batch<F>(
    pay_period: &PayPeriod,
    inputs: &[BatchInput],
    policy: &PayrollPolicy,
    already_processed: F,
) -> EngineResult<BatchOutcome>
where
    F: Fn(i64) -> EngineResult<bool>,
{
    pay_period.validate()?;

    info!(
        start_date = %pay_period.start_date,
        end_date = %pay_period.end_date,
        employee_count = inputs.len(),
        policy_version = %policy.version(),
        "Processing payroll batch"
    );

    // Employees that already have a computed line in this batch
    let mut seen: HashSet<i64> = HashSet::with_capacity(inputs.len());
    let mut lines = Vec::with_capacity(inputs.len());
    let mut errors = Vec::new();
    let mut totals = BatchTotals::default();

    for input in inputs {
        let result = process_entry(pay_period, input, policy, &seen, &already_processed)
            .and_then(|entry| {
                let next = totals
                    .with_line(&entry.line)
                    .ok_or_else(|| EngineError::amount_out_of_range("gross_pay"))?;
                Ok((entry, next))
            });

        match result {
            Ok((entry, next)) => {
                debug!(
                    employee_id = entry.employee_id,
                    gross_pay = %entry.line.gross_pay,
                    net_pay = %entry.line.net_pay,
                    "Computed payroll line"
                );
                totals = next;
                seen.insert(entry.employee_id);
                lines.push(entry);
            }
            Err(error) => {
                warn!(
                    employee_id = input.profile.id,
                    employee_code = %input.profile.employee_code,
                    error = %error,
                    "Payroll entry failed"
                );
                errors.push(BatchError::new(&input.profile, error));
            }
        }
    }

    info!(
        computed = lines.len(),
        failed = errors.len(),
        total_gross = %totals.total_gross,
        total_net = %totals.total_net,
        "Payroll batch complete"
    );

    Ok(BatchOutcome {
        pay_period: *pay_period,
        lines,
        errors,
        totals,
    })
}

fn process_entry<F>(
    pay_period: &PayPeriod,
    input: &BatchInput,
    policy: &PayrollPolicy,
    seen: &HashSet<i64>,
    already_processed: &F,
) -> EngineResult<BatchLine>
where
    F: Fn(i64) -> EngineResult<bool>,
{
    let profile = &input.profile;
    if seen.contains(&profile.id) || already_processed(profile.id)? {
        return Err(EngineError::DuplicatePeriod {
            employee_id: profile.id,
            start_date: pay_period.start_date,
            end_date: pay_period.end_date,
        });
    }

    let calculation = compute_payroll_with_audit(profile, &input.totals, policy)?;
    let line = calculation.line;
    ensure_payable(&line)?;

    Ok(BatchLine {
        employee_id: profile.id,
        employee_code: profile.employee_code.clone(),
        classification: profile.classification,
        statutory_exempt: profile.classification.is_statutory_exempt(),
        attendance: input.totals,
        line,
    })
}

/// The result of [`PayrollRun::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollRunReport {
    /// Computed lines and errors, with commit failures moved into `errors`.
    pub outcome: BatchOutcome,
    /// Records written to the sink.
    pub committed: Vec<PayrollRecord>,
}

/// A bulk payroll run over every active employee.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::batch::PayrollRun;
/// use payroll_engine::config::PayrollPolicy;
/// use payroll_engine::models::{
///     EmployeeFinancialProfile, EmployeeStatus, EmploymentClassification, PayPeriod,
/// };
/// use payroll_engine::store::InMemoryStore;
/// use rust_decimal::Decimal;
///
/// let store = InMemoryStore::new();
/// store.upsert_employee(EmployeeFinancialProfile {
///     id: 1,
///     employee_code: "EMP001".to_string(),
///     base_salary: Decimal::new(100_000, 0),
///     classification: EmploymentClassification::FullTime,
///     status: EmployeeStatus::Active,
/// });
///
/// let policy = PayrollPolicy::default();
/// let period = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
/// )
/// .unwrap();
///
/// let report = PayrollRun::new(&store, &store, &store, &policy)
///     .processed_by(5)
///     .execute(&period)
///     .unwrap();
///
/// assert_eq!(report.committed.len(), 1);
/// assert_eq!(report.committed[0].line.net_pay, Decimal::new(92_000, 0));
/// ```
pub struct PayrollRun<'a> {
    directory: &'a dyn EmployeeDirectory,
    ledger: &'a dyn AttendanceLedger,
    sink: &'a dyn PayrollSink,
    policy: &'a PayrollPolicy,
    processed_by: Option<i64>,
    commit_partial: bool,
}

impl<'a> PayrollRun<'a> {
    /// Creates a run that commits successful entries even when others fail.
    pub fn new(
        directory: &'a dyn EmployeeDirectory,
        ledger: &'a dyn AttendanceLedger,
        sink: &'a dyn PayrollSink,
        policy: &'a PayrollPolicy,
    ) -> Self {
        Self {
            directory,
            ledger,
            sink,
            policy,
            processed_by: None,
            commit_partial: true,
        }
    }

    /// Attributes committed records to `actor`.
    pub fn processed_by(mut self, actor: i64) -> Self {
        self.processed_by = Some(actor);
        self
    }

    /// Whether successful entries are committed when some entries failed.
    pub fn commit_partial(mut self, commit_partial: bool) -> Self {
        self.commit_partial = commit_partial;
        self
    }

    /// Computes the run without checking or writing stored payroll.
    pub fn preview(&self, pay_period: &PayPeriod) -> EngineResult<BatchOutcome> {
        let (inputs, gather_errors) = self.gather(pay_period)?;
        let mut outcome = preview_batch(pay_period, &inputs, self.policy)?;
        prepend_errors(&mut outcome, gather_errors);
        Ok(outcome)
    }

    /// Computes the run and commits the successful entries as pending
    /// payroll records.
    ///
    /// # Errors
    ///
    /// Fails only if the pay period is inverted or the directory cannot list
    /// employees. Everything else is reported per employee.
    pub fn execute(&self, pay_period: &PayPeriod) -> EngineResult<PayrollRunReport> {
        let (inputs, gather_errors) = self.gather(pay_period)?;
        let mut outcome = run_batch(pay_period, &inputs, self.policy, self.sink)?;
        prepend_errors(&mut outcome, gather_errors);

        if !outcome.is_clean() && !self.commit_partial {
            warn!(
                failed = outcome.errors.len(),
                "Payroll run has errors, nothing committed"
            );
            return Ok(PayrollRunReport {
                outcome,
                committed: Vec::new(),
            });
        }

        let processed_at = Utc::now();
        let mut committed = Vec::with_capacity(outcome.lines.len());
        let mut kept = Vec::with_capacity(outcome.lines.len());

        for entry in std::mem::take(&mut outcome.lines) {
            let record = PayrollRecord {
                id: Uuid::new_v4(),
                employee_id: entry.employee_id,
                employee_code: entry.employee_code.clone(),
                pay_period: *pay_period,
                line: entry.line.clone(),
                attendance: entry.attendance,
                status: PayrollStatus::Pending,
                processed_by: self.processed_by,
                processed_at,
                pay_date: None,
                notes: format!(
                    "Auto-generated bulk payroll. Hours: {:.2}, Days: {}",
                    entry.attendance.total_hours, entry.attendance.days_worked
                ),
            };

            match self.sink.persist(record.clone()) {
                Ok(()) => {
                    committed.push(record);
                    kept.push(entry);
                }
                Err(error) => {
                    warn!(
                        employee_id = entry.employee_id,
                        error = %error,
                        "Failed to commit payroll record"
                    );
                    outcome.errors.push(BatchError {
                        employee_id: entry.employee_id,
                        employee_code: entry.employee_code,
                        error,
                    });
                }
            }
        }

        outcome.lines = kept;
        outcome.totals = BatchTotals::from_lines(&outcome.lines);
        info!(
            committed = committed.len(),
            failed = outcome.errors.len(),
            processed_by = ?self.processed_by,
            "Payroll run committed"
        );

        Ok(PayrollRunReport { outcome, committed })
    }

    /// Builds batch inputs from the directory and ledger.
    fn gather(
        &self,
        pay_period: &PayPeriod,
    ) -> EngineResult<(Vec<BatchInput>, Vec<BatchError>)> {
        pay_period.validate()?;
        let employees = self.directory.active_employees()?;

        let mut inputs = Vec::with_capacity(employees.len());
        let mut errors = Vec::new();

        for profile in employees {
            let records = match self.ledger.records_for(profile.id, pay_period) {
                Ok(records) => records,
                Err(error) => {
                    errors.push(BatchError::new(&profile, error));
                    continue;
                }
            };

            if let Some(record) = find_negative_hours(&records) {
                let error = EngineError::invalid_input(
                    "hours_worked",
                    format!("negative hours recorded on {}", record.date),
                );
                errors.push(BatchError::new(&profile, error));
                continue;
            }

            let totals = aggregate_attendance_in_period(&records, pay_period);
            inputs.push(BatchInput { profile, totals });
        }

        Ok((inputs, errors))
    }
}

fn prepend_errors(outcome: &mut BatchOutcome, mut errors: Vec<BatchError>) {
    if errors.is_empty() {
        return;
    }
    errors.append(&mut outcome.errors);
    outcome.errors = errors;
}
