//! Collaborator seams for payroll runs.
//!
//! The payroll engine itself is pure. Bulk runs read employees and
//! attendance and write payroll records through the traits in this module,
//! so the same run logic works against a database, a remote service or the
//! [`InMemoryStore`] used for previews and tests.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, EmployeeFinancialProfile, PayPeriod, PayrollRecord, PayrollStatus,
};

/// Source of employee financial profiles.
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up an employee by internal id.
    fn find_by_id(&self, id: i64) -> EngineResult<EmployeeFinancialProfile>;

    /// Looks up an employee by external employee code.
    fn find_by_code(&self, employee_code: &str) -> EngineResult<EmployeeFinancialProfile>;

    /// All employees eligible for a bulk run, ordered by id.
    fn active_employees(&self) -> EngineResult<Vec<EmployeeFinancialProfile>>;
}

/// Source of per-day attendance records.
pub trait AttendanceLedger: Send + Sync {
    /// Records for one employee dated within `period`, ordered by date.
    fn records_for(&self, employee_id: i64, period: &PayPeriod)
    -> EngineResult<Vec<AttendanceRecord>>;
}

/// Destination for computed payroll records.
pub trait PayrollSink: Send + Sync {
    /// Returns true if a record already exists for the employee and period.
    fn exists(&self, employee_id: i64, period: &PayPeriod) -> EngineResult<bool>;

    /// Stores a record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicatePeriod`] if a record for the same
    /// employee and period is already stored.
    fn persist(&self, record: PayrollRecord) -> EngineResult<()>;
}

/// Narrows which stored records [`InMemoryStore::payroll_stats`] covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollStatsFilter {
    /// Only records for this employee.
    pub employee_id: Option<i64>,
    /// Only records whose period starts within this inclusive range.
    pub period_starts: Option<(NaiveDate, NaiveDate)>,
}

impl PayrollStatsFilter {
    fn matches(&self, record: &PayrollRecord) -> bool {
        let employee = self.employee_id.is_none_or(|id| id == record.employee_id);
        let period = self.period_starts.is_none_or(|(from, to)| {
            (from..=to).contains(&record.pay_period.start_date)
        });
        employee && period
    }
}

/// Counts and sums over stored payroll records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollStats {
    /// Records matched.
    pub total_records: usize,
    /// Matched records awaiting approval.
    pub pending: usize,
    /// Matched records approved for payment.
    pub approved: usize,
    /// Matched records disbursed.
    pub paid: usize,
    /// Matched records withdrawn.
    pub cancelled: usize,
    /// Sum of gross pay.
    pub total_gross: Decimal,
    /// Sum of total deductions.
    pub total_deductions: Decimal,
    /// Sum of net pay.
    pub total_net: Decimal,
}

impl PayrollStats {
    fn record(mut self, record: &PayrollRecord) -> Self {
        self.total_records += 1;
        match record.status {
            PayrollStatus::Pending => self.pending += 1,
            PayrollStatus::Approved => self.approved += 1,
            PayrollStatus::Paid => self.paid += 1,
            PayrollStatus::Cancelled => self.cancelled += 1,
        }
        self.total_gross = self.total_gross.saturating_add(record.line.gross_pay);
        self.total_deductions = self
            .total_deductions
            .saturating_add(record.line.total_deductions);
        self.total_net = self.total_net.saturating_add(record.line.net_pay);
        self
    }
}

/// A thread-safe in-memory implementation of every collaborator trait.
///
/// Attendance is keyed by employee and date, so recording a second entry
/// for the same day replaces the first.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    employees: RwLock<BTreeMap<i64, EmployeeFinancialProfile>>,
    attendance: RwLock<BTreeMap<(i64, NaiveDate), AttendanceRecord>>,
    payrolls: RwLock<Vec<PayrollRecord>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee.
    pub fn upsert_employee(&self, profile: EmployeeFinancialProfile) {
        self.employees
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(profile.id, profile);
    }

    /// Adds or replaces the attendance record for the record's employee and date.
    pub fn record_attendance(&self, record: AttendanceRecord) {
        self.attendance
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((record.employee_id, record.date), record);
    }

    /// A snapshot of every stored payroll record, in insertion order.
    pub fn payroll_records(&self) -> Vec<PayrollRecord> {
        self.payrolls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Approves a set of pending payroll records in one step.
    ///
    /// Either every listed record is approved or none is.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if an id is unknown and
    /// [`EngineError::InvalidStatusTransition`] if a record is not pending.
    pub fn approve_records(
        &self,
        ids: &[Uuid],
        approved_by: Option<i64>,
        at: DateTime<Utc>,
    ) -> EngineResult<usize> {
        let mut payrolls = self.payrolls.write().unwrap_or_else(PoisonError::into_inner);

        let mut approved = payrolls.clone();
        for id in ids {
            let record = approved
                .iter_mut()
                .find(|record| record.id == *id)
                .ok_or_else(|| {
                    EngineError::invalid_input("payroll_ids", format!("unknown payroll record {}", id))
                })?;
            record.approve(approved_by, at)?;
        }

        *payrolls = approved;
        Ok(ids.len())
    }

    /// Status counts and pay sums over the stored records matching `filter`.
    ///
    /// Sums saturate at the bounds of [`Decimal`].
    pub fn payroll_stats(&self, filter: &PayrollStatsFilter) -> PayrollStats {
        self.payrolls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|record| filter.matches(record))
            .fold(PayrollStats::default(), PayrollStats::record)
    }
}

impl EmployeeDirectory for InMemoryStore {
    fn find_by_id(&self, id: i64) -> EngineResult<EmployeeFinancialProfile> {
        self.employees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::EmployeeNotFound {
                key: id.to_string(),
            })
    }

    fn find_by_code(&self, employee_code: &str) -> EngineResult<EmployeeFinancialProfile> {
        self.employees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|profile| profile.employee_code == employee_code)
            .cloned()
            .ok_or_else(|| EngineError::EmployeeNotFound {
                key: employee_code.to_string(),
            })
    }

    fn active_employees(&self) -> EngineResult<Vec<EmployeeFinancialProfile>> {
        Ok(self
            .employees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|profile| profile.is_active())
            .cloned()
            .collect())
    }
}

impl AttendanceLedger for InMemoryStore {
    fn records_for(
        &self,
        employee_id: i64,
        period: &PayPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let attendance = self.attendance.read().unwrap_or_else(PoisonError::into_inner);
        Ok(attendance
            .range((employee_id, period.start_date)..=(employee_id, period.end_date))
            .map(|(_, record)| record.clone())
            .collect())
    }
}

impl PayrollSink for InMemoryStore {
    fn exists(&self, employee_id: i64, period: &PayPeriod) -> EngineResult<bool> {
        Ok(self
            .payrolls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|record| record.employee_id == employee_id && record.pay_period == *period))
    }

    fn persist(&self, record: PayrollRecord) -> EngineResult<()> {
        let mut payrolls = self.payrolls.write().unwrap_or_else(PoisonError::into_inner);
        let duplicate = payrolls.iter().any(|existing| {
            existing.employee_id == record.employee_id && existing.pay_period == record.pay_period
        });
        if duplicate {
            return Err(EngineError::DuplicatePeriod {
                employee_id: record.employee_id,
                start_date: record.pay_period.start_date,
                end_date: record.pay_period.end_date,
            });
        }
        payrolls.push(record);
        Ok(())
    }
}
