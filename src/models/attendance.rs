//! Attendance models.
//!
//! This module defines the per-day [`AttendanceRecord`] supplied by the
//! attendance ledger and the [`PeriodAttendanceTotals`] value derived from a
//! period's records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of one employee's working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Present and on time.
    Present,
    /// Absent for the whole day.
    Absent,
    /// Present but arrived late.
    Late,
    /// Present for part of the day.
    HalfDay,
    /// On leave; accounted for separately from worked and absent days.
    Leave,
}

impl AttendanceStatus {
    /// Returns true if the day's hours count towards payroll.
    pub fn counts_as_worked(self) -> bool {
        matches!(
            self,
            AttendanceStatus::Present | AttendanceStatus::Late | AttendanceStatus::HalfDay
        )
    }
}

/// One employee's attendance on one calendar day.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{AttendanceRecord, AttendanceStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let record = AttendanceRecord {
///     employee_id: 7,
///     date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
///     status: AttendanceStatus::Present,
///     hours_worked: Some(Decimal::new(8, 0)),
///     overtime_hours: None,
/// };
/// assert_eq!(record.overtime_hours_or_zero(), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Internal id of the employee.
    pub employee_id: i64,
    /// The calendar day.
    pub date: NaiveDate,
    /// The day's outcome.
    pub status: AttendanceStatus,
    /// Hours worked, absent when nothing was recorded.
    #[serde(default)]
    pub hours_worked: Option<Decimal>,
    /// Overtime hours, absent when none were recorded.
    #[serde(default)]
    pub overtime_hours: Option<Decimal>,
}

impl AttendanceRecord {
    /// Hours worked, treating a missing value as zero.
    pub fn hours_worked_or_zero(&self) -> Decimal {
        self.hours_worked.unwrap_or(Decimal::ZERO)
    }

    /// Overtime hours, treating a missing value as zero.
    pub fn overtime_hours_or_zero(&self) -> Decimal {
        self.overtime_hours.unwrap_or(Decimal::ZERO)
    }
}

/// Attendance totals for one employee over one pay period.
///
/// A plain value: computed fresh for each calculation and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodAttendanceTotals {
    /// Days with status present, late or half day.
    pub days_worked: u32,
    /// Days with status absent.
    pub absent_days: u32,
    /// Days with status leave.
    #[serde(default)]
    pub leave_days: u32,
    /// Hours worked across all counted days.
    pub total_hours: Decimal,
    /// Overtime hours across all counted days.
    pub total_overtime_hours: Decimal,
}

impl PeriodAttendanceTotals {
    /// Share of scheduled days actually worked, as a fraction in `[0, 1]`.
    ///
    /// Leave days are excluded from the denominator. Returns `None` when no
    /// day was either worked or missed.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::PeriodAttendanceTotals;
    /// use rust_decimal::Decimal;
    ///
    /// let totals = PeriodAttendanceTotals {
    ///     days_worked: 18,
    ///     absent_days: 2,
    ///     leave_days: 3,
    ///     ..Default::default()
    /// };
    /// assert_eq!(totals.attendance_rate(), Some(Decimal::new(9, 1)));
    /// ```
    pub fn attendance_rate(&self) -> Option<Decimal> {
        let scheduled = self.days_worked + self.absent_days;
        if scheduled == 0 {
            return None;
        }
        Some(Decimal::from(self.days_worked) / Decimal::from(scheduled))
    }
}
