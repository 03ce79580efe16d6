//! Attendance aggregation.
//!
//! Reduces one employee's per-day attendance records for a pay period into
//! [`PeriodAttendanceTotals`]. The inclusion rules are:
//!
//! - `present`, `late`, `half_day`: hours and overtime are added and the day
//!   counts as worked.
//! - `absent`: contributes no hours and counts as an absent day.
//! - `leave`: contributes no hours and counts as neither worked nor absent;
//!   it is tallied separately in `leave_days`.

use rust_decimal::Decimal;

use crate::models::{AttendanceRecord, AttendanceStatus, PayPeriod, PeriodAttendanceTotals};

/// Aggregates attendance records into period totals.
///
/// The reduction is a commutative sum, so the result does not depend on
/// record order. Records are not deduplicated; the ledger guarantees at most
/// one record per employee and date. An empty slice yields all-zero totals.
///
/// Hour sums saturate at [`Decimal::MAX`] instead of overflowing. Overtime
/// that large is rejected when it is priced.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::aggregate_attendance;
/// use payroll_engine::models::{AttendanceRecord, AttendanceStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let records = vec![
///     AttendanceRecord {
///         employee_id: 1,
///         date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
///         status: AttendanceStatus::Present,
///         hours_worked: Some(Decimal::new(8, 0)),
///         overtime_hours: Some(Decimal::new(15, 1)),
///     },
///     AttendanceRecord {
///         employee_id: 1,
///         date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
///         status: AttendanceStatus::Absent,
///         hours_worked: None,
///         overtime_hours: None,
///     },
/// ];
///
/// let totals = aggregate_attendance(&records);
/// assert_eq!(totals.days_worked, 1);
/// assert_eq!(totals.absent_days, 1);
/// assert_eq!(totals.total_hours, Decimal::new(8, 0));
/// assert_eq!(totals.total_overtime_hours, Decimal::new(15, 1));
/// ```
pub fn aggregate_attendance(records: &[AttendanceRecord]) -> PeriodAttendanceTotals {
    records
        .iter()
        .fold(PeriodAttendanceTotals::default(), |mut totals, record| {
            if record.status.counts_as_worked() {
                totals.days_worked += 1;
                totals.total_hours = totals
                    .total_hours
                    .saturating_add(record.hours_worked_or_zero());
                totals.total_overtime_hours = totals
                    .total_overtime_hours
                    .saturating_add(record.overtime_hours_or_zero());
            } else if record.status == AttendanceStatus::Absent {
                totals.absent_days += 1;
            } else {
                totals.leave_days += 1;
            }
            totals
        })
}

/// Aggregates only the records dated within `period`.
///
/// Useful when a ledger returns a wider window than the period being paid.
pub fn aggregate_attendance_in_period(
    records: &[AttendanceRecord],
    period: &PayPeriod,
) -> PeriodAttendanceTotals {
    let in_period: Vec<AttendanceRecord> = records
        .iter()
        .filter(|record| period.contains_date(record.date))
        .cloned()
        .collect();
    aggregate_attendance(&in_period)
}

/// Returns the first record carrying negative hours, if any.
pub(crate) fn find_negative_hours(records: &[AttendanceRecord]) -> Option<&AttendanceRecord> {
    records.iter().find(|record| {
        record.hours_worked_or_zero() < Decimal::ZERO
            || record.overtime_hours_or_zero() < Decimal::ZERO
    })
}
