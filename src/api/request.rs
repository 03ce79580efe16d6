//! Request types for the payroll API.
//!
//! This module defines the JSON bodies for `/payroll/calculate` and
//! `/payroll/preview`, and their conversion into domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, AttendanceStatus, EmployeeFinancialProfile, EmployeeStatus,
    EmploymentClassification, PayPeriod,
};

/// Request body for the `/payroll/calculate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The employee being paid.
    pub employee: EmployeeRequest,
    /// The pay period for the calculation.
    pub pay_period: PayPeriodRequest,
    /// Attendance recorded during the pay period.
    #[serde(default)]
    pub attendance: Vec<AttendanceRequest>,
}

/// Request body for the `/payroll/preview` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRequest {
    /// The pay period every employee is previewed for.
    pub pay_period: PayPeriodRequest,
    /// The employees to preview, each with their attendance.
    pub employees: Vec<PreviewEmployeeRequest>,
}

/// One employee in a preview request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewEmployeeRequest {
    /// The employee being paid.
    pub employee: EmployeeRequest,
    /// Attendance recorded during the pay period.
    #[serde(default)]
    pub attendance: Vec<AttendanceRequest>,
}

/// Employee financial profile in a request.
///
/// The classification is kept as a string so that an unknown value is
/// reported as invalid input rather than a malformed body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRequest {
    /// Internal employee id.
    pub id: i64,
    /// External employee code.
    pub employee_code: String,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Employment classification, e.g. `"full_time"` or `"intern"`.
    pub classification: String,
}

/// Pay period in a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PayPeriodRequest {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
}

/// One day of attendance in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// The date attended.
    pub date: NaiveDate,
    /// Attendance status for the day.
    pub status: AttendanceStatus,
    /// Hours worked; absent means zero.
    #[serde(default)]
    pub hours_worked: Option<Decimal>,
    /// Overtime hours; absent means zero.
    #[serde(default)]
    pub overtime_hours: Option<Decimal>,
}

impl AttendanceRequest {
    /// Attributes the day to an employee.
    pub fn into_record(self, employee_id: i64) -> AttendanceRecord {
        AttendanceRecord {
            employee_id,
            date: self.date,
            status: self.status,
            hours_worked: self.hours_worked,
            overtime_hours: self.overtime_hours,
        }
    }
}

impl TryFrom<EmployeeRequest> for EmployeeFinancialProfile {
    type Error = EngineError;

    fn try_from(req: EmployeeRequest) -> EngineResult<Self> {
        let classification: EmploymentClassification = req.classification.parse()?;
        Ok(EmployeeFinancialProfile {
            id: req.id,
            employee_code: req.employee_code,
            base_salary: req.base_salary,
            classification,
            status: EmployeeStatus::Active,
        })
    }
}

impl TryFrom<PayPeriodRequest> for PayPeriod {
    type Error = EngineError;

    fn try_from(req: PayPeriodRequest) -> EngineResult<Self> {
        PayPeriod::new(req.start_date, req.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_calculation_request() {
        let json = r#"{
            "employee": {
                "id": 7,
                "employee_code": "EMP007",
                "base_salary": "320000",
                "classification": "full_time"
            },
            "pay_period": {
                "start_date": "2025-06-01",
                "end_date": "2025-06-30"
            },
            "attendance": [
                {
                    "date": "2025-06-02",
                    "status": "present",
                    "hours_worked": "9.5",
                    "overtime_hours": "1.5"
                },
                {
                    "date": "2025-06-03",
                    "status": "absent"
                }
            ]
        }"#;

        let request: CalculationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.employee.id, 7);
        assert_eq!(request.employee.base_salary, Decimal::from_str("320000").unwrap());
        assert_eq!(request.attendance.len(), 2);
        assert_eq!(request.attendance[1].status, AttendanceStatus::Absent);
        assert_eq!(request.attendance[1].hours_worked, None);
    }

    #[test]
    fn test_attendance_defaults_to_empty() {
        let json = r#"{
            "employee": {
                "id": 1,
                "employee_code": "EMP001",
                "base_salary": "100000",
                "classification": "intern"
            },
            "pay_period": { "start_date": "2025-06-01", "end_date": "2025-06-30" }
        }"#;

        let request: CalculationRequest = serde_json::from_str(json).unwrap();
        assert!(request.attendance.is_empty());
    }

    #[test]
    fn test_employee_conversion() {
        let req = EmployeeRequest {
            id: 3,
            employee_code: "EMP003".to_string(),
            base_salary: Decimal::new(150_000, 0),
            classification: "part_time".to_string(),
        };

        let profile = EmployeeFinancialProfile::try_from(req).unwrap();
        assert_eq!(profile.classification, EmploymentClassification::PartTime);
        assert_eq!(profile.status, EmployeeStatus::Active);
    }

    #[test]
    fn test_unknown_classification_is_invalid_input() {
        let req = EmployeeRequest {
            id: 3,
            employee_code: "EMP003".to_string(),
            base_salary: Decimal::new(150_000, 0),
            classification: "consultant".to_string(),
        };

        let result = EmployeeFinancialProfile::try_from(req);
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_inverted_pay_period_rejected() {
        let req = PayPeriodRequest {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        };
        assert!(PayPeriod::try_from(req).is_err());
    }
}
