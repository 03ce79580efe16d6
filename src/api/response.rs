//! Response types for the payroll API.
//!
//! This module defines the success bodies, the error body and the mapping
//! from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::batch::{BatchError, BatchLine, BatchTotals};
use crate::error::EngineError;
use crate::models::{AuditTrace, PayPeriod, PayrollLine, PeriodAttendanceTotals};

/// Response body for `/payroll/calculate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollCalculationResponse {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Version label of the payroll policy applied.
    pub policy_version: String,
    /// Internal id of the employee.
    pub employee_id: i64,
    /// External employee code.
    pub employee_code: String,
    /// The pay period for this calculation.
    pub pay_period: PayPeriod,
    /// Attendance totals for the period.
    pub attendance: PeriodAttendanceTotals,
    /// The itemized payroll line.
    pub line: PayrollLine,
    /// How the line was derived.
    pub audit_trace: AuditTrace,
    /// Calculation duration in microseconds.
    pub duration_us: u64,
}

/// Response body for `/payroll/preview`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPreviewResponse {
    /// Unique identifier for this preview.
    pub calculation_id: Uuid,
    /// When the preview was computed.
    pub timestamp: DateTime<Utc>,
    /// Version label of the payroll policy applied.
    pub policy_version: String,
    /// The pay period previewed.
    pub pay_period: PayPeriod,
    /// One row per successfully computed employee, in request order.
    pub rows: Vec<BatchLine>,
    /// One row per employee that could not be computed.
    pub errors: Vec<PreviewErrorRow>,
    /// Totals over `rows`.
    pub totals: BatchTotals,
}

/// A failed employee in a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewErrorRow {
    /// Internal id of the employee.
    pub employee_id: i64,
    /// External employee code.
    pub employee_code: String,
    /// The error code, as used in [`ApiError::code`].
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl From<BatchError> for PreviewErrorRow {
    fn from(error: BatchError) -> Self {
        Self {
            employee_id: error.employee_id,
            employee_code: error.employee_code,
            code: error_code(&error.error).to_string(),
            message: error.error.to_string(),
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

/// The API error code for an engine error.
pub fn error_code(error: &EngineError) -> &'static str {
    match error {
        EngineError::InvalidInput { .. } => "INVALID_INPUT",
        EngineError::DuplicatePeriod { .. } => "DUPLICATE_PERIOD",
        EngineError::EmployeeNotFound { .. } => "EMPLOYEE_NOT_FOUND",
        EngineError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
        EngineError::ConfigNotFound { .. }
        | EngineError::ConfigParseError { .. }
        | EngineError::TaxTableNotFound { .. } => "CONFIG_ERROR",
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let code = error_code(&error);
        let message = error.to_string();
        match error {
            EngineError::InvalidInput { field, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    code,
                    message,
                    format!("Field '{}' is invalid", field),
                ),
            },
            EngineError::DuplicatePeriod { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::new(code, message),
            },
            EngineError::EmployeeNotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new(code, message),
            },
            EngineError::InvalidStatusTransition { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::new(code, message),
            },
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::TaxTableNotFound { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(code, "Configuration error", message),
            },
        }
    }
}
