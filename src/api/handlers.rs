//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::batch::{BatchError, BatchInput, preview_batch};
use crate::calculation::{
    aggregate_attendance_in_period, compute_payroll_with_audit, ensure_payable,
    find_negative_hours,
};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, EmployeeFinancialProfile, PayPeriod, PeriodAttendanceTotals};

use super::request::{AttendanceRequest, CalculationRequest, PreviewRequest};
use super::response::{
    ApiError, ApiErrorResponse, PayrollCalculationResponse, PayrollPreviewResponse,
    PreviewErrorRow,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll/calculate", post(calculate_handler))
        .route("/payroll/preview", post(preview_handler))
        .with_state(state)
}

/// Handler for POST /payroll/calculate.
///
/// Computes one employee's payroll line for a period from raw attendance.
/// A line whose deductions exceed gross pay is rejected as invalid input.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_request(rejection_error(rejection, correlation_id)),
    };

    let start_time = Instant::now();
    match perform_calculation(request, state.config()) {
        Ok(mut result) => {
            let duration = start_time.elapsed();
            result.duration_us = duration.as_micros() as u64;
            info!(
                correlation_id = %correlation_id,
                employee_id = result.employee_id,
                gross_pay = %result.line.gross_pay,
                net_pay = %result.line.net_pay,
                duration_us = duration.as_micros(),
                "Payroll calculation completed successfully"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Payroll calculation failed"
            );
            engine_error_response(err)
        }
    }
}

/// Handler for POST /payroll/preview.
///
/// Computes every listed employee without storing anything. Per-employee
/// failures are returned as error rows alongside the successful rows.
async fn preview_handler(
    State(state): State<AppState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll preview request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_request(rejection_error(rejection, correlation_id)),
    };

    let start_time = Instant::now();
    match perform_preview(request, state.config()) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                rows = result.rows.len(),
                errors = result.errors.len(),
                total_net = %result.totals.total_net,
                duration_us = start_time.elapsed().as_micros(),
                "Payroll preview completed"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Payroll preview failed"
            );
            engine_error_response(err)
        }
    }
}

fn perform_calculation(
    request: CalculationRequest,
    config: &ConfigLoader,
) -> EngineResult<PayrollCalculationResponse> {
    let pay_period = PayPeriod::try_from(request.pay_period)?;
    let profile = EmployeeFinancialProfile::try_from(request.employee)?;
    let totals = period_totals(profile.id, request.attendance, &pay_period)?;
    let policy = config.policy_for(pay_period.start_date)?;

    let calculation = compute_payroll_with_audit(&profile, &totals, &policy)?;
    ensure_payable(&calculation.line)?;

    Ok(PayrollCalculationResponse {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        policy_version: calculation.policy_version,
        employee_id: profile.id,
        employee_code: profile.employee_code,
        pay_period,
        attendance: totals,
        line: calculation.line,
        audit_trace: calculation.audit_trace,
        duration_us: 0,
    })
}

fn perform_preview(
    request: PreviewRequest,
    config: &ConfigLoader,
) -> EngineResult<PayrollPreviewResponse> {
    let pay_period = PayPeriod::try_from(request.pay_period)?;
    let policy = config.policy_for(pay_period.start_date)?;

    let mut inputs = Vec::with_capacity(request.employees.len());
    let mut errors: Vec<PreviewErrorRow> = Vec::new();

    for entry in request.employees {
        let employee_id = entry.employee.id;
        let employee_code = entry.employee.employee_code.clone();
        let prepared = EmployeeFinancialProfile::try_from(entry.employee).and_then(|profile| {
            let totals = period_totals(profile.id, entry.attendance, &pay_period)?;
            Ok(BatchInput { profile, totals })
        });
        match prepared {
            Ok(input) => inputs.push(input),
            Err(error) => errors.push(
                BatchError {
                    employee_id,
                    employee_code,
                    error,
                }
                .into(),
            ),
        }
    }

    let outcome = preview_batch(&pay_period, &inputs, &policy)?;
    errors.extend(outcome.errors.into_iter().map(PreviewErrorRow::from));

    Ok(PayrollPreviewResponse {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        policy_version: policy.version(),
        pay_period,
        rows: outcome.lines,
        errors,
        totals: outcome.totals,
    })
}

/// Aggregates request attendance, rejecting negative hours.
fn period_totals(
    employee_id: i64,
    attendance: Vec<AttendanceRequest>,
    pay_period: &PayPeriod,
) -> EngineResult<PeriodAttendanceTotals> {
    let records: Vec<AttendanceRecord> = attendance
        .into_iter()
        .map(|day| day.into_record(employee_id))
        .collect();

    if let Some(record) = find_negative_hours(&records) {
        return Err(EngineError::invalid_input(
            "attendance",
            format!("negative hours recorded on {}", record.date),
        ));
    }

    Ok(aggregate_attendance_in_period(&records, pay_period))
}

fn rejection_error(rejection: JsonRejection, correlation_id: Uuid) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn bad_request(error: ApiError) -> Response {
    json_response(StatusCode::BAD_REQUEST, error)
}

fn engine_error_response(error: EngineError) -> Response {
    let api_error: ApiErrorResponse = error.into();
    json_response(api_error.status, api_error.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        AppState::new(ConfigLoader::built_in())
    }

    async fn post_json(router: Router, uri: &str, body: String) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_calculate_without_attendance() {
        let router = create_router(create_test_state());
        let body = r#"{
            "employee": {"id": 1, "employee_code": "EMP001", "base_salary": "200000", "classification": "full_time"},
            "pay_period": {"start_date": "2025-06-01", "end_date": "2025-06-30"}
        }"#;

        let (status, body) = post_json(router, "/payroll/calculate", body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        let result: PayrollCalculationResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.line.net_pay, rust_decimal::Decimal::new(181_000, 0));
        assert_eq!(result.engine_version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_syntax_error_is_malformed_json() {
        let router = create_router(create_test_state());

        let (status, body) = post_json(router, "/payroll/calculate", "{ not json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let router = create_router(create_test_state());
        let body = r#"{"pay_period": {"start_date": "2025-06-01", "end_date": "2025-06-30"}}"#;

        let (status, body) = post_json(router, "/payroll/calculate", body.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_preview_with_no_employees() {
        let router = create_router(create_test_state());
        let body = r#"{"pay_period": {"start_date": "2025-06-01", "end_date": "2025-06-30"}, "employees": []}"#;

        let (status, body) = post_json(router, "/payroll/preview", body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        let result: PayrollPreviewResponse = serde_json::from_slice(&body).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.totals.employee_count, 0);
    }
}
