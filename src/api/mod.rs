//! HTTP API module for the payroll engine.
//!
//! This module exposes single-employee payroll calculation and bulk payroll
//! preview as JSON endpoints over the calculation core.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AttendanceRequest, CalculationRequest, EmployeeRequest, PayPeriodRequest,
    PreviewEmployeeRequest, PreviewRequest,
};
pub use response::{
    ApiError, ApiErrorResponse, PayrollCalculationResponse, PayrollPreviewResponse,
    PreviewErrorRow, error_code,
};
pub use state::AppState;
