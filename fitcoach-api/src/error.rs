/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`; failures render as
/// `{"error": "<message>"}` with optional `details` (validation) or
/// `reason` (maintenance).
///
/// # Example
///
/// ```no_run
/// use fitcoach_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(id: Option<String>) -> ApiResult<Json<Value>> {
///     let id = id.ok_or_else(|| ApiError::BadRequest("id is required".to_string()))?;
///     Ok(Json(json!({ "success": true, "id": id, "error": null })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fitcoach_shared::auth::gate::Denial;
use fitcoach_shared::auth::session::SessionError;
use fitcoach_shared::llm::LlmError;
use fitcoach_shared::store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Validation failed (400) with per-field details
    ValidationError(Vec<ValidationErrorDetail>),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Service unavailable (503), `reason` carries the gate reason code
    ServiceUnavailable { message: String, reason: String },

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,

    /// Optional machine-readable reason code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApiError {
    /// Missing or invalid session
    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ServiceUnavailable { message, reason } => {
                write!(f, "Service unavailable ({}): {}", reason, message)
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => ErrorResponse {
                error: msg,
                details: None,
                reason: None,
            },
            ApiError::ValidationError(errors) => ErrorResponse {
                error: "Request validation failed".to_string(),
                details: Some(errors),
                reason: None,
            },
            ApiError::ServiceUnavailable { message, reason } => ErrorResponse {
                error: message,
                details: None,
                reason: Some(reason),
            },
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ErrorResponse {
                    error: "An internal error occurred".to_string(),
                    details: None,
                    reason: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::InternalError(format!("Store error: {}", err))
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

/// Gate denials; ownership failures are reported as absence
impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::AdminRequired => ApiError::Forbidden(denial.to_string()),
            Denial::NotOwner => ApiError::NotFound("Resource not found".to_string()),
            Denial::MaintenanceUserBlocked | Denial::MaintenanceNotAuthenticated => {
                ApiError::ServiceUnavailable {
                    message: denial.to_string(),
                    reason: denial.as_str().to_string(),
                }
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}
