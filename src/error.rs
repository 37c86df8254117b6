use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ZoneId;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Seconds a client should wait before retrying a failed upstream fetch
pub const RETRY_AFTER_SECS: u64 = 5;

/// Errors raised by the pricing library
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    #[error("Zone {0} is not configured in the grid topology")]
    UnknownZone(ZoneId),

    #[error("Agreed price must be positive, got {0}")]
    InvalidPrice(Decimal),

    #[error("Invalid zone rate {from} -> {to}: {reason}")]
    InvalidZoneRate {
        from: ZoneId,
        to: ZoneId,
        reason: String,
    },

    #[error("Zone rate source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Zone rate source timed out: {0}")]
    SourceTimeout(String),

    #[error("{0} is too large to represent")]
    Overflow(String),
}

impl PricingError {
    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PricingError::SourceUnavailable(_) | PricingError::SourceTimeout(_)
        )
    }

    pub(crate) fn overflow(what: &str) -> Self {
        PricingError::Overflow(what.to_string())
    }
}

/// Error codes for categorizing errors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, ToSchema)]
pub enum ErrorCode {
    // Validation errors (3xxx)
    #[serde(rename = "VAL_3001")]
    InvalidInput,
    #[serde(rename = "VAL_3003")]
    InvalidFormat,
    #[serde(rename = "VAL_3005")]
    InvalidAmount,
    #[serde(rename = "VAL_3009")]
    InvalidPrice,

    // Resource errors (4xxx)
    #[serde(rename = "RES_4001")]
    NotFound,

    // Grid topology errors (5xxx)
    #[serde(rename = "GRID_5101")]
    ZoneNotConfigured,
    #[serde(rename = "GRID_5102")]
    InvalidZoneRate,

    // External Service (8xxx)
    #[serde(rename = "EXT_8001")]
    ExternalServiceUnavailable,
    #[serde(rename = "EXT_8002")]
    ExternalServiceTimeout,
}

impl ErrorCode {
    /// Get numeric code
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::InvalidInput => 3001,
            ErrorCode::InvalidFormat => 3003,
            ErrorCode::InvalidAmount => 3005,
            ErrorCode::InvalidPrice => 3009,

            ErrorCode::NotFound => 4001,

            ErrorCode::ZoneNotConfigured => 5101,
            ErrorCode::InvalidZoneRate => 5102,

            ErrorCode::ExternalServiceUnavailable => 8001,
            ErrorCode::ExternalServiceTimeout => 8002,
        }
    }

    /// Get user-friendly message
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input provided",
            ErrorCode::InvalidFormat => "Invalid format provided",
            ErrorCode::InvalidAmount => "Enter a valid amount",
            ErrorCode::InvalidPrice => "Enter a valid price",

            ErrorCode::NotFound => "The requested resource was not found",

            ErrorCode::ZoneNotConfigured => "The selected grid zone is not configured",
            ErrorCode::InvalidZoneRate => "Zone rate configuration is invalid",

            ErrorCode::ExternalServiceUnavailable => {
                "Pricing configuration is temporarily unavailable. Please retry"
            }
            ErrorCode::ExternalServiceTimeout => {
                "Pricing configuration request timed out. Please retry"
            }
        }
    }

    /// Whether the failure is transient from the client's point of view
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::ExternalServiceUnavailable | ErrorCode::ExternalServiceTimeout
        )
    }
}

/// Structured error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub request_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub code_number: u16,
    pub message: String,
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{1}")]
    WithCode(ErrorCode, String),

    #[error("{1}")]
    WithCodeAndDetails(ErrorCode, String, String),

    #[error("Validation failed: {field}")]
    ValidationWithField {
        code: ErrorCode,
        field: String,
        message: String,
    },
}

impl ApiError {
    /// Create error with specific error code
    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError::WithCode(code, message.into())
    }

    /// Create error with code and additional details
    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        ApiError::WithCodeAndDetails(code, message.into(), details.into())
    }

    /// Helper: non-positive energy amount
    pub fn invalid_amount(field: &str) -> Self {
        ApiError::ValidationWithField {
            code: ErrorCode::InvalidAmount,
            field: field.to_string(),
            message: ErrorCode::InvalidAmount.message().to_string(),
        }
    }

    /// Get error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::Validation(_) => ErrorCode::InvalidInput,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::WithCode(code, _) => *code,
            ApiError::WithCodeAndDetails(code, _, _) => *code,
            ApiError::ValidationWithField { code, .. } => *code,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.error_code().is_retryable()
    }

    /// Get error details
    fn error_details(&self) -> Option<String> {
        match self {
            ApiError::WithCodeAndDetails(_, _, details) => Some(details.clone()),
            ApiError::Validation(msg) | ApiError::NotFound(msg) => Some(msg.clone()),
            _ => None,
        }
    }

    /// Get field name for validation errors
    fn error_field(&self) -> Option<String> {
        match self {
            ApiError::ValidationWithField { field, .. } => Some(field.clone()),
            _ => None,
        }
    }

    /// Get status code
    pub fn status_code(&self) -> StatusCode {
        match self.error_code() {
            ErrorCode::InvalidAmount => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InvalidInput
            | ErrorCode::InvalidFormat
            | ErrorCode::InvalidPrice
            | ErrorCode::ZoneNotConfigured => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            // Upstream served a rate table we cannot use
            ErrorCode::InvalidZoneRate => StatusCode::BAD_GATEWAY,
            ErrorCode::ExternalServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::ExternalServiceTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Log error with appropriate level
    fn log_error(&self, request_id: &str) {
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    request_id = %request_id,
                    error = %self,
                    "Server error occurred"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    request_id = %request_id,
                    error = %self,
                    "Client error occurred"
                );
            }
            _ => {}
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let status = self.status_code();
        let code = self.error_code();
        let retryable = self.is_retryable();

        self.log_error(&request_id);

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code,
                code_number: code.code(),
                message: match &self {
                    ApiError::WithCode(_, msg) | ApiError::WithCodeAndDetails(_, msg, _) => {
                        msg.clone()
                    }
                    ApiError::ValidationWithField { message, .. } => message.clone(),
                    _ => code.message().to_string(),
                },
                details: self.error_details(),
                field: self.error_field(),
                retryable,
                retry_after: retryable.then_some(RETRY_AFTER_SECS),
            },
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let mut response = (status, Json(error_response)).into_response();
        if retryable {
            response
                .headers_mut()
                .insert("Retry-After", HeaderValue::from(RETRY_AFTER_SECS));
        }

        response
    }
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::UnknownZone(_) => {
                ApiError::with_code(ErrorCode::ZoneNotConfigured, err.to_string())
            }
            PricingError::InvalidPrice(_) => ApiError::ValidationWithField {
                code: ErrorCode::InvalidPrice,
                field: "agreed_price".to_string(),
                message: err.to_string(),
            },
            PricingError::InvalidZoneRate { .. } => ApiError::with_details(
                ErrorCode::InvalidZoneRate,
                ErrorCode::InvalidZoneRate.message(),
                err.to_string(),
            ),
            PricingError::SourceUnavailable(_) => {
                ApiError::with_code(ErrorCode::ExternalServiceUnavailable, err.to_string())
            }
            PricingError::SourceTimeout(_) => {
                ApiError::with_code(ErrorCode::ExternalServiceTimeout, err.to_string())
            }
            PricingError::Overflow(_) => ApiError::with_details(
                ErrorCode::InvalidAmount,
                ErrorCode::InvalidAmount.message(),
                err.to_string(),
            ),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        match fields.first() {
            Some((field, errs)) => {
                let field = field.to_string();
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                let code = if field == "agreed_price" {
                    ErrorCode::InvalidPrice
                } else {
                    ErrorCode::InvalidInput
                };
                ApiError::ValidationWithField {
                    code,
                    field,
                    message,
                }
            }
            None => ApiError::Validation(errors.to_string()),
        }
    }
}

/// Handle Axum JSON rejections and convert to structured API errors
impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        match err {
            JsonRejection::JsonDataError(e) => ApiError::with_details(
                ErrorCode::InvalidInput,
                "Invalid input provided",
                e.body_text(),
            ),
            JsonRejection::JsonSyntaxError(_) => {
                ApiError::with_code(ErrorCode::InvalidFormat, "Invalid JSON format")
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::with_code(ErrorCode::InvalidFormat, "JSON content type required")
            }
            _ => ApiError::with_details(
                ErrorCode::InvalidInput,
                "Invalid request body format",
                err.body_text(),
            ),
        }
    }
}
