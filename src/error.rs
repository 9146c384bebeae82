//! Error handling for the application

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::pricing::PricingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Payment of {amount} exceeds balance due of {balance_due}")]
    PaymentExceedsBalance { amount: Decimal, balance_due: Decimal },

    #[error("Booking conflict: {0}")]
    BookingConflict(String),

    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Short machine-readable category for API clients
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "not_found",
            AppError::Validation { .. } => "validation",
            AppError::PaymentExceedsBalance { .. } => "payment_exceeds_balance",
            AppError::BookingConflict(_) => "booking_conflict",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::Forbidden(_) => "forbidden",
            AppError::Configuration(_) | AppError::Pricing(_) => "configuration",
            AppError::Database(_) | AppError::Internal(_) => "internal",
        }
    }

    /// Errors that should never reach end users verbatim.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            AppError::Configuration(_)
                | AppError::Pricing(_)
                | AppError::Database(_)
                | AppError::Internal(_)
        )
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        AppError::validation("body", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation("path", rejection.body_text())
    }
}

/// Error body returned by every API endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::PaymentExceedsBalance { .. }
            | AppError::BookingConflict(_)
            | AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Configuration(_)
            | AppError::Pricing(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if self.is_server_fault() {
            tracing::error!(error = %self, "request failed");
            "Something went wrong. The error has been logged.".to_string()
        } else {
            self.to_string()
        };

        let field = match &self {
            AppError::Validation { field, .. } => Some(*field),
            _ => None,
        };

        let body = ErrorResponse {
            error_type: self.error_type(),
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
