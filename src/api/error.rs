//! Mapping from application errors to HTTP responses.
//!
//! Every error body has the shape `{"error": "<message>"}`.
//!
//! | Error | Status |
//! |-------|--------|
//! | Validation, malformed JSON | 400 |
//! | InvalidCredentials | 400 |
//! | Unauthorized (token) | 401 |
//! | AccountNotFound | 404 |
//! | EmailInUse, InsufficientBalance, DailyLimitExceeded, BalanceCeilingExceeded | 400 |
//! | anything else | 500, logged, generic message |

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::AppError;
use crate::domain::ValidationError;

/// Message sent for every unexpected failure; details stay in the logs.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An error body together with its status code.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Status code for an application error.
pub fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation(_)
        | AppError::InvalidCredentials
        | AppError::EmailInUse(_)
        | AppError::InsufficientBalance { .. }
        | AppError::DailyLimitExceeded { .. }
        | AppError::BalanceCeilingExceeded { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::AccountNotFound(_) => StatusCode::NOT_FOUND,
        AppError::AccountNumberExhausted(_) | AppError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<AppError> for ApiErrorResponse {
    fn from(error: AppError) -> Self {
        let status = status_for(&error);
        if status.is_server_error() {
            tracing::error!(error = ?error, "request failed");
            return Self::new(status, SERVER_ERROR_MESSAGE);
        }
        tracing::debug!(%error, status = status.as_u16(), "request rejected");
        Self::new(status, error.to_string())
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        AppError::from(error).into()
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        ValidationError::MalformedBody(rejection.body_text()).into()
    }
}
