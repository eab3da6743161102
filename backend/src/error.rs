//! Error handling for the BPIMS stock ledger
//!
//! Every failure is rendered as the common response envelope with
//! `success: false`, so clients only ever parse one shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::ApiResponse;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Field-level validation failure
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Contents of the envelope's `errors` member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, error_detail) = match &self {
            AppError::Validation { field, message } => (
                message.clone(),
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                msg.clone(),
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                format!("{} not found", resource),
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                "A database error occurred".to_string(),
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                msg.clone(),
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                "An internal server error occurred".to_string(),
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    field: None,
                },
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request failed: {}", self);
        }

        (status, Json(ApiResponse::failure(message, error_detail))).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        // Report the first failing field the way single-field checks do
        match err.field_errors().into_iter().next() {
            Some((field, errors)) => {
                let message = errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                AppError::validation(field, message)
            }
            None => AppError::ValidationError(err.to_string()),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
