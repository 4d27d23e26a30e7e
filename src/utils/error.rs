use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::utils::response::error as error_response;

/// Errors surfaced by the record store, tagged so callers can branch on the
/// variant instead of sniffing message text.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for a unique field")]
    Duplicate,

    #[error("row not found")]
    NotFound,

    #[error("record store error: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                StoreError::Duplicate
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Duplicate resource: {0}")]
    Duplicate(String),

    #[error("Mailing list error: {0}")]
    MailingList(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Email send failed: {0}")]
    EmailSend(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AppError::Duplicate("Resource already exists".to_string()),
            StoreError::NotFound => AppError::NotFound("Resource".to_string()),
            StoreError::Unavailable(msg) => AppError::Database(msg),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::MailingList(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::EmailSend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Duplicate(_) => "DUPLICATE_RESOURCE",
            AppError::MailingList(_) => "MAILCHIMP_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::EmailSend(_) => "EMAIL_SEND_FAILED",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::Validation(errors) => {
                warn!(?errors, "Request failed validation");
            }
            AppError::NotFound(what) => {
                warn!(%what, "Resource not found");
            }
            AppError::Duplicate(msg) => {
                warn!(message = %msg, "Duplicate resource");
            }
            AppError::MailingList(msg)
            | AppError::Database(msg)
            | AppError::EmailSend(msg)
            | AppError::Internal(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level messages to the client; raw upstream and
        // database error text stays in the logs.
        let (public_message, details) = match &self {
            AppError::Validation(errors) => {
                ("Validation failed".to_string(), Some(json!(errors)))
            }
            AppError::NotFound(what) => (format!("{what} not found"), None),
            AppError::Duplicate(msg) => (msg.clone(), None),
            AppError::MailingList(_) => (
                "Failed to subscribe to newsletter. Please try again later.".to_string(),
                None,
            ),
            AppError::Database(_) => ("A database error occurred".to_string(), None),
            AppError::EmailSend(_) => (
                "Failed to send notification email. Please try again later.".to_string(),
                None,
            ),
            AppError::Internal(_) => ("Internal server error".to_string(), None),
        };

        error_response(code, public_message, details, status)
    }
}
