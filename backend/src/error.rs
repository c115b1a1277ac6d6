use crate::database::DatabaseError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::Error as SqlxError;
use std::fmt;
use thiserror::Error;
use tracing::error;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field a submission or update was rejected for, in check order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single-field failure
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.field.as_str())
    }

    /// True if any error was recorded for `field` or one of its sub-fields
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| {
            e.field == field
                || e.field
                    .strip_prefix(field)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or incomplete submission/update; nothing was written
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Unknown id, registration number or slip id
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Missing or expired admin credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Persistence unavailable or constraint violated; safe to retry
    #[error("Storage error: {0}")]
    Storage(RepositoryError),

    /// Database pool and migration errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Single-field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(ValidationErrors::single(field, message))
    }

    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Check if error is an authorization failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized(_))
    }

    /// Storage failures leave nothing partial behind, so callers may resubmit
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Storage(_)
                | AppError::Database(DatabaseError::ConnectionTimeout)
                | AppError::Database(DatabaseError::QueryError(_))
        )
    }

    /// Field-level details for validation failures
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Unauthorized(_) => 401,
            AppError::Validation(_) => 400,
            AppError::Storage(_) => 503,
            AppError::Database(_) => 503,
            _ => 500,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self {
            AppError::Validation(errors) => serde_json::json!({
                "success": false,
                "error": self.to_string(),
                "fields": errors,
            }),
            AppError::Storage(_) | AppError::Database(_) => {
                error!("Storage error: {:?}", self);
                serde_json::json!({
                    "success": false,
                    "error": "Storage temporarily unavailable, please retry",
                })
            }
            AppError::NotFound(_) | AppError::Unauthorized(_) => serde_json::json!({
                "success": false,
                "error": self.to_string(),
            }),
            _ => {
                error!("Internal error: {:?}", self);
                serde_json::json!({
                    "success": false,
                    "error": "Internal server error",
                })
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Value does not fit its column; retrying cannot help
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Store cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be mapped back into a model
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::OutOfRange(msg) => AppError::invalid("value", msg),
            other => AppError::Storage(other),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
                RepositoryError::Unavailable(err.to_string())
            }
            SqlxError::Database(db_err) => {
                // Check for common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                match code.as_deref() {
                    // Unique violation
                    Some("23505") => RepositoryError::Duplicate(db_err.message().to_string()),
                    // Foreign key and check constraint violations
                    Some("23503") | Some("23514") => {
                        RepositoryError::ConstraintViolation(db_err.message().to_string())
                    }
                    // String data right truncation, numeric value out of range
                    Some("22001") | Some("22003") => {
                        RepositoryError::OutOfRange(db_err.message().to_string())
                    }
                    _ => RepositoryError::Query(err),
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}

impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        RepositoryError::from(err).into()
    }
}

/// Convenience function to convert Option<T> to Result<T, AppError>
pub fn option_to_result<T>(opt: Option<T>, error_msg: &str) -> AppResult<T> {
    opt.ok_or_else(|| AppError::NotFound(error_msg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collects_fields_in_order() {
        let mut errors = ValidationErrors::new();
        errors.push("email", "is required");
        errors.push("teamMembers.Cricket", "needs 10 members");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email", "teamMembers.Cricket"]);
        assert!(errors.contains("teamMembers"));
        assert!(!errors.contains("team"));
        assert_eq!(
            errors.to_string(),
            "email: is required; teamMembers.Cricket: needs 10 members"
        );
    }

    #[test]
    fn test_empty_validation_errors_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::invalid("status", "bad").status_code(), 400);
        assert_eq!(AppError::NotFound("x".into()).status_code(), 404);
        assert_eq!(AppError::Unauthorized("x".into()).status_code(), 401);
        let storage: AppError = RepositoryError::Unavailable("down".into()).into();
        assert_eq!(storage.status_code(), 503);
        assert!(storage.is_retryable());
    }

    #[test]
    fn test_out_of_range_is_a_validation_error() {
        let err: AppError =
            RepositoryError::OutOfRange("value too long for type character varying(50)".into())
                .into();
        assert_eq!(err.status_code(), 400);
        assert!(!err.is_retryable());
        assert!(err.validation_errors().unwrap().contains("value"));
    }

    #[test]
    fn test_repository_not_found_maps_to_not_found() {
        let err: AppError = RepositoryError::NotFound("Registration not found".into()).into();
        assert!(err.is_not_found());
    }
}
