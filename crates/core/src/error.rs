//! Check run error types.
//!
//! Every public operation in this crate returns `Result<T, CheckRunError>`.
//! Failures fall into three kinds the caller can act on: validation
//! (user-correctable), not-found, and unexpected (system-level).

use std::collections::BTreeMap;

use checkrun_shared::AppError;
use thiserror::Error;

/// Field-level validation messages, keyed by request field name.
pub type ValidationErrors = BTreeMap<String, Vec<String>>;

/// The three failure kinds exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Field-level, user-correctable.
    Validation,
    /// The addressed run does not exist.
    NotFound,
    /// System-level, not user-correctable.
    Unexpected,
}

/// Errors that can occur during check run operations.
#[derive(Debug, Error)]
pub enum CheckRunError {
    /// One or more request fields failed validation.
    #[error("Validation failed: {}", summarize(.errors))]
    Validation {
        /// Messages per offending field.
        errors: ValidationErrors,
    },

    /// A workflow run (or the active run for a year) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A fresh run was requested while another run is active for the year.
    #[error("An active check run already exists for profit year {profit_year}")]
    RunAlreadyActive {
        /// The profit year that already has an active run.
        profit_year: i32,
    },

    /// The caller sent a printer type outside the published set.
    #[error("PrinterType '{0}' is not supported")]
    UnsupportedPrinterType(String),

    /// System-level failure (e.g. check number allocation came up short).
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    /// Persistence failure.
    #[error("Database error: {0}")]
    Database(String),

    /// The caller cancelled the operation.
    #[error("Operation was cancelled")]
    Cancelled,
}

fn summarize(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl CheckRunError {
    /// Builds a validation failure for a single field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        Self::Validation { errors }
    }

    /// Returns the failure kind for this error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Validation { .. } | Self::RunAlreadyActive { .. } => FailureKind::Validation,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::UnsupportedPrinterType(_)
            | Self::Unexpected(_)
            | Self::Database(_)
            | Self::Cancelled => FailureKind::Unexpected,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound(_) => 404,
            Self::RunAlreadyActive { .. } => 409,
            Self::Cancelled => 499,
            Self::UnsupportedPrinterType(_) | Self::Unexpected(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::RunAlreadyActive { .. } => "RUN_ALREADY_ACTIVE",
            Self::UnsupportedPrinterType(_) => "UNSUPPORTED_PRINTER_TYPE",
            Self::Unexpected(_) => "UNEXPECTED_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns the messages recorded for `field`, if this is a validation failure.
    #[must_use]
    pub fn field_errors(&self, field: &str) -> Option<&[String]> {
        match self {
            Self::Validation { errors } => errors.get(field).map(Vec::as_slice),
            _ => None,
        }
    }
}

impl From<CheckRunError> for AppError {
    fn from(err: CheckRunError) -> Self {
        match err {
            CheckRunError::Validation { .. } => Self::Validation(err.to_string()),
            CheckRunError::NotFound(message) => Self::NotFound(message),
            CheckRunError::RunAlreadyActive { .. } => Self::Conflict(err.to_string()),
            CheckRunError::Database(message) => Self::Database(message),
            CheckRunError::UnsupportedPrinterType(_)
            | CheckRunError::Unexpected(_)
            | CheckRunError::Cancelled => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = CheckRunError::validation("DistributionIds", "must not be empty");
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(
            err.field_errors("DistributionIds"),
            Some(&["must not be empty".to_string()][..])
        );
        assert!(err.to_string().contains("DistributionIds: must not be empty"));
    }

    #[test]
    fn test_run_already_active_error() {
        let err = CheckRunError::RunAlreadyActive { profit_year: 2025 };
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "RUN_ALREADY_ACTIVE");
        assert!(err.to_string().contains("2025"));
    }

    #[test]
    fn test_not_found_error() {
        let err = CheckRunError::NotFound("Check run workflow x not found".into());
        assert_eq!(err.kind(), FailureKind::NotFound);
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.field_errors("anything"), None);
    }

    #[test]
    fn test_unsupported_printer_type_is_unexpected() {
        let err = CheckRunError::UnsupportedPrinterType("Laser".into());
        assert_eq!(err.kind(), FailureKind::Unexpected);
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "UNSUPPORTED_PRINTER_TYPE");
    }

    #[test]
    fn test_database_and_cancelled_are_unexpected() {
        assert_eq!(
            CheckRunError::Database("boom".into()).kind(),
            FailureKind::Unexpected
        );
        assert_eq!(CheckRunError::Cancelled.kind(), FailureKind::Unexpected);
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = CheckRunError::RunAlreadyActive { profit_year: 2024 }.into();
        assert_eq!(app.status_code(), 409);

        let app: AppError = CheckRunError::validation("IsReprint", "nope").into();
        assert_eq!(app.error_code(), "VALIDATION_ERROR");

        let app: AppError = CheckRunError::NotFound("gone".into()).into();
        assert_eq!(app.to_string(), "Not found: gone");
    }
}
