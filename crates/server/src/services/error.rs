//! Errors shared by the domain services.

use thiserror::Error;

use iqra_core::{DayError, EmailError, PeriodError};

use crate::db::RepositoryError;

/// Errors from roster, schedule, attendance, registration and admin services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation; the message is safe to show to clients.
    #[error("{0}")]
    Validation(String),

    /// The record does not exist or belongs to someone else.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness rule was violated.
    #[error("{0}")]
    Duplicate(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Shorthand for a validation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<EmailError> for ServiceError {
    fn from(err: EmailError) -> Self {
        Self::Validation(format!("Invalid email: {err}"))
    }
}

impl From<DayError> for ServiceError {
    fn from(err: DayError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PeriodError> for ServiceError {
    fn from(err: PeriodError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Map `NotFound` from the repository to a named `ServiceError::NotFound`.
pub(crate) fn not_found_as(entity: &'static str) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |err| match err {
        RepositoryError::NotFound => ServiceError::NotFound(entity),
        other => ServiceError::Repository(other),
    }
}

/// Check that `value` lies in `min..=max`.
pub(crate) fn check_range(field: &str, value: i32, min: i32, max: i32) -> Result<(), ServiceError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!(
            "{field} must be between {min} and {max}"
        )))
    }
}

/// Trim and require a non-empty value.
pub(crate) fn required(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional value, dropping it when blank.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range_inclusive() {
        assert!(check_range("age", 5, 5, 100).is_ok());
        assert!(check_range("age", 100, 5, 100).is_ok());
        let err = check_range("age", 4, 5, 100).unwrap_err();
        assert_eq!(err.to_string(), "age must be between 5 and 100");
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("name", "  Bilal ").ok().as_deref(), Some("Bilal"));
        assert!(required("name", "   ").is_err());
        assert_eq!(optional(Some(" ".to_owned())), None);
    }
}
