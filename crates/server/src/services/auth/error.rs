//! Authentication error types.

use thiserror::Error;

use iqra_core::Role;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] iqra_core::EmailError),

    /// Wrong password, unknown or inactive account, or role mismatch.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Missing or malformed profile field.
    #[error("{0}")]
    InvalidField(String),

    /// Role that cannot be chosen through public signup.
    #[error("cannot sign up as {0}")]
    RoleNotAllowed(Role),

    /// Account referenced by the session no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
