//! Error types for CARLOT.

use thiserror::Error;

/// Common error type for CARLOT.
#[derive(Error, Debug)]
pub enum CarlotError {
    /// Database error.
    ///
    /// This is a generic database error that wraps errors from the storage
    /// backend. Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication failed.
    ///
    /// Deliberately generic: the message never distinguishes an unknown
    /// email from a wrong password.
    #[error("incorrect email or password")]
    AuthenticationFailed,

    /// The email address is already registered.
    #[error("email address is already registered")]
    DuplicateEmail,

    /// Security token (CSRF) missing or mismatched.
    #[error("invalid security token")]
    TokenInvalid,

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] crate::template::TemplateError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for CarlotError {
    fn from(e: sqlx::Error) -> Self {
        CarlotError::Database(e.to_string())
    }
}

/// Result type alias for CARLOT operations.
pub type Result<T> = std::result::Result<T, CarlotError>;
