//! Authentication module for CARLOT.
//!
//! This module provides password hashing, field validation, CSRF token
//! management, and the session trust context.

pub mod password;
mod session;
mod token;
pub mod validation;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use session::{Session, SessionIdentity, SessionStore};
pub use token::{TokenManager, TOKEN_BYTES};
pub use validation::{validate_registration, FieldErrors, ValidationError};
