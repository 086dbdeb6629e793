//! Input validation for CARLOT registration forms.
//!
//! Each validator reports the first rule its field violates; the form-level
//! helper collects one error list per field so the controller can re-render
//! field-level messages the way the registration view expects them.

use std::collections::HashMap;

use thiserror::Error;

use super::password::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username is missing.
    #[error("username is required")]
    UsernameRequired,

    /// Username is too short.
    #[error("username must be at least {MIN_USERNAME_LENGTH} characters")]
    UsernameTooShort,

    /// Username is too long.
    #[error("username must be at most {MAX_USERNAME_LENGTH} characters")]
    UsernameTooLong,

    /// Email is missing.
    #[error("email is required")]
    EmailRequired,

    /// Email is too long.
    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    /// Email format is invalid.
    #[error("invalid email format")]
    EmailInvalidFormat,

    /// Password is missing.
    #[error("password is required")]
    PasswordRequired,

    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    PasswordTooLong,

    /// Password confirmation is missing.
    #[error("password confirmation is required")]
    PasswordConfirmRequired,

    /// Password confirmation does not match.
    #[error("passwords do not match")]
    PasswordConfirmMismatch,
}

/// Per-field validation error lists, keyed by form field name.
pub type FieldErrors = HashMap<&'static str, Vec<String>>;

/// Validate a username.
///
/// Requirements: required, length 3-50 characters.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort);
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }
    Ok(())
}

/// Validate an email address.
///
/// Requirements: required, basic structural format (single `@`, dotted
/// domain, no whitespace). This is intentionally simple; full RFC email
/// validation is not attempted.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let (local, domain) = (parts[0], parts[1]);
    if local.is_empty() {
        return Err(ValidationError::EmailInvalidFormat);
    }
    if !domain.contains('.') {
        return Err(ValidationError::EmailInvalidFormat);
    }
    if domain.split('.').any(|p| p.is_empty()) {
        return Err(ValidationError::EmailInvalidFormat);
    }
    if email.chars().any(|c| c.is_whitespace()) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validate a registration password.
///
/// Requirements: required, length 9-128 characters.
pub fn validate_registration_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong);
    }
    Ok(())
}

/// Validate the password confirmation field.
pub fn validate_password_confirm(
    password: &str,
    password_confirm: &str,
) -> Result<(), ValidationError> {
    if password_confirm.is_empty() {
        return Err(ValidationError::PasswordConfirmRequired);
    }
    if password != password_confirm {
        return Err(ValidationError::PasswordConfirmMismatch);
    }
    Ok(())
}

/// Validate all registration fields, collecting one error list per field.
///
/// An empty map means the submission passed every rule.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    password_confirm: &str,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Err(e) = validate_username(username) {
        errors.entry("username").or_default().push(e.to_string());
    }
    if let Err(e) = validate_email(email) {
        errors.entry("email").or_default().push(e.to_string());
    }
    if let Err(e) = validate_registration_password(password) {
        errors.entry("password").or_default().push(e.to_string());
    }
    if let Err(e) = validate_password_confirm(password, password_confirm) {
        errors
            .entry("password_confirm")
            .or_default()
            .push(e.to_string());
    }

    errors
}
