//! CARLOT - a small garage listing site with user accounts.
//!
//! Server-rendered HTML over axum: a public car listing plus login,
//! registration and logout backed by Argon2 password hashing, server-side
//! sessions and one-time CSRF tokens.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod template;
pub mod web;

pub use auth::{
    hash_password, validate_password, validate_registration, verify_password, FieldErrors,
    PasswordError, Session, SessionIdentity, SessionStore, TokenManager, ValidationError,
    MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, TOKEN_BYTES,
};
pub use config::Config;
pub use db::{Car, CarRepository, Database, NewCar, NewUser, Role, User, UserRepository};
pub use error::{CarlotError, Result};
pub use web::{AppState, WebServer};
