//! Authentication handlers: login, registration, logout.
//!
//! Every state-changing route is a POST guarded by the session's CSRF
//! token; a bad token is a hard 403, not a form error. Failed credentials
//! re-render the login form with status 200 and a message that never says
//! which part was wrong. Registration failures re-render with per-field
//! errors, keeping everything the visitor typed except the passwords.

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use serde::Deserialize;

use crate::auth::{validate_registration, FieldErrors, Session};
use crate::db::{NewUser, UserRepository};
use crate::template::{TemplateContext, Value};
use crate::web::error::WebError;
use crate::CarlotError;

use super::AppState;

/// Login form fields. Missing fields deserialize as empty strings so a
/// hand-crafted submission cannot bypass validation with a 422.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form fields.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

/// GET /login - show the login form.
///
/// An already-authenticated visitor is sent straight to the listing.
pub async fn show_login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, WebError> {
    if session.current().is_some() {
        return Ok(Redirect::to("/cars").into_response());
    }

    let mut context = TemplateContext::new();
    context.set("csrf_token", Value::from(state.tokens.issue(&session)));
    context.set("old_email", Value::from(""));

    Ok(state
        .render_page(&session, "auth/login", "Log in", context)?
        .into_response())
}

/// POST /login - verify credentials and establish the session.
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    if !state.tokens.validate(&session, &form.csrf_token) {
        return Err(CarlotError::TokenInvalid.into());
    }

    let repo = UserRepository::new(state.db.pool());
    match repo.authenticate(&form.email, &form.password).await {
        Ok(user) => {
            session.establish(&user);
            tracing::info!(user_id = user.id, "Login succeeded");
            Ok(Redirect::to("/cars").into_response())
        }
        Err(CarlotError::AuthenticationFailed) => {
            tracing::info!("Login failed");

            let mut context = TemplateContext::new();
            context.set(
                "error_message",
                Value::from(CarlotError::AuthenticationFailed.to_string()),
            );
            context.set("old_email", Value::from(form.email));
            context.set("csrf_token", Value::from(state.tokens.issue(&session)));

            Ok(state
                .render_page(&session, "auth/login", "Log in", context)?
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /register - show the registration form.
pub async fn show_register(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, WebError> {
    if session.current().is_some() {
        return Ok(Redirect::to("/cars").into_response());
    }

    let context = register_context(&state, &session, "", "", &FieldErrors::new());
    Ok(state
        .render_page(&session, "auth/register", "Register", context)?
        .into_response())
}

/// POST /register - create the account and log the new user in.
pub async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, WebError> {
    if !state.tokens.validate(&session, &form.csrf_token) {
        return Err(CarlotError::TokenInvalid.into());
    }

    let mut errors =
        validate_registration(&form.username, &form.email, &form.password, &form.password_confirm);
    let mut general_error = None;

    if errors.is_empty() {
        let repo = UserRepository::new(state.db.pool());

        // Advisory pre-check; the storage constraint still decides races
        let outcome = match repo.email_exists(&form.email).await {
            Ok(true) => Err(CarlotError::DuplicateEmail),
            Ok(false) => {
                let new_user = NewUser::new(&form.username, &form.email, &form.password);
                repo.create(&new_user).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(user) => {
                session.establish(&user);
                tracing::info!(user_id = user.id, "Registration succeeded");
                return Ok(Redirect::to("/cars").into_response());
            }
            // Uniqueness losses come back as field errors, not error pages
            Err(CarlotError::DuplicateEmail) => {
                errors
                    .entry("email")
                    .or_default()
                    .push(CarlotError::DuplicateEmail.to_string());
            }
            Err(CarlotError::Validation(message)) => {
                errors.entry("username").or_default().push(message);
            }
            // Infrastructure failure: general banner, detail goes to the log
            Err(e) => {
                tracing::error!(error = %e, "Registration failed");
                general_error = Some("something went wrong on our side".to_string());
            }
        }
    }

    tracing::debug!(fields = errors.len(), "Registration rejected");

    let mut context = register_context(&state, &session, &form.username, &form.email, &errors);
    if let Some(message) = general_error {
        context.set("error_message", Value::from(message));
    }
    Ok(state
        .render_page(&session, "auth/register", "Register", context)?
        .into_response())
}

/// POST /logout - destroy the session.
pub async fn logout(Extension(session): Extension<Session>) -> Redirect {
    session.clear();
    Redirect::to("/login")
}

/// GET /logout - redirect without touching the session.
///
/// Logout mutates state, so it only happens on POST; a GET (link
/// prefetch, crawler) must leave the visitor logged in.
pub async fn logout_get() -> Redirect {
    Redirect::to("/login")
}

/// Build the registration view context: a fresh token, the non-secret
/// values the visitor already typed, and one error list per field.
fn register_context(
    state: &AppState,
    session: &Session,
    username: &str,
    email: &str,
    errors: &FieldErrors,
) -> TemplateContext {
    let mut context = TemplateContext::new();
    context.set("csrf_token", Value::from(state.tokens.issue(session)));
    context.set("old_username", Value::from(username));
    context.set("old_email", Value::from(email));

    for field in ["username", "email", "password", "password_confirm"] {
        let messages: Vec<Value> = errors
            .get(field)
            .map(|list| list.iter().map(|m| Value::from(m.as_str())).collect())
            .unwrap_or_default();
        context.set(format!("{field}_errors"), Value::List(messages));
    }

    context
}
