//! Error responses for the CARLOT web UI.
//!
//! Handlers return [`WebError`] for everything they do not turn into a
//! re-rendered form. The response is an HTML error page built from the
//! embedded error template; internal detail is logged, never rendered.

use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::template::{TemplateContext, TemplateEngine, Value};
use crate::CarlotError;

/// An error that renders as an HTML error page.
#[derive(Debug)]
pub struct WebError {
    status: StatusCode,
    message: String,
}

impl WebError {
    /// Create a web error with an explicit status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 403 response.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// 404 response.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Generic 500 response.
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "something went wrong on our side",
        )
    }

    /// The HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The user-facing message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<CarlotError> for WebError {
    fn from(err: CarlotError) -> Self {
        match &err {
            CarlotError::TokenInvalid => WebError::forbidden(err.to_string()),
            CarlotError::NotFound(_) => WebError::not_found(err.to_string()),
            CarlotError::AuthenticationFailed => {
                WebError::new(StatusCode::UNAUTHORIZED, err.to_string())
            }
            CarlotError::DuplicateEmail => WebError::new(StatusCode::CONFLICT, err.to_string()),
            CarlotError::Validation(_) => WebError::new(StatusCode::BAD_REQUEST, err.to_string()),
            _ => {
                tracing::error!(error = %err, "Internal error");
                WebError::internal()
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let mut context = TemplateContext::new();
        context.set(
            "status",
            Value::from(format!(
                "{} {}",
                self.status.as_u16(),
                self.status.canonical_reason().unwrap_or("Error")
            )),
        );
        context.set("message", Value::from(self.message.clone()));
        context.set("title", Value::from("Error"));

        match error_engine().and_then(|engine| {
            let content = engine.render("error", &context).ok()?;
            context.set("content", Value::from(content));
            engine.render("layout", &context).ok()
        }) {
            Some(page) => (self.status, Html(page)).into_response(),
            // Template failure: fall back to plain text rather than recurse
            None => (self.status, self.message).into_response(),
        }
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for WebError {}

/// Error pages always use the embedded templates, so a broken override
/// directory can never take the error page down with it.
fn error_engine() -> Option<&'static TemplateEngine> {
    static ENGINE: OnceLock<Option<TemplateEngine>> = OnceLock::new();
    ENGINE
        .get_or_init(|| TemplateEngine::with_defaults().ok())
        .as_ref()
}
