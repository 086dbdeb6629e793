//! Page handlers for the CARLOT web UI.

pub mod auth;
pub mod home;

use std::sync::Arc;

use axum::response::Html;

use crate::auth::{Session, SessionStore, TokenManager};
use crate::db::Database;
use crate::template::{TemplateContext, TemplateEngine, Value};
use crate::CarlotError;

use super::error::WebError;

pub use auth::{login, logout, logout_get, register, show_login, show_register};
pub use home::index;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Arc<Database>,
    /// Server-side session store.
    pub sessions: Arc<SessionStore>,
    /// Template engine.
    pub engine: Arc<TemplateEngine>,
    /// CSRF token manager.
    pub tokens: TokenManager,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Arc<Database>, engine: TemplateEngine) -> Self {
        Self {
            db,
            sessions: Arc::new(SessionStore::new()),
            engine: Arc::new(engine),
            tokens: TokenManager::new(),
        }
    }

    /// Render a view inside the layout.
    ///
    /// Adds the identity keys the layout's navigation expects
    /// (`logged_in`, `username`) and the page `title`, renders the view,
    /// then wraps it as the layout's raw `content` slot.
    pub(crate) fn render_page(
        &self,
        session: &Session,
        view: &str,
        title: &str,
        mut context: TemplateContext,
    ) -> Result<Html<String>, WebError> {
        match session.current() {
            Some(identity) => {
                context.set("logged_in", Value::Bool(true));
                context.set("username", Value::from(identity.username));
            }
            None => context.set("logged_in", Value::Bool(false)),
        }
        context.set("title", Value::from(title));

        let content = self
            .engine
            .render(view, &context)
            .map_err(CarlotError::from)?;
        context.set("content", Value::from(content));

        let page = self
            .engine
            .render("layout", &context)
            .map_err(CarlotError::from)?;
        Ok(Html(page))
    }
}
