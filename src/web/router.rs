//! Router configuration for the CARLOT web UI.

use axum::routing::get;
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{index, login, logout, logout_get, register, show_login, show_register};
use super::handlers::AppState;
use super::session::session_layer;

/// Create the main page router.
pub fn create_router(state: AppState) -> Router {
    let session_state = state.clone();

    Router::new()
        .route("/", get(index))
        .route("/cars", get(index))
        .route("/login", get(show_login).post(login))
        .route("/register", get(show_register).post(register))
        .route("/logout", get(logout_get).post(logout))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(session_state, session_layer)),
        )
        .with_state(state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
        // Should not panic
    }
}
