//! Session middleware for the CARLOT web UI.
//!
//! Every request gets a [`Session`] handle as a request extension. The
//! session id travels in a cookie; the data behind it stays server-side
//! in the [`SessionStore`](crate::auth::SessionStore). An unknown or
//! missing cookie gets a fresh anonymous session and a Set-Cookie on the
//! way out.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::handlers::AppState;
use crate::auth::Session;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "carlot_session";

/// Attach a [`Session`] to the request.
///
/// A cookie naming a session the store no longer knows (server restart,
/// logout) is treated the same as no cookie at all: the visitor starts
/// over as anonymous under a fresh id.
pub async fn session_layer(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let known_id = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|id| state.sessions.contains(id));

    let (session, is_new) = match known_id {
        Some(id) => (state.sessions.session(id), false),
        None => {
            let id = state.sessions.create();
            (state.sessions.session(id), true)
        }
    };

    let session_id = session.id().to_string();
    request.extensions_mut().insert(session);

    let response = next.run(request).await;

    if is_new {
        let cookie = Cookie::build((SESSION_COOKIE, session_id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        (jar.add(cookie), response).into_response()
    } else {
        response
    }
}
