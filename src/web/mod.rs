//! Web module for CARLOT.
//!
//! Serves the HTML pages: the car listing, the login and registration
//! forms, and logout. Sessions ride a cookie handled by the
//! [`session_layer`] middleware; handlers receive a
//! [`Session`](crate::auth::Session) extension.

mod error;
pub mod handlers;
mod router;
mod server;
mod session;

pub use error::WebError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
pub use session::{session_layer, SESSION_COOKIE};
