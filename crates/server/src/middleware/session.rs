//! Session middleware configuration.
//!
//! Sessions live in `PostgreSQL` in production and in process memory for the
//! in-memory backend. The layer itself only sets cookie attributes; the
//! absolute lifetime of a login is set per session by
//! [`super::auth::sign_in`].

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore, cookie::SameSite};

use crate::config::AcademyConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "iqra_session";

/// Create the session layer over `store`.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &AcademyConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(config.secure_cookies())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
