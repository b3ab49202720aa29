//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (recorded on the span, echoed on the response)
//! 4. CORS (only when an SPA origin is configured)
//! 5. Error detail (development only)
//! 6. Session layer (tower-sessions)

pub mod auth;
pub mod error_detail;
pub mod request_id;
pub mod session;

pub use auth::{
    Authorized, Capability, ManageAccounts, ManageRoster, OptionalPrincipal, RequireUser,
    ViewAdminOverview, sign_in, sign_out,
};
pub use error_detail::expose_error_detail;
pub use request_id::request_id_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
