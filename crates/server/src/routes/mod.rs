//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness
//! GET  /health/ready                  - Storage ping
//!
//! # Auth
//! POST /auth/signup                   - Create account, log in
//! POST /auth/login                    - Log in
//! POST /auth/logout                   - Log out
//! GET  /auth/check                    - Session status
//! PUT  /auth/password                 - Change password
//!
//! # Courses
//! GET  /courses                       - Catalog
//! GET  /courses/{id}                  - One course
//! POST /courses/register              - Public registration
//! GET  /courses/registrations         - Caller's registrations
//!
//! # Teacher (ManageRoster)
//! GET|POST        /teacher/students
//! GET|PUT|DELETE  /teacher/students/{id}
//! GET|POST        /teacher/attendance
//! POST            /teacher/attendance/bulk
//! GET             /teacher/reports?month=&year=
//! GET|POST        /teacher/schedules
//! PUT|DELETE      /teacher/schedules/{id}
//! GET             /teacher/dashboard
//!
//! # Admin
//! POST /admin/auth                    - Credentials or access key
//! POST /admin/logout
//! GET  /admin/check
//! GET  /admin/overview                - ViewAdminOverview
//! POST /admin/users/{id}/deactivate   - ManageAccounts
//! ```

pub mod admin;
pub mod auth;
pub mod courses;
pub mod health;
pub mod teacher;


use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/check", get(auth::check))
        .route("/password", put(auth::change_password))
}

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::index))
        .route("/register", post(courses::register))
        .route("/registrations", get(courses::my_registrations))
        .route("/{id}", get(courses::show))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", post(admin::authenticate))
        .route("/logout", post(admin::logout))
        .route("/check", get(admin::check))
        .route("/overview", get(admin::overview))
        .route("/users/{id}/deactivate", post(admin::deactivate_user))
}

/// Every route of the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes())
        .nest("/courses", course_routes())
        .nest("/teacher", teacher::routes())
        .nest("/admin", admin_routes())
}
