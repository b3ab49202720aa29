//! Roster routes. Every handler requires the `ManageRoster` capability
//! (teacher and admin accounts) and only sees the caller's own records.

pub mod attendance;
pub mod dashboard;
pub mod reports;
pub mod schedules;
pub mod students;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(students::index).post(students::create))
        .route(
            "/students/{id}",
            get(students::show)
                .put(students::update)
                .delete(students::remove),
        )
        .route(
            "/attendance",
            get(attendance::index).post(attendance::record),
        )
        .route("/attendance/bulk", post(attendance::record_bulk))
        .route("/reports", get(reports::monthly))
        .route("/schedules", get(schedules::index).post(schedules::create))
        .route(
            "/schedules/{id}",
            put(schedules::update).delete(schedules::remove),
        )
        .route("/dashboard", get(dashboard::show))
}
