//! Teacher dashboard route.

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

use crate::error::Result;
use crate::middleware::{Authorized, ManageRoster};
use crate::services::teacher_dashboard;
use crate::state::AppState;

pub async fn show(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
) -> Result<impl IntoResponse> {
    let repos = state.repos();
    let dashboard = teacher_dashboard(
        repos.students.as_ref(),
        repos.schedules.as_ref(),
        repos.attendance.as_ref(),
        teacher.id,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(json!({ "success": true, "dashboard": dashboard })))
}
