//! Monthly attendance report route.

use axum::{Json, extract::State, response::IntoResponse};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiQuery, Result};
use crate::middleware::{Authorized, ManageRoster};
use crate::services::AttendanceService;
use crate::state::AppState;

/// Missing fields default to the current month.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

pub async fn monthly(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> Result<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let month = query.month.unwrap_or_else(|| today.month());
    let year = query.year.unwrap_or_else(|| today.year());

    let reports = AttendanceService::new(
        state.repos().attendance.as_ref(),
        state.repos().students.as_ref(),
        teacher.id,
    )
    .monthly_report(month, year)
    .await?;

    Ok(Json(json!({ "success": true, "reports": reports })))
}
