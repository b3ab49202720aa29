//! Attendance routes.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use iqra_core::{StudentId, UserId, normalize_day};

use crate::error::{ApiJson, ApiQuery, Result};
use crate::middleware::{Authorized, ManageRoster};
use crate::models::AttendanceFilter;
use crate::services::attendance::{AttendanceInput, BulkAttendanceInput};
use crate::services::{AttendanceService, ServiceError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub date: Option<String>,
    pub student_id: Option<StudentId>,
}

impl AttendanceQuery {
    /// `date` wins when both are given.
    fn filter(&self) -> std::result::Result<AttendanceFilter, ServiceError> {
        if let Some(date) = self.date.as_deref().filter(|d| !d.trim().is_empty()) {
            return Ok(AttendanceFilter::OnDate(normalize_day(date)?));
        }
        Ok(self
            .student_id
            .map_or(AttendanceFilter::All, AttendanceFilter::ForStudent))
    }
}

fn service(state: &AppState, teacher: UserId) -> AttendanceService<'_> {
    AttendanceService::new(
        state.repos().attendance.as_ref(),
        state.repos().students.as_ref(),
        teacher,
    )
}

/// Mark one student for one day. Marking again overwrites.
pub async fn record(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
    ApiJson(input): ApiJson<AttendanceInput>,
) -> Result<impl IntoResponse> {
    let attendance = service(&state, teacher.id).record(input).await?;
    Ok(Json(json!({ "success": true, "attendance": attendance })))
}

/// Mark a whole class. Either every record is written or none is.
pub async fn record_bulk(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
    ApiJson(input): ApiJson<BulkAttendanceInput>,
) -> Result<impl IntoResponse> {
    let count = service(&state, teacher.id).record_bulk(input).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Attendance recorded for {count} students"),
        "count": count,
    })))
}

pub async fn index(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
    ApiQuery(query): ApiQuery<AttendanceQuery>,
) -> Result<impl IntoResponse> {
    let attendance = service(&state, teacher.id).list(query.filter()?).await?;
    Ok(Json(json!({ "success": true, "attendance": attendance })))
}
