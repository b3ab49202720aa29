//! Weekly schedule routes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use iqra_core::ScheduleId;

use crate::error::{ApiJson, ApiPath, Result};
use crate::middleware::{Authorized, ManageRoster};
use crate::models::ScheduleUpdate;
use crate::services::ScheduleService;
use crate::services::schedules::ScheduleInput;
use crate::state::AppState;

fn service(state: &AppState, teacher: iqra_core::UserId) -> ScheduleService<'_> {
    ScheduleService::new(
        state.repos().schedules.as_ref(),
        state.repos().students.as_ref(),
        teacher,
    )
}

pub async fn index(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
) -> Result<impl IntoResponse> {
    let schedules = service(&state, teacher.id).list().await?;
    Ok(Json(json!({ "success": true, "schedules": schedules })))
}

pub async fn create(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
    ApiJson(input): ApiJson<ScheduleInput>,
) -> Result<impl IntoResponse> {
    let schedule = service(&state, teacher.id).create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "schedule": schedule })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
    ApiPath(id): ApiPath<ScheduleId>,
    ApiJson(update): ApiJson<ScheduleUpdate>,
) -> Result<impl IntoResponse> {
    let schedule = service(&state, teacher.id).update(id, update).await?;
    Ok(Json(json!({ "success": true, "schedule": schedule })))
}

pub async fn remove(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
    ApiPath(id): ApiPath<ScheduleId>,
) -> Result<impl IntoResponse> {
    service(&state, teacher.id).remove(id).await?;
    Ok(Json(json!({ "success": true, "message": "Schedule removed" })))
}
