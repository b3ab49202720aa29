//! Roster routes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use iqra_core::StudentId;

use crate::error::{ApiJson, ApiPath, Result};
use crate::middleware::{Authorized, ManageRoster};
use crate::models::StudentUpdate;
use crate::services::RosterService;
use crate::services::roster::StudentInput;
use crate::state::AppState;

pub async fn index(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
) -> Result<impl IntoResponse> {
    let students = RosterService::new(state.repos().students.as_ref(), teacher.id)
        .list()
        .await?;
    Ok(Json(json!({ "success": true, "students": students })))
}

pub async fn show(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
    ApiPath(id): ApiPath<StudentId>,
) -> Result<impl IntoResponse> {
    let student = RosterService::new(state.repos().students.as_ref(), teacher.id)
        .get(id)
        .await?;
    Ok(Json(json!({ "success": true, "student": student })))
}

pub async fn create(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
    ApiJson(input): ApiJson<StudentInput>,
) -> Result<impl IntoResponse> {
    let student = RosterService::new(state.repos().students.as_ref(), teacher.id)
        .create(input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "student": student })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
    ApiPath(id): ApiPath<StudentId>,
    ApiJson(update): ApiJson<StudentUpdate>,
) -> Result<impl IntoResponse> {
    let student = RosterService::new(state.repos().students.as_ref(), teacher.id)
        .update(id, update)
        .await?;
    Ok(Json(json!({ "success": true, "student": student })))
}

/// Soft-delete; attendance history is kept.
pub async fn remove(
    State(state): State<AppState>,
    Authorized(teacher): Authorized<ManageRoster>,
    ApiPath(id): ApiPath<StudentId>,
) -> Result<impl IntoResponse> {
    RosterService::new(state.repos().students.as_ref(), teacher.id)
        .remove(id)
        .await?;
    Ok(Json(json!({ "success": true, "message": "Student removed" })))
}
