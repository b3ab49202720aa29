//! Course catalog and public registration.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use iqra_core::{CATALOG, Course};

use crate::error::{ApiJson, ApiPath, AppError, Result};
use crate::middleware::{OptionalPrincipal, RequireUser};
use crate::services::RegistrationService;
use crate::services::registration::RegistrationInput;
use crate::state::AppState;

pub async fn index() -> impl IntoResponse {
    Json(json!({ "success": true, "courses": CATALOG }))
}

pub async fn show(ApiPath(id): ApiPath<String>) -> Result<impl IntoResponse> {
    let course =
        Course::find(&id).ok_or_else(|| AppError::NotFound("Course not found".to_owned()))?;
    Ok(Json(json!({ "success": true, "course": course })))
}

/// Register for a course. Open to anonymous visitors; a logged-in account is
/// linked to the registration.
pub async fn register(
    State(state): State<AppState>,
    principal: OptionalPrincipal,
    ApiJson(input): ApiJson<RegistrationInput>,
) -> Result<impl IntoResponse> {
    let registration = RegistrationService::new(state.repos().registrations.as_ref(), state.events())
        .submit(input, principal.user().map(|u| u.id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration received",
            "registration": {
                "id": registration.id,
                "courseName": registration.course_name,
                "name": registration.name,
                "email": registration.email,
                "amount": registration.amount,
                "status": registration.status,
            },
        })),
    ))
}

/// Registrations belonging to the logged-in account.
pub async fn my_registrations(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let registrations =
        RegistrationService::new(state.repos().registrations.as_ref(), state.events())
            .list_for(&user)
            .await?;
    Ok(Json(json!({ "success": true, "registrations": registrations })))
}
