//! Account routes: signup, login, logout, session check, password change.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use iqra_core::Role;

use crate::error::{ApiJson, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalPrincipal, RequireUser, sign_in, sign_out};
use crate::models::{CurrentUser, Principal};
use crate::services::{AuthService, Signup};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role", alias = "userType")]
    pub role: Role,
    pub phone: Option<String>,
    pub country: Option<String>,
}

const fn default_role() -> Role {
    Role::Student
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// When present, the account must hold this role.
    #[serde(alias = "userType")]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Create an account and log it in.
#[tracing::instrument(skip(state, session, req), fields(role = %req.role))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.repos().users.as_ref(), state.argon2());
    let user = auth
        .signup(Signup {
            name: req.name,
            email: req.email,
            password: req.password,
            role: req.role,
            phone: req.phone,
            country: req.country,
        })
        .await?;

    sign_in(
        &session,
        Principal::User(CurrentUser::from(&user)),
        state.config().session_ttl_hours,
    )
    .await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok((
        StatusCode::CREATED,
        axum::Json(json!({ "success": true, "user": user })),
    ))
}

#[tracing::instrument(skip(state, session, req))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.repos().users.as_ref(), state.argon2());
    let user = match auth.login(&req.email, &req.password, req.role).await {
        Ok(user) => user,
        Err(e) => {
            tracing::info!("Login rejected");
            return Err(e.into());
        }
    };

    sign_in(
        &session,
        Principal::User(CurrentUser::from(&user)),
        state.config().session_ttl_hours,
    )
    .await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "Logged in");

    Ok(axum::Json(json!({ "success": true, "user": user })))
}

pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    sign_out(&session).await?;
    clear_sentry_user();
    Ok(axum::Json(
        json!({ "success": true, "message": "Logged out successfully" }),
    ))
}

/// Report whether the caller is logged in to an account.
pub async fn check(principal: OptionalPrincipal) -> impl IntoResponse {
    let user = principal.user();
    axum::Json(json!({
        "success": true,
        "isAuthenticated": user.is_some(),
        "user": user,
    }))
}

#[tracing::instrument(skip(state, req), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse> {
    AuthService::new(state.repos().users.as_ref(), state.argon2())
        .change_password(user.id, &user.email, &req.current_password, &req.new_password)
        .await?;

    Ok(axum::Json(
        json!({ "success": true, "message": "Password updated successfully" }),
    ))
}
