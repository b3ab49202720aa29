//! Admin routes.
//!
//! Admin access is granted either by logging in as an admin account or by
//! presenting the configured access key. Both put a principal with the
//! admin role into the session; the key principal is not tied to any user.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use iqra_core::{Role, UserId};

use crate::error::{ApiJson, ApiPath, ApiQuery, AppError, Result, clear_sentry_user};
use crate::middleware::{
    Authorized, ManageAccounts, OptionalPrincipal, ViewAdminOverview, sign_in, sign_out,
};
use crate::models::{CurrentUser, Principal};
use crate::services::admin::RECENT_LIMIT;
use crate::services::{AdminService, AuthService, access_key_matches};
use crate::state::AppState;

const MAX_RECENT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AdminAuthRequest {
    Key { key: String },
    Credentials { email: String, password: String },
}

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    pub limit: Option<i64>,
}

#[tracing::instrument(skip_all)]
pub async fn authenticate(
    State(state): State<AppState>,
    session: Session,
    ApiJson(req): ApiJson<AdminAuthRequest>,
) -> Result<impl IntoResponse> {
    let principal = match req {
        AdminAuthRequest::Key { key } => {
            let configured = state
                .config()
                .admin_access_key
                .as_ref()
                .ok_or_else(|| AppError::Unauthorized("Invalid access key".to_owned()))?;
            if !access_key_matches(configured, &key) {
                tracing::warn!("Rejected admin access key");
                return Err(AppError::Unauthorized("Invalid access key".to_owned()));
            }
            Principal::AccessKey
        }
        AdminAuthRequest::Credentials { email, password } => {
            let user = AuthService::new(state.repos().users.as_ref(), state.argon2())
                .login(&email, &password, Some(Role::Admin))
                .await?;
            Principal::User(CurrentUser::from(&user))
        }
    };

    sign_in(&session, principal, state.config().session_ttl_hours).await?;
    tracing::info!("Admin access granted");

    Ok(Json(json!({
        "success": true,
        "message": "Admin access granted",
        "isAdmin": true,
    })))
}

pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    sign_out(&session).await?;
    clear_sentry_user();
    Ok(Json(json!({ "success": true, "message": "Logged out successfully" })))
}

pub async fn check(OptionalPrincipal(principal): OptionalPrincipal) -> impl IntoResponse {
    let is_admin = principal.is_some_and(|p| p.role() == Role::Admin);
    Json(json!({ "success": true, "isAdmin": is_admin }))
}

pub async fn overview(
    State(state): State<AppState>,
    _admin: Authorized<ViewAdminOverview>,
    ApiQuery(query): ApiQuery<OverviewQuery>,
) -> Result<impl IntoResponse> {
    let limit = query
        .limit
        .unwrap_or(RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);
    let overview = AdminService::new(state.repos()).overview(limit).await?;
    Ok(Json(json!({ "success": true, "overview": overview })))
}

pub async fn deactivate_user(
    State(state): State<AppState>,
    _admin: Authorized<ManageAccounts>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<impl IntoResponse> {
    AdminService::new(state.repos()).deactivate_user(id).await?;
    Ok(Json(json!({ "success": true, "message": "User deactivated" })))
}
