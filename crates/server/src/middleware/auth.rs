//! Authentication and capability extractors.
//!
//! The session carries an [`AuthenticatedSession`]. Handlers state what they
//! need through their arguments:
//!
//! - [`RequireUser`]: any logged-in account
//! - [`Authorized<C>`]: a principal holding capability `C`
//! - [`OptionalPrincipal`]: whoever is calling, if anyone
//!
//! A login past its `expires_at` is treated as no login at all.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn roster(Authorized(teacher): Authorized<ManageRoster>) -> impl IntoResponse {
//!     format!("Roster of {}", teacher.name)
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{TimeDelta, Utc};
use tower_sessions::{
    Expiry, Session,
    cookie::time::{Duration as CookieDuration, OffsetDateTime},
};

use iqra_core::Role;

use crate::error::AppError;
use crate::models::{AuthenticatedSession, CurrentUser, Principal, session_keys};

/// Something a principal may be allowed to do.
pub trait Capability {
    /// What the handler receives when the capability is granted.
    type Subject: Send;

    /// Describes the capability in 403 messages.
    const DESCRIPTION: &'static str;

    /// `Some` if `principal` holds this capability.
    fn grant(principal: Principal) -> Option<Self::Subject>;
}

/// Manage one's own roster, schedule and attendance. Held by teacher and
/// admin accounts, each scoped to their own user id. The access-key
/// principal has no roster.
pub struct ManageRoster;

impl Capability for ManageRoster {
    type Subject = CurrentUser;
    const DESCRIPTION: &'static str = "Teacher access required";

    fn grant(principal: Principal) -> Option<CurrentUser> {
        match principal {
            Principal::User(user) if matches!(user.role, Role::Teacher | Role::Admin) => {
                Some(user)
            }
            _ => None,
        }
    }
}

/// Read the academy overview. Held by admin accounts and by the access-key
/// principal.
pub struct ViewAdminOverview;

impl Capability for ViewAdminOverview {
    type Subject = Principal;
    const DESCRIPTION: &'static str = "Admin access required";

    fn grant(principal: Principal) -> Option<Principal> {
        (principal.role() == Role::Admin).then_some(principal)
    }
}

/// Deactivate accounts. Held by the same principals as [`ViewAdminOverview`].
pub struct ManageAccounts;

impl Capability for ManageAccounts {
    type Subject = Principal;
    const DESCRIPTION: &'static str = "Admin access required";

    fn grant(principal: Principal) -> Option<Principal> {
        ViewAdminOverview::grant(principal)
    }
}

/// Extractor that requires capability `C`.
///
/// Rejects with 401 when nobody is logged in and 403 when the principal
/// lacks the capability.
pub struct Authorized<C: Capability>(pub C::Subject);

impl<C: Capability> Authorized<C> {
    #[must_use]
    pub fn into_subject(self) -> C::Subject {
        self.0
    }
}

impl<S, C> FromRequestParts<S> for Authorized<C>
where
    S: Send + Sync,
    C: Capability,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = live_principal(parts)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_owned()))?;

        C::grant(principal)
            .map(Self)
            .ok_or_else(|| AppError::Forbidden(C::DESCRIPTION.to_owned()))
    }
}

/// Extractor that requires a logged-in account of any role.
pub struct RequireUser(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match live_principal(parts).await? {
            Some(Principal::User(user)) => Ok(Self(user)),
            _ => Err(AppError::Unauthorized("Authentication required".to_owned())),
        }
    }
}

/// Extractor that optionally gets the current principal.
///
/// Never rejects; a session that cannot be read counts as anonymous.
pub struct OptionalPrincipal(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalPrincipal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(live_principal(parts).await.ok().flatten()))
    }
}

impl OptionalPrincipal {
    #[must_use]
    pub fn user(&self) -> Option<&CurrentUser> {
        self.0.as_ref().and_then(Principal::user)
    }
}

async fn live_principal(parts: &Parts) -> Result<Option<Principal>, AppError> {
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };

    let auth: Option<AuthenticatedSession> = session.get(session_keys::AUTH).await?;
    Ok(auth
        .filter(|a| a.is_live(Utc::now()))
        .map(|a| a.principal))
}

/// Start a login: new session id, principal stored, absolute expiry set.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn sign_in(
    session: &Session,
    principal: Principal,
    ttl_hours: i64,
) -> Result<AuthenticatedSession, tower_sessions::session::Error> {
    let auth = AuthenticatedSession {
        principal,
        expires_at: Utc::now() + TimeDelta::hours(ttl_hours),
    };

    session.cycle_id().await?;
    session.insert(session_keys::AUTH, &auth).await?;
    session.set_expiry(Some(Expiry::AtDateTime(
        OffsetDateTime::now_utc() + CookieDuration::hours(ttl_hours),
    )));

    Ok(auth)
}

/// End the login: the stored session is deleted and the cookie cleared.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn sign_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use iqra_core::{Email, UserId};

    use super::*;

    fn user(role: Role) -> Principal {
        Principal::User(CurrentUser {
            id: UserId::new(1),
            email: Email::parse("someone@example.com").unwrap(),
            name: "Someone".to_owned(),
            role,
        })
    }

    #[test]
    fn test_manage_roster_for_teacher_and_admin_accounts() {
        assert!(ManageRoster::grant(user(Role::Teacher)).is_some());
        assert!(ManageRoster::grant(user(Role::Student)).is_none());
        assert!(ManageRoster::grant(Principal::AccessKey).is_none());

        let admin = ManageRoster::grant(user(Role::Admin)).unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.id, UserId::new(1));
    }

    #[test]
    fn test_admin_overview_needs_admin_role() {
        assert!(ViewAdminOverview::grant(user(Role::Admin)).is_some());
        assert!(ViewAdminOverview::grant(Principal::AccessKey).is_some());
        assert!(ViewAdminOverview::grant(user(Role::Teacher)).is_none());
        assert!(ViewAdminOverview::grant(user(Role::Student)).is_none());
    }
}
