//! Session-stored identity.
//!
//! The session holds an [`AuthenticatedSession`]: who the caller is and when
//! that login stops being valid. Handlers never read the session directly;
//! they go through the extractors in `crate::middleware::auth`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use iqra_core::{Email, Role, UserId};

use super::user::User;

/// Minimal user identity kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: Role,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Whoever a session speaks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    /// A logged-in account.
    User(CurrentUser),
    /// Holder of the shared admin access key. Not tied to any account.
    AccessKey,
}

impl Principal {
    /// Effective role for capability checks.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::User(user) => user.role,
            Self::AccessKey => Role::Admin,
        }
    }

    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::User(user) => Some(user),
            Self::AccessKey => None,
        }
    }
}

/// What a successful login writes into the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedSession {
    pub principal: Principal,
    /// Absolute end of this login; not extended by activity.
    pub expires_at: DateTime<Utc>,
}

impl AuthenticatedSession {
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the [`super::AuthenticatedSession`] of the caller.
    pub const AUTH: &str = "auth";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn teacher() -> CurrentUser {
        CurrentUser {
            id: UserId::new(3),
            email: Email::parse("ustadh@example.com").unwrap(),
            name: "Ustadh Hamza".to_string(),
            role: Role::Teacher,
        }
    }

    #[test]
    fn test_access_key_principal_acts_as_admin() {
        assert_eq!(Principal::AccessKey.role(), Role::Admin);
        assert!(Principal::AccessKey.user().is_none());
        assert_eq!(Principal::User(teacher()).role(), Role::Teacher);
    }

    #[test]
    fn test_principal_survives_session_serialization() {
        let session = AuthenticatedSession {
            principal: Principal::User(teacher()),
            expires_at: Utc::now(),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["principal"]["kind"], "user");

        let back: AuthenticatedSession = serde_json::from_value(json).unwrap();
        assert_eq!(back.principal, Principal::User(teacher()));
    }

    #[test]
    fn test_session_expiry_is_absolute() {
        let now = Utc::now();
        let session = AuthenticatedSession {
            principal: Principal::AccessKey,
            expires_at: now + Duration::hours(24),
        };
        assert!(session.is_live(now));
        assert!(session.is_live(now + Duration::hours(23)));
        assert!(!session.is_live(now + Duration::hours(24)));
    }
}
