//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use iqra_core::{Email, Role, UserId};

/// An academy account.
///
/// The password hash is never part of this type; it is only read by the
/// credential lookup in `crate::db::users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub country: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_json_has_no_password_field() {
        let now = Utc::now();
        let user = User {
            id: UserId::new(1),
            name: "Yusuf".to_string(),
            email: Email::parse("yusuf@example.com").unwrap(),
            role: Role::Teacher,
            phone: None,
            country: Some("UK".to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "teacher");
        assert_eq!(json["isActive"], true);
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
