//! Account roles.

use serde::{Deserialize, Serialize};

/// Role attached to every user account.
///
/// The role travels with the session principal and is what capability checks
/// inspect; there is no separate admin flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Enrolled learner; may own course registrations.
    #[default]
    Student,
    /// Owns a roster, schedules, and attendance records.
    Teacher,
    /// Academy staff with access to the admin overview.
    Admin,
}

impl Role {
    /// All roles, in display order.
    pub const ALL: [Self; 3] = [Self::Student, Self::Teacher, Self::Admin];

    /// Lowercase name used on the wire and in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }

    /// Whether accounts of this role may be created through public signup.
    #[must_use]
    pub const fn is_self_service(self) -> bool {
        matches!(self, Self::Student | Self::Teacher)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("Teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_display_matches_serde() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }

    #[test]
    fn test_only_students_and_teachers_self_register() {
        assert!(Role::Student.is_self_service());
        assert!(Role::Teacher.is_self_service());
        assert!(!Role::Admin.is_self_service());
    }
}
