//! Read-only academy overview and account administration.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::{Digest, Sha256};

use iqra_core::{CATALOG, Role, UserId};

use super::error::{ServiceError, not_found_as};
use crate::db::Repositories;
use crate::models::{Attendance, FeeTotal, Registration, User};

/// Rows of recent activity included in the overview.
pub const RECENT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewTotals {
    pub students: i64,
    pub teachers: i64,
    pub courses: usize,
    pub registrations: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub totals: OverviewTotals,
    /// Monthly fees of active students, grouped by payment status.
    pub fee_totals: Vec<FeeTotal>,
    pub recent_attendance: Vec<Attendance>,
    pub recent_registrations: Vec<Registration>,
}

pub struct AdminService<'a> {
    repos: &'a Repositories,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(repos: &'a Repositories) -> Self {
        Self { repos }
    }

    /// Counts, fee totals and the newest `recent` attendance marks and
    /// registrations.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    #[tracing::instrument(skip(self))]
    pub async fn overview(&self, recent: i64) -> Result<AdminOverview, ServiceError> {
        let totals = OverviewTotals {
            students: self.repos.students.count_active().await?,
            teachers: self.repos.users.count_active_by_role(Role::Teacher).await?,
            courses: CATALOG.len(),
            registrations: self.repos.registrations.count().await?,
        };

        Ok(AdminOverview {
            totals,
            fee_totals: self.repos.students.fee_totals().await?,
            recent_attendance: self.repos.attendance.recent(recent).await?,
            recent_registrations: self.repos.registrations.recent(recent).await?,
        })
    }

    /// Soft-deactivate an account. The user can no longer log in.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no such user exists.
    #[tracing::instrument(skip(self), fields(user_id = %id))]
    pub async fn deactivate_user(&self, id: UserId) -> Result<User, ServiceError> {
        let user = self
            .repos
            .users
            .deactivate(id)
            .await
            .map_err(not_found_as("User"))?;
        tracing::info!(role = %user.role, "User deactivated");
        Ok(user)
    }
}

/// Compare a presented admin key with the configured one.
///
/// Both sides are hashed first so the comparison runs over equal-length
/// digests regardless of input length.
#[must_use]
pub fn access_key_matches(configured: &SecretString, presented: &str) -> bool {
    let expected = Sha256::digest(configured.expose_secret().as_bytes());
    let actual = Sha256::digest(presented.as_bytes());
    constant_time_eq(&expected, &actual)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use iqra_core::{AttendanceStatus, CourseTrack, Email, PaymentStatus};

    use super::*;
    use crate::db::{
        AttendanceRepository, MemoryStore, RegistrationRepository, StudentRepository,
        UserRepository,
    };
    use crate::models::{AttendanceMark, LessonNotes, NewRegistration, NewStudent, NewUser};

    async fn teacher(store: &MemoryStore, email: &str) -> User {
        UserRepository::create(
            store,
            NewUser {
                name: "Teacher".to_owned(),
                email: Email::parse(email).unwrap(),
                password_hash: "unused".to_owned(),
                role: Role::Teacher,
                phone: None,
                country: None,
            },
        )
        .await
        .unwrap()
    }

    fn student(teacher: UserId, email: &str, fee: i32, status: PaymentStatus) -> NewStudent {
        NewStudent {
            teacher_id: teacher,
            user_id: None,
            name: email.to_owned(),
            email: Email::parse(email).unwrap(),
            phone: None,
            age: Some(12),
            course: CourseTrack::Nazra,
            paras_completed: 0,
            current_surah: None,
            preferred_days: Vec::new(),
            preferred_time: None,
            monthly_fee: fee,
            payment_status: status,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_overview_totals() {
        let store = MemoryStore::default();
        let repos = Repositories::from_memory(store.clone());
        let t = teacher(&store, "t@example.com").await;
        teacher(&store, "t2@example.com").await;

        let paid = StudentRepository::create(
            &store,
            student(t.id, "a@example.com", 300, PaymentStatus::Paid),
        )
        .await
        .unwrap();
        StudentRepository::create(&store, student(t.id, "b@example.com", 200, PaymentStatus::Paid))
            .await
            .unwrap();
        StudentRepository::create(
            &store,
            student(t.id, "c@example.com", 450, PaymentStatus::Overdue),
        )
        .await
        .unwrap();

        AttendanceRepository::upsert(
            &store,
            t.id,
            AttendanceMark {
                student_id: paid.id,
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                status: AttendanceStatus::Present,
                notes: LessonNotes::default(),
            },
        )
        .await
        .unwrap();
        RegistrationRepository::create(
            &store,
            NewRegistration {
                name: "Alice".to_owned(),
                email: Email::parse("alice@example.com").unwrap(),
                age: 10,
                course_id: "tajweed-mastery".to_owned(),
                course_name: "Tajweed Mastery".to_owned(),
                hifz_paras_completed: 0,
                user_id: None,
                phone: None,
                amount: 500,
            },
        )
        .await
        .unwrap();

        let overview = AdminService::new(&repos).overview(RECENT_LIMIT).await.unwrap();
        assert_eq!(overview.totals.students, 3);
        assert_eq!(overview.totals.teachers, 2);
        assert_eq!(overview.totals.courses, CATALOG.len());
        assert_eq!(overview.totals.registrations, 1);
        assert_eq!(overview.recent_attendance.len(), 1);
        assert_eq!(overview.recent_registrations.len(), 1);

        let paid_total = overview
            .fee_totals
            .iter()
            .find(|f| f.payment_status == PaymentStatus::Paid)
            .unwrap();
        assert_eq!(paid_total.students, 2);
        assert_eq!(paid_total.amount, 500);
    }

    #[tokio::test]
    async fn test_deactivate_unknown_user() {
        let repos = Repositories::in_memory();
        let err = AdminService::new(&repos)
            .deactivate_user(UserId::new(404))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("User")));
    }

    #[test]
    fn test_access_key_matches() {
        let key = SecretString::from("k3y-Th4t-1s-Long-3nough-And-R4nd0m!!");
        assert!(access_key_matches(&key, "k3y-Th4t-1s-Long-3nough-And-R4nd0m!!"));
        assert!(!access_key_matches(&key, "k3y-Th4t-1s-Long-3nough-And-R4nd0m!"));
        assert!(!access_key_matches(&key, ""));
    }
}
