//! Seeds teacher rosters from course registrations.
//!
//! Every active teacher gets a roster entry for each new registrant, unless
//! they already have one with the same email. Entries start with the
//! course's track and price and the registrant's memorisation progress.

use std::sync::Arc;

use async_trait::async_trait;

use iqra_core::{Course, Role};

use super::events::{AcademyEvent, Projection};
use crate::db::{RepositoryError, StudentRepository, UserRepository};
use crate::models::{NewStudent, Registration};

/// Projection from registrations to roster entries.
pub struct RosterProjection {
    users: Arc<dyn UserRepository>,
    students: Arc<dyn StudentRepository>,
}

impl RosterProjection {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, students: Arc<dyn StudentRepository>) -> Self {
        Self { users, students }
    }

    async fn seed(&self, registration: &Registration) -> Result<(), RepositoryError> {
        let Some(course) = Course::find(&registration.course_id) else {
            tracing::warn!(
                course_id = %registration.course_id,
                "Registration references an unknown course, not seeding rosters"
            );
            return Ok(());
        };

        let teachers = self.users.list_active_by_role(Role::Teacher).await?;
        let mut seeded = 0_usize;
        let mut last_error = None;

        for teacher in &teachers {
            let entry = NewStudent {
                teacher_id: teacher.id,
                user_id: registration.user_id,
                name: registration.name.clone(),
                email: registration.email.clone(),
                phone: registration.phone.clone(),
                age: Some(registration.age),
                course: course.track,
                paras_completed: registration.hifz_paras_completed,
                current_surah: None,
                preferred_days: Vec::new(),
                preferred_time: None,
                monthly_fee: registration.amount,
                payment_status: registration.payment_status,
                notes: Some(format!("Registered for {}", registration.course_name)),
            };

            match self.students.create_if_absent(entry).await {
                Ok(Some(_)) => seeded += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(teacher_id = %teacher.id, error = %e, "Failed to seed roster entry");
                    last_error = Some(e);
                }
            }
        }

        tracing::info!(
            registration_id = %registration.id,
            teachers = teachers.len(),
            seeded,
            "Rosters seeded from registration"
        );

        last_error.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl Projection for RosterProjection {
    fn name(&self) -> &'static str {
        "roster"
    }

    async fn apply(&self, event: &AcademyEvent) -> Result<(), RepositoryError> {
        match event {
            AcademyEvent::RegistrationCreated(registration) => self.seed(registration).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use iqra_core::{CourseTrack, Email, PaymentStatus, RegistrationId, RegistrationStatus};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewUser, User};

    async fn account(store: &MemoryStore, email: &str, role: Role) -> User {
        UserRepository::create(
            store,
            NewUser {
                name: email.to_owned(),
                email: Email::parse(email).unwrap(),
                password_hash: "unused".to_owned(),
                role,
                phone: None,
                country: None,
            },
        )
        .await
        .unwrap()
    }

    fn registration(course_id: &str) -> Registration {
        Registration {
            id: RegistrationId::new(50),
            name: "Alice".to_owned(),
            email: Email::parse("alice@example.com").unwrap(),
            age: 10,
            course_id: course_id.to_owned(),
            course_name: "Pearls of Juz Amma".to_owned(),
            hifz_paras_completed: 1,
            user_id: None,
            phone: None,
            amount: 450,
            payment_status: PaymentStatus::Pending,
            status: RegistrationStatus::Pending,
            created_at: Utc::now(),
        }
    }

    fn projection(store: &MemoryStore) -> RosterProjection {
        RosterProjection::new(Arc::new(store.clone()), Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn test_every_active_teacher_gets_the_registrant() {
        let store = MemoryStore::default();
        let t1 = account(&store, "t1@example.com", Role::Teacher).await;
        let t2 = account(&store, "t2@example.com", Role::Teacher).await;
        let gone = account(&store, "t3@example.com", Role::Teacher).await;
        account(&store, "s@example.com", Role::Student).await;
        UserRepository::deactivate(&store, gone.id).await.unwrap();

        let event = AcademyEvent::RegistrationCreated(registration("pearls-of-juz-amma"));
        projection(&store).apply(&event).await.unwrap();

        for teacher in [t1.id, t2.id] {
            let roster = StudentRepository::list_active(&store, teacher).await.unwrap();
            assert_eq!(roster.len(), 1);
            assert_eq!(roster[0].course, CourseTrack::Hifz);
            assert_eq!(roster[0].monthly_fee, 450);
            assert_eq!(roster[0].paras_completed, 1);
        }
        assert!(
            StudentRepository::list_active(&store, gone.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_replaying_does_not_duplicate() {
        let store = MemoryStore::default();
        let teacher = account(&store, "t1@example.com", Role::Teacher).await;
        let projection = projection(&store);
        let event = AcademyEvent::RegistrationCreated(registration("pearls-of-juz-amma"));

        projection.apply(&event).await.unwrap();
        projection.apply(&event).await.unwrap();

        let roster = StudentRepository::list_active(&store, teacher.id).await.unwrap();
        assert_eq!(roster.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_course_seeds_nothing() {
        let store = MemoryStore::default();
        let teacher = account(&store, "t1@example.com", Role::Teacher).await;

        let event = AcademyEvent::RegistrationCreated(registration("no-such-course"));
        projection(&store).apply(&event).await.unwrap();

        assert!(
            StudentRepository::list_active(&store, teacher.id)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
