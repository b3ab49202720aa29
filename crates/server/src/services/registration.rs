//! Public course registration.

use serde::Deserialize;

use iqra_core::{Course, Email, UserId};

use super::error::{ServiceError, check_range, optional, required};
use super::events::{AcademyEvent, EventBus};
use super::roster::{MAX_AGE, MAX_PARAS, MIN_AGE};
use crate::db::{RegistrationRepository, RepositoryError};
use crate::models::{CurrentUser, NewRegistration, Registration};

/// A registration form submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInput {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub course_id: String,
    #[serde(default)]
    pub hifz_paras_completed: i32,
    pub phone: Option<String>,
}

pub struct RegistrationService<'a> {
    registrations: &'a dyn RegistrationRepository,
    events: &'a EventBus,
}

impl<'a> RegistrationService<'a> {
    #[must_use]
    pub const fn new(registrations: &'a dyn RegistrationRepository, events: &'a EventBus) -> Self {
        Self {
            registrations,
            events,
        }
    }

    /// Store a registration in `pending` and announce it.
    ///
    /// The amount is the course price. Roster seeding happens afterwards on
    /// the event bus and cannot fail this call.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for bad fields or an unknown course
    /// and `ServiceError::Duplicate` if the email already registered for it.
    #[tracing::instrument(skip(self, input), fields(course_id = %input.course_id))]
    pub async fn submit(
        &self,
        input: RegistrationInput,
        user: Option<UserId>,
    ) -> Result<Registration, ServiceError> {
        let name = required("Name", &input.name)?;
        let email = Email::parse(&input.email)?;
        check_range("Age", input.age, MIN_AGE, MAX_AGE)?;
        check_range(
            "Hifz paras completed",
            input.hifz_paras_completed,
            0,
            MAX_PARAS,
        )?;
        let course = Course::find(input.course_id.trim())
            .ok_or_else(|| ServiceError::invalid("Unknown course"))?;

        let registration = self
            .registrations
            .create(NewRegistration {
                name,
                email,
                age: input.age,
                course_id: course.id.to_owned(),
                course_name: course.name.to_owned(),
                hifz_paras_completed: input.hifz_paras_completed,
                user_id: user,
                phone: optional(input.phone),
                amount: course.price,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    ServiceError::Duplicate("You have already registered for this course".to_owned())
                }
                other => ServiceError::Repository(other),
            })?;

        tracing::info!(registration_id = %registration.id, "Registration received");
        drop(
            self.events
                .publish(AcademyEvent::RegistrationCreated(registration.clone())),
        );
        Ok(registration)
    }

    /// Registrations made by, or linked to, `user`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    pub async fn list_for(&self, user: &CurrentUser) -> Result<Vec<Registration>, ServiceError> {
        Ok(self.registrations.list_for(user.id, &user.email).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use iqra_core::{CourseTrack, RegistrationStatus, Role};

    use super::*;
    use crate::db::{MemoryStore, StudentRepository, UserRepository};
    use crate::models::NewUser;
    use crate::services::roster_projection::RosterProjection;

    fn alice() -> RegistrationInput {
        RegistrationInput {
            name: "Alice".to_owned(),
            email: "alice@example.com".to_owned(),
            age: 10,
            course_id: "pearls-of-juz-amma".to_owned(),
            hifz_paras_completed: 0,
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_submit_prices_from_catalog() {
        let store = MemoryStore::default();
        let bus = EventBus::default();
        let service = RegistrationService::new(&store, &bus);

        let registration = service.submit(alice(), None).await.unwrap();
        assert_eq!(registration.amount, 450);
        assert_eq!(registration.course_name, "Pearls of Juz Amma");
        assert_eq!(registration.status, RegistrationStatus::Pending);
    }

    #[tokio::test]
    async fn test_second_submission_is_duplicate() {
        let store = MemoryStore::default();
        let bus = EventBus::default();
        let service = RegistrationService::new(&store, &bus);

        service.submit(alice(), None).await.unwrap();
        let mut again = alice();
        again.email = "ALICE@example.com".to_owned();
        let err = service.submit(again, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));

        let mut other_course = alice();
        other_course.course_id = "tajweed-mastery".to_owned();
        assert!(service.submit(other_course, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let store = MemoryStore::default();
        let bus = EventBus::default();
        let service = RegistrationService::new(&store, &bus);

        let mut young = alice();
        young.age = 4;
        assert!(matches!(
            service.submit(young, None).await,
            Err(ServiceError::Validation(_))
        ));

        let mut unknown = alice();
        unknown.course_id = "basket-weaving".to_owned();
        assert!(matches!(
            service.submit(unknown, None).await,
            Err(ServiceError::Validation(_))
        ));

        let mut paras = alice();
        paras.hifz_paras_completed = 31;
        assert!(matches!(
            service.submit(paras, None).await,
            Err(ServiceError::Validation(_))
        ));

        assert_eq!(RegistrationRepository::count(&store).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_submission_seeds_teacher_roster() {
        let store = MemoryStore::default();
        let teacher = UserRepository::create(
            &store,
            NewUser {
                name: "Ustadh Bilal".to_owned(),
                email: Email::parse("bilal@example.com").unwrap(),
                password_hash: "x".to_owned(),
                role: Role::Teacher,
                phone: None,
                country: None,
            },
        )
        .await
        .unwrap();

        let bus = EventBus::new(vec![Arc::new(RosterProjection::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        ))]);
        let service = RegistrationService::new(&store, &bus);
        service.submit(alice(), None).await.unwrap();

        let mut roster = Vec::new();
        for _ in 0..50 {
            roster = StudentRepository::list_active(&store, teacher.id).await.unwrap();
            if !roster.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].course, CourseTrack::Hifz);
        assert_eq!(roster[0].monthly_fee, 450);
    }
}
