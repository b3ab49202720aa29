//! Roster management for teachers.

use serde::Deserialize;

use iqra_core::{CourseTrack, Email, PaymentStatus, StudentId, UserId, Weekday};

use super::error::{ServiceError, check_range, not_found_as, optional, required};
use crate::db::{RepositoryError, StudentRepository};
use crate::models::{NewStudent, Student, StudentUpdate};

pub const MIN_AGE: i32 = 5;
pub const MAX_AGE: i32 = 100;
pub const MAX_PARAS: i32 = 30;

/// A new roster entry as sent by a teacher.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: Option<i32>,
    #[serde(default)]
    pub course: CourseTrack,
    #[serde(default)]
    pub paras_completed: i32,
    pub current_surah: Option<String>,
    #[serde(default)]
    pub preferred_days: Vec<Weekday>,
    pub preferred_time: Option<String>,
    #[serde(default)]
    pub monthly_fee: i32,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

/// Roster operations for one teacher.
pub struct RosterService<'a> {
    students: &'a dyn StudentRepository,
    teacher: UserId,
}

impl<'a> RosterService<'a> {
    #[must_use]
    pub const fn new(students: &'a dyn StudentRepository, teacher: UserId) -> Self {
        Self { students, teacher }
    }

    /// Active students, by name.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    pub async fn list(&self) -> Result<Vec<Student>, ServiceError> {
        Ok(self.students.list_active(self.teacher).await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` unless the student is active on this roster.
    pub async fn get(&self, id: StudentId) -> Result<Student, ServiceError> {
        self.students
            .get(self.teacher, id)
            .await?
            .ok_or(ServiceError::NotFound("Student"))
    }

    /// Add a student to the roster.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for bad fields and
    /// `ServiceError::Duplicate` if the email is already on this roster.
    #[tracing::instrument(skip(self, input), fields(teacher_id = %self.teacher))]
    pub async fn create(&self, input: StudentInput) -> Result<Student, ServiceError> {
        let student = NewStudent {
            teacher_id: self.teacher,
            user_id: None,
            name: required("Name", &input.name)?,
            email: Email::parse(&input.email)?,
            phone: optional(input.phone),
            age: input.age,
            course: input.course,
            paras_completed: input.paras_completed,
            current_surah: optional(input.current_surah),
            preferred_days: dedup_days(input.preferred_days),
            preferred_time: optional(input.preferred_time),
            monthly_fee: input.monthly_fee,
            payment_status: input.payment_status,
            notes: optional(input.notes),
        };
        validate_numbers(student.age, student.paras_completed, student.monthly_fee)?;

        let created = self
            .students
            .create(student)
            .await
            .map_err(duplicate_email)?;
        tracing::info!(student_id = %created.id, "Student added to roster");
        Ok(created)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` unless the student is active on this
    /// roster, plus the same validation errors as [`Self::create`].
    #[tracing::instrument(skip(self, update), fields(teacher_id = %self.teacher))]
    pub async fn update(
        &self,
        id: StudentId,
        mut update: StudentUpdate,
    ) -> Result<Student, ServiceError> {
        let mut student = self.get(id).await?;

        if let Some(name) = update.name.take() {
            update.name = Some(required("Name", &name)?);
        }
        if let Some(days) = update.preferred_days.take() {
            update.preferred_days = Some(dedup_days(days));
        }
        student.apply(update);
        validate_numbers(student.age, student.paras_completed, student.monthly_fee)?;

        self.students.save(&student).await.map_err(|e| match e {
            RepositoryError::NotFound => ServiceError::NotFound("Student"),
            other => duplicate_email(other),
        })
    }

    /// Soft-delete a student. Their attendance history is kept.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` unless the student is active on this roster.
    #[tracing::instrument(skip(self), fields(teacher_id = %self.teacher))]
    pub async fn remove(&self, id: StudentId) -> Result<(), ServiceError> {
        self.students
            .deactivate(self.teacher, id)
            .await
            .map_err(not_found_as("Student"))
    }
}

fn validate_numbers(age: Option<i32>, paras: i32, fee: i32) -> Result<(), ServiceError> {
    if let Some(age) = age {
        check_range("Age", age, MIN_AGE, MAX_AGE)?;
    }
    check_range("Paras completed", paras, 0, MAX_PARAS)?;
    if fee < 0 {
        return Err(ServiceError::invalid("Monthly fee cannot be negative"));
    }
    Ok(())
}

fn dedup_days(mut days: Vec<Weekday>) -> Vec<Weekday> {
    days.sort_unstable();
    days.dedup();
    days
}

fn duplicate_email(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::Conflict(_) => {
            ServiceError::Duplicate("A student with this email already exists".to_owned())
        }
        other => ServiceError::Repository(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn input(email: &str) -> StudentInput {
        StudentInput {
            name: " Bilal ".to_owned(),
            email: email.to_owned(),
            phone: None,
            age: Some(9),
            course: CourseTrack::Qaida,
            paras_completed: 0,
            current_surah: None,
            preferred_days: vec![Weekday::Friday, Weekday::Monday, Weekday::Friday],
            preferred_time: Some("17:00".to_owned()),
            monthly_fee: 300,
            payment_status: PaymentStatus::Pending,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_and_rejects_duplicates() {
        let store = MemoryStore::default();
        let roster = RosterService::new(&store, UserId::new(1));

        let student = roster.create(input("Bilal@Example.com")).await.unwrap();
        assert_eq!(student.name, "Bilal");
        assert_eq!(student.email.as_str(), "bilal@example.com");
        assert_eq!(student.preferred_days, vec![Weekday::Monday, Weekday::Friday]);

        assert!(matches!(
            roster.create(input("bilal@example.com")).await,
            Err(ServiceError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_create_validates_ranges() {
        let store = MemoryStore::default();
        let roster = RosterService::new(&store, UserId::new(1));

        let mut bad = input("a@example.com");
        bad.paras_completed = 31;
        assert!(matches!(roster.create(bad).await, Err(ServiceError::Validation(_))));

        let mut bad = input("a@example.com");
        bad.age = Some(4);
        assert!(matches!(roster.create(bad).await, Err(ServiceError::Validation(_))));

        let mut bad = input("a@example.com");
        bad.name = "  ".to_owned();
        assert!(matches!(roster.create(bad).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_other_teachers_cannot_see_or_change_student() {
        let store = MemoryStore::default();
        let mine = RosterService::new(&store, UserId::new(1));
        let theirs = RosterService::new(&store, UserId::new(2));
        let student = mine.create(input("a@example.com")).await.unwrap();

        assert!(matches!(theirs.get(student.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            theirs.update(student.id, StudentUpdate::default()).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(theirs.remove(student.id).await, Err(ServiceError::NotFound(_))));
        assert!(mine.get(student.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let store = MemoryStore::default();
        let roster = RosterService::new(&store, UserId::new(1));
        let student = roster.create(input("a@example.com")).await.unwrap();

        let updated = roster
            .update(
                student.id,
                StudentUpdate {
                    paras_completed: Some(5),
                    current_surah: Some("Al-Mulk".to_owned()),
                    ..StudentUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.paras_completed, 5);
        assert_eq!(updated.current_surah.as_deref(), Some("Al-Mulk"));

        assert!(matches!(
            roster
                .update(
                    student.id,
                    StudentUpdate {
                        paras_completed: Some(40),
                        ..StudentUpdate::default()
                    },
                )
                .await,
            Err(ServiceError::Validation(_))
        ));

        roster.remove(student.id).await.unwrap();
        assert!(roster.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_removed_student_can_be_enrolled_again() {
        let store = MemoryStore::default();
        let roster = RosterService::new(&store, UserId::new(1));
        let first = roster.create(input("bilal@example.com")).await.unwrap();
        roster.remove(first.id).await.unwrap();

        let again = roster.create(input("Bilal@example.com")).await.unwrap();
        assert_ne!(again.id, first.id);
        assert_eq!(roster.list().await.unwrap().len(), 1);
        assert!(matches!(roster.get(first.id).await, Err(ServiceError::NotFound(_))));
    }
}
