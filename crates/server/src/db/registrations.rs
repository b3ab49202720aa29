//! Course registration storage.

use async_trait::async_trait;
use sqlx::PgPool;

use iqra_core::{Email, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{NewRegistration, Registration};

/// Storage operations for course registrations.
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Persist in `pending`.
    ///
    /// Returns `RepositoryError::Conflict` if the email already registered
    /// for the course.
    async fn create(&self, registration: NewRegistration) -> Result<Registration, RepositoryError>;

    /// Registrations linked to `user` or made with `email`, newest first.
    async fn list_for(
        &self,
        user: UserId,
        email: &Email,
    ) -> Result<Vec<Registration>, RepositoryError>;

    async fn count(&self) -> Result<i64, RepositoryError>;

    /// The newest registrations.
    async fn recent(&self, limit: i64) -> Result<Vec<Registration>, RepositoryError>;
}

const REGISTRATION_COLUMNS: &str = "id, name, email, age, course_id, course_name, \
     hifz_paras_completed, user_id, phone, amount, payment_status, status, created_at";

/// `PostgreSQL` registration repository.
pub struct PgRegistrationRepository {
    pool: PgPool,
}

impl PgRegistrationRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for PgRegistrationRepository {
    async fn create(&self, registration: NewRegistration) -> Result<Registration, RepositoryError> {
        let row = sqlx::query_as::<_, Registration>(&format!(
            r"
            INSERT INTO course_registration
                (name, email, age, course_id, course_name, hifz_paras_completed, user_id, phone, amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {REGISTRATION_COLUMNS}
            "
        ))
        .bind(&registration.name)
        .bind(&registration.email)
        .bind(registration.age)
        .bind(&registration.course_id)
        .bind(&registration.course_name)
        .bind(registration.hifz_paras_completed)
        .bind(registration.user_id)
        .bind(&registration.phone)
        .bind(registration.amount)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "already registered for this course"))?;
        Ok(row)
    }

    async fn list_for(
        &self,
        user: UserId,
        email: &Email,
    ) -> Result<Vec<Registration>, RepositoryError> {
        let rows = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM course_registration \
             WHERE user_id = $1 OR email = $2 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user)
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_registration")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Registration>, RepositoryError> {
        let rows = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM course_registration \
             ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
