//! Weekly schedule storage.

use async_trait::async_trait;
use sqlx::PgPool;

use iqra_core::{ScheduleId, UserId};

use super::RepositoryError;
use crate::models::{NewSchedule, Schedule};

/// Storage operations for class slots, scoped to the owning teacher.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, schedule: NewSchedule) -> Result<Schedule, RepositoryError>;

    async fn get(
        &self,
        teacher: UserId,
        id: ScheduleId,
    ) -> Result<Option<Schedule>, RepositoryError>;

    /// Active slots ordered Monday first, then by start time.
    async fn list_active(&self, teacher: UserId) -> Result<Vec<Schedule>, RepositoryError>;

    /// Persist every mutable field. `RepositoryError::NotFound` if gone or inactive.
    async fn save(&self, schedule: &Schedule) -> Result<Schedule, RepositoryError>;

    /// Soft-delete. `RepositoryError::NotFound` if no active slot matches.
    async fn deactivate(&self, teacher: UserId, id: ScheduleId) -> Result<(), RepositoryError>;
}

const SCHEDULE_COLUMNS: &str = "id, teacher_id, student_id, day_of_week, start_time, end_time, \
     session_type, is_active, created_at, updated_at";

/// `PostgreSQL` schedule repository.
pub struct PgScheduleRepository {
    pool: PgPool,
}

impl PgScheduleRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PgScheduleRepository {
    async fn create(&self, schedule: NewSchedule) -> Result<Schedule, RepositoryError> {
        let row = sqlx::query_as::<_, Schedule>(&format!(
            r"
            INSERT INTO schedule (teacher_id, student_id, day_of_week, start_time, end_time, session_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SCHEDULE_COLUMNS}
            "
        ))
        .bind(schedule.teacher_id)
        .bind(schedule.student_id)
        .bind(schedule.day_of_week)
        .bind(schedule.start_time)
        .bind(schedule.end_time)
        .bind(schedule.session_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get(
        &self,
        teacher: UserId,
        id: ScheduleId,
    ) -> Result<Option<Schedule>, RepositoryError> {
        let row = sqlx::query_as::<_, Schedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedule WHERE id = $1 AND teacher_id = $2 AND is_active"
        ))
        .bind(id)
        .bind(teacher)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_active(&self, teacher: UserId) -> Result<Vec<Schedule>, RepositoryError> {
        let rows = sqlx::query_as::<_, Schedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedule WHERE teacher_id = $1 AND is_active \
             ORDER BY day_of_week, start_time, id"
        ))
        .bind(teacher)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn save(&self, schedule: &Schedule) -> Result<Schedule, RepositoryError> {
        sqlx::query_as::<_, Schedule>(&format!(
            r"
            UPDATE schedule SET
                student_id = $3, day_of_week = $4, start_time = $5, end_time = $6,
                session_type = $7, updated_at = NOW()
            WHERE id = $1 AND teacher_id = $2 AND is_active
            RETURNING {SCHEDULE_COLUMNS}
            "
        ))
        .bind(schedule.id)
        .bind(schedule.teacher_id)
        .bind(schedule.student_id)
        .bind(schedule.day_of_week)
        .bind(schedule.start_time)
        .bind(schedule.end_time)
        .bind(schedule.session_type)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn deactivate(&self, teacher: UserId, id: ScheduleId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE schedule SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND teacher_id = $2 AND is_active
            ",
        )
        .bind(id)
        .bind(teacher)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
