//! Attendance storage.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres};

use iqra_core::UserId;

use super::RepositoryError;
use crate::models::{Attendance, AttendanceFilter, AttendanceMark};

/// Storage operations for attendance marks.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Insert or overwrite the mark for (student, teacher, date).
    ///
    /// `RepositoryError::NotFound` if the student is not an active entry on
    /// the teacher's roster.
    async fn upsert(
        &self,
        teacher: UserId,
        mark: AttendanceMark,
    ) -> Result<Attendance, RepositoryError>;

    /// Upsert every mark or none of them.
    ///
    /// Returns the number of marks written. Fails with
    /// `RepositoryError::NotFound` if any student is not on the teacher's
    /// active roster, in which case nothing is written.
    async fn upsert_batch(
        &self,
        teacher: UserId,
        marks: &[AttendanceMark],
    ) -> Result<usize, RepositoryError>;

    /// The teacher's marks matching `filter`, newest first.
    async fn list(
        &self,
        teacher: UserId,
        filter: AttendanceFilter,
    ) -> Result<Vec<Attendance>, RepositoryError>;

    /// The teacher's marks with `first <= date <= last`.
    async fn in_range(
        &self,
        teacher: UserId,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<Attendance>, RepositoryError>;

    /// The most recently written marks across all teachers.
    async fn recent(&self, limit: i64) -> Result<Vec<Attendance>, RepositoryError>;
}

const ATTENDANCE_COLUMNS: &str = "id, student_id, teacher_id, date, status, notes, surah, ayahs, \
     tajweed_score, created_at, updated_at";

// Inserts only when the student is active on the teacher's roster, so an
// empty result means "not found" and no separate ownership query is needed.
const UPSERT_ATTENDANCE: &str = r"
    INSERT INTO attendance (student_id, teacher_id, date, status, notes, surah, ayahs, tajweed_score)
    SELECT s.id, s.teacher_id, $3, $4, $5, $6, $7, $8
    FROM student s
    WHERE s.id = $1 AND s.teacher_id = $2 AND s.is_active
    ON CONFLICT (student_id, teacher_id, date) DO UPDATE SET
        status = EXCLUDED.status,
        notes = EXCLUDED.notes,
        surah = EXCLUDED.surah,
        ayahs = EXCLUDED.ayahs,
        tajweed_score = EXCLUDED.tajweed_score,
        updated_at = NOW()
";

/// `PostgreSQL` attendance repository.
pub struct PgAttendanceRepository {
    pool: PgPool,
}

impl PgAttendanceRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn upsert_one<'e, E>(
    executor: E,
    teacher: UserId,
    mark: &AttendanceMark,
) -> Result<Option<Attendance>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, Attendance>(&format!(
        "{UPSERT_ATTENDANCE} RETURNING {ATTENDANCE_COLUMNS}"
    ))
    .bind(mark.student_id)
    .bind(teacher)
    .bind(mark.date)
    .bind(mark.status)
    .bind(&mark.notes.notes)
    .bind(&mark.notes.surah)
    .bind(&mark.notes.ayahs)
    .bind(mark.notes.tajweed_score)
    .fetch_optional(executor)
    .await
}

#[async_trait]
impl AttendanceRepository for PgAttendanceRepository {
    async fn upsert(
        &self,
        teacher: UserId,
        mark: AttendanceMark,
    ) -> Result<Attendance, RepositoryError> {
        upsert_one(&self.pool, teacher, &mark)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn upsert_batch(
        &self,
        teacher: UserId,
        marks: &[AttendanceMark],
    ) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for mark in marks {
            if upsert_one(&mut *tx, teacher, mark).await?.is_none() {
                // Dropping the transaction rolls back earlier rows.
                return Err(RepositoryError::NotFound);
            }
        }

        tx.commit().await?;
        Ok(marks.len())
    }

    async fn list(
        &self,
        teacher: UserId,
        filter: AttendanceFilter,
    ) -> Result<Vec<Attendance>, RepositoryError> {
        let base = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE teacher_id = $1");
        let order = "ORDER BY date DESC, id DESC";

        let rows = match filter {
            AttendanceFilter::All => {
                sqlx::query_as::<_, Attendance>(&format!("{base} {order}"))
                    .bind(teacher)
                    .fetch_all(&self.pool)
                    .await?
            }
            AttendanceFilter::OnDate(date) => {
                sqlx::query_as::<_, Attendance>(&format!("{base} AND date = $2 {order}"))
                    .bind(teacher)
                    .bind(date)
                    .fetch_all(&self.pool)
                    .await?
            }
            AttendanceFilter::ForStudent(student) => {
                sqlx::query_as::<_, Attendance>(&format!("{base} AND student_id = $2 {order}"))
                    .bind(teacher)
                    .bind(student)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows)
    }

    async fn in_range(
        &self,
        teacher: UserId,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<Attendance>, RepositoryError> {
        let rows = sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
             WHERE teacher_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date, id"
        ))
        .bind(teacher)
        .bind(first)
        .bind(last)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Attendance>, RepositoryError> {
        let rows = sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance ORDER BY updated_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
