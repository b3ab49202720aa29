//! Roster storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use iqra_core::{CourseTrack, Email, PaymentStatus, StudentId, UserId, Weekday};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{FeeTotal, NewStudent, Student};

/// Storage operations for roster entries.
///
/// Reads and writes are scoped to the owning teacher; an entry belonging to
/// another teacher behaves exactly like a missing one.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Returns `RepositoryError::Conflict` if an active entry of the teacher
    /// already has this email. Removed entries do not block re-adding.
    async fn create(&self, student: NewStudent) -> Result<Student, RepositoryError>;

    /// Insert unless the teacher already has an entry for this email
    /// (active or not). Returns `None` when nothing was inserted.
    async fn create_if_absent(
        &self,
        student: NewStudent,
    ) -> Result<Option<Student>, RepositoryError>;

    /// An active entry of `teacher`.
    async fn get(
        &self,
        teacher: UserId,
        id: StudentId,
    ) -> Result<Option<Student>, RepositoryError>;

    /// Active entries of `teacher`, by name.
    async fn list_active(&self, teacher: UserId) -> Result<Vec<Student>, RepositoryError>;

    /// Persist every mutable field of `student`.
    ///
    /// `RepositoryError::NotFound` if the entry is gone or inactive,
    /// `RepositoryError::Conflict` if the new email is taken by another active
    /// entry on this roster.
    async fn save(&self, student: &Student) -> Result<Student, RepositoryError>;

    /// Soft-delete. `RepositoryError::NotFound` if no active entry matches.
    async fn deactivate(&self, teacher: UserId, id: StudentId) -> Result<(), RepositoryError>;

    /// Active entries across all teachers.
    async fn count_active(&self) -> Result<i64, RepositoryError>;

    /// Monthly fees of active entries grouped by payment status.
    async fn fee_totals(&self) -> Result<Vec<FeeTotal>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct StudentRow {
    id: StudentId,
    teacher_id: UserId,
    user_id: Option<UserId>,
    name: String,
    email: Email,
    phone: Option<String>,
    age: Option<i32>,
    course: CourseTrack,
    paras_completed: i32,
    current_surah: Option<String>,
    preferred_days: Vec<String>,
    preferred_time: Option<String>,
    monthly_fee: i32,
    payment_status: PaymentStatus,
    notes: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StudentRow> for Student {
    type Error = RepositoryError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        let preferred_days = row
            .preferred_days
            .iter()
            .map(|day| day.parse::<Weekday>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::DataCorruption(format!("student {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            teacher_id: row.teacher_id,
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            age: row.age,
            course: row.course,
            paras_completed: row.paras_completed,
            current_surah: row.current_surah,
            preferred_days,
            preferred_time: row.preferred_time,
            monthly_fee: row.monthly_fee,
            payment_status: row.payment_status,
            notes: row.notes,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn day_names(days: &[Weekday]) -> Vec<String> {
    days.iter().map(|d| d.as_str().to_owned()).collect()
}

const STUDENT_COLUMNS: &str = "id, teacher_id, user_id, name, email, phone, age, course, \
     paras_completed, current_surah, preferred_days, preferred_time, monthly_fee, \
     payment_status, notes, is_active, created_at, updated_at";

const INSERT_STUDENT: &str = r"
    INSERT INTO student (
        teacher_id, user_id, name, email, phone, age, course, paras_completed,
        current_surah, preferred_days, preferred_time, monthly_fee, payment_status, notes
    )
";

const NEW_ROW: &str = "VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)";

/// Inserts nothing if the teacher has ever had this email, removed or not.
const NEW_ROW_IF_NEVER_ON_ROSTER: &str = r"
    SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14
    WHERE NOT EXISTS (SELECT 1 FROM student WHERE teacher_id = $1 AND email = $4)
    ON CONFLICT (teacher_id, email) WHERE is_active DO NOTHING
";

/// `PostgreSQL` roster repository.
pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(
        &self,
        student: &NewStudent,
        source: &str,
    ) -> Result<Option<StudentRow>, sqlx::Error> {
        sqlx::query_as::<_, StudentRow>(&format!(
            "{INSERT_STUDENT} {source} RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(student.teacher_id)
        .bind(student.user_id)
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(student.age)
        .bind(student.course)
        .bind(student.paras_completed)
        .bind(&student.current_surah)
        .bind(day_names(&student.preferred_days))
        .bind(&student.preferred_time)
        .bind(student.monthly_fee)
        .bind(student.payment_status)
        .bind(&student.notes)
        .fetch_optional(&self.pool)
        .await
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn create(&self, student: NewStudent) -> Result<Student, RepositoryError> {
        self.insert(&student, NEW_ROW)
            .await
            .map_err(|e| conflict_on_unique(e, "student with this email already exists"))?
            .ok_or(RepositoryError::NotFound)?
            .try_into()
    }

    async fn create_if_absent(
        &self,
        student: NewStudent,
    ) -> Result<Option<Student>, RepositoryError> {
        self.insert(&student, NEW_ROW_IF_NEVER_ON_ROSTER)
            .await?
            .map(Student::try_from)
            .transpose()
    }

    async fn get(
        &self,
        teacher: UserId,
        id: StudentId,
    ) -> Result<Option<Student>, RepositoryError> {
        sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM student WHERE id = $1 AND teacher_id = $2 AND is_active"
        ))
        .bind(id)
        .bind(teacher)
        .fetch_optional(&self.pool)
        .await?
        .map(Student::try_from)
        .transpose()
    }

    async fn list_active(&self, teacher: UserId) -> Result<Vec<Student>, RepositoryError> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM student WHERE teacher_id = $1 AND is_active \
             ORDER BY name, id"
        ))
        .bind(teacher)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Student::try_from).collect()
    }

    async fn save(&self, student: &Student) -> Result<Student, RepositoryError> {
        sqlx::query_as::<_, StudentRow>(&format!(
            r"
            UPDATE student SET
                name = $3, email = $4, phone = $5, age = $6, course = $7,
                paras_completed = $8, current_surah = $9, preferred_days = $10,
                preferred_time = $11, monthly_fee = $12, payment_status = $13,
                notes = $14, updated_at = NOW()
            WHERE id = $1 AND teacher_id = $2 AND is_active
            RETURNING {STUDENT_COLUMNS}
            "
        ))
        .bind(student.id)
        .bind(student.teacher_id)
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(student.age)
        .bind(student.course)
        .bind(student.paras_completed)
        .bind(&student.current_surah)
        .bind(day_names(&student.preferred_days))
        .bind(&student.preferred_time)
        .bind(student.monthly_fee)
        .bind(student.payment_status)
        .bind(&student.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "student with this email already exists"))?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }

    async fn deactivate(&self, teacher: UserId, id: StudentId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE student SET is_active = FALSE, updated_at = NOW()
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

    async fn count_active(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM student WHERE is_active")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn fee_totals(&self) -> Result<Vec<FeeTotal>, RepositoryError> {
        let rows: Vec<(PaymentStatus, i64, i64)> = sqlx::query_as(
            r"
            SELECT payment_status, COUNT(*), COALESCE(SUM(monthly_fee), 0)::BIGINT
            FROM student
            WHERE is_active
            GROUP BY payment_status
            ORDER BY payment_status
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(payment_status, students, amount)| FeeTotal {
                payment_status,
                students,
                amount,
            })
            .collect())
    }
}
