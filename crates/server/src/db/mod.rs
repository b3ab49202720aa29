//! Storage for academy records.
//!
//! Every entity has a repository trait with two implementations:
//!
//! - `Pg*Repository` - `PostgreSQL` via sqlx, used by every deployment
//! - [`memory::MemoryStore`] - process memory, used by tests and local demos
//!
//! Both honour the same contracts: unique (teacher, email) roster entries,
//! unique (email, course) registrations, attendance upserts on
//! (student, teacher, date), and all-or-nothing bulk attendance.
//!
//! # Tables
//!
//! - `app_user` - Accounts (students, teachers, admins)
//! - `student` - Teacher rosters
//! - `schedule` - Weekly class slots
//! - `attendance` - Daily marks
//! - `course_registration` - Public registrations
//! - `tower_sessions.session` - Session store (created by tower-sessions)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p iqra-cli -- migrate
//! ```

pub mod attendance;
pub mod memory;
pub mod registrations;
pub mod schedules;
pub mod students;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use attendance::{AttendanceRepository, PgAttendanceRepository};
pub use memory::MemoryStore;
pub use registrations::{PgRegistrationRepository, RegistrationRepository};
pub use schedules::{PgScheduleRepository, ScheduleRepository};
pub use students::{PgStudentRepository, StudentRepository};
pub use users::{PgUserRepository, UserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-violation to `Conflict`, everything else to `Database`.
fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(what.to_owned());
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the academy schema migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// The full set of repositories behind one storage backend.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pool: Option<PgPool>,
}

impl Repositories {
    /// Repositories backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            students: Arc::new(PgStudentRepository::new(pool.clone())),
            attendance: Arc::new(PgAttendanceRepository::new(pool.clone())),
            schedules: Arc::new(PgScheduleRepository::new(pool.clone())),
            registrations: Arc::new(PgRegistrationRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Repositories sharing one fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_memory(MemoryStore::default())
    }

    /// Repositories over an existing in-memory store.
    #[must_use]
    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            students: Arc::new(store.clone()),
            attendance: Arc::new(store.clone()),
            schedules: Arc::new(store.clone()),
            registrations: Arc::new(store),
            pool: None,
        }
    }

    /// The `PostgreSQL` pool, when that is the backend.
    #[must_use]
    pub const fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Check that the backend can serve queries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if `PostgreSQL` is unreachable.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
