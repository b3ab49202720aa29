//! CLI command implementations.

pub mod migrate;
pub mod user;

use sqlx::PgPool;
use thiserror::Error;

use iqra_core::EmailError;
use iqra_server::config::{AcademyConfig, ConfigError, StorageBackend};
use iqra_server::db::{self, RepositoryError};
use iqra_server::services::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("commands need IQRA_STORAGE=postgres")]
    NotPostgres,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("invalid password hashing parameters: {0}")]
    PasswordHashing(#[from] argon2::Error),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("no user with email {0}")]
    UserNotFound(String),
}

/// Load the server configuration and connect to its database.
async fn connect() -> Result<(AcademyConfig, PgPool), CliError> {
    let config = AcademyConfig::from_env()?;
    let StorageBackend::Postgres { database_url } = &config.storage else {
        return Err(CliError::NotPostgres);
    };

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;
    Ok((config, pool))
}
