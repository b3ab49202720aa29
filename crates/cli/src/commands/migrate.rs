//! Database migrations.
//!
//! Applies the academy schema from `crates/server/migrations/`, then the
//! session-store table used by `tower-sessions`.

use tower_sessions_sqlx_store::PostgresStore;

use iqra_server::db;

use super::{CliError, connect};

/// Run all migrations against `IQRA_DATABASE_URL`.
pub async fn run() -> Result<(), CliError> {
    let (_, pool) = connect().await?;

    tracing::info!("Running schema migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Running session store migrations...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete");
    Ok(())
}
