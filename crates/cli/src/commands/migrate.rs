//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! osync migrate
//!
//! # Show applied and pending migrations
//! osync migrate --status
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_SYNC_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/app/migrations/` and are embedded at build time.

use std::collections::HashSet;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;

static MIGRATOR: Migrator = sqlx::migrate!("../app/migrations");

/// Errors from migration commands.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

fn database_url() -> Result<SecretString, MigrationError> {
    dotenvy::dotenv().ok();

    std::env::var("ORDER_SYNC_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("ORDER_SYNC_DATABASE_URL"))
}

async fn connect() -> Result<PgPool, MigrationError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!(count = MIGRATOR.iter().count(), "Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    pool.close().await;
    Ok(())
}

/// Log each known migration as applied or pending.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable.
pub async fn status() -> Result<(), MigrationError> {
    let pool = connect().await?;

    let has_table: bool =
        sqlx::query_scalar::<_, bool>("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(&pool)
            .await?;

    let applied: HashSet<i64> = if has_table {
        sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(&pool)
            .await?
            .into_iter()
            .collect()
    } else {
        HashSet::new()
    };

    for migration in MIGRATOR.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            state,
            "Migration"
        );
    }

    pool.close().await;
    Ok(())
}
