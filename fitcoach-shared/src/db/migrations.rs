/// Schema migrations
///
/// Migration files live in the workspace `migrations/` directory and are
/// embedded into the binary at compile time with `sqlx::migrate!`, so a
/// deployed server never reads SQL from disk.
///
/// # Example
///
/// ```no_run
/// use fitcoach_shared::db::migrations::{migration_status, run_migrations};
/// use fitcoach_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// run_migrations(&pool).await?;
/// let status = migration_status(&pool).await?;
/// assert!(status.is_up_to_date);
/// # Ok(())
/// # }
/// ```

use sqlx::migrate::{MigrateDatabase, Migrator};
use sqlx::postgres::PgPool;
use sqlx::Postgres;
use tracing::{debug, info, warn};

/// Embedded migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Snapshot of applied migrations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Successfully applied migrations
    pub applied_migrations: usize,

    /// Migrations embedded in this build
    pub known_migrations: usize,

    /// Highest applied version
    pub latest_version: Option<i64>,

    /// Every embedded migration has been applied
    pub is_up_to_date: bool,
}

/// Applies all pending migrations
///
/// # Errors
///
/// Returns the first migration failure; sqlx rolls that migration back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!(known = MIGRATOR.iter().count(), "Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        warn!(error = %e, "Migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Reports how far the database schema has been migrated
pub async fn migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let known_migrations = MIGRATOR.iter().count();

    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            known_migrations,
            latest_version: None,
            is_up_to_date: known_migrations == 0,
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    Ok(status_from_counts(count as usize, known_migrations, latest_version))
}

fn status_from_counts(
    applied_migrations: usize,
    known_migrations: usize,
    latest_version: Option<i64>,
) -> MigrationStatus {
    MigrationStatus {
        applied_migrations,
        known_migrations,
        latest_version,
        is_up_to_date: applied_migrations >= known_migrations,
    }
}

/// Creates the database named in `database_url` if it does not exist
///
/// Intended for development and test setups.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
