//! # Database Persistence Layer
//!
//! Postgres access via SQLx. [`init_pool`] connects and applies the embedded
//! migrations in `./migrations`; [`users::PgUserRepository`] implements the
//! persistence contract from `cruder-core` on top of the resulting pool.
//!
//! The schema needs PostgreSQL 13 or later and no extensions, so the
//! configured role only needs rights on its own tables.
//!
//! Nothing in this module logs request-level outcomes. Failures are returned
//! to the caller and surface through the request logger.

pub mod users;

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

use crate::config::{ConfigError, DatabaseConfig};

pub use users::PgUserRepository;

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors raised while bringing the database up.
#[derive(Error, Debug)]
pub enum DbInitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database connection failed: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Connect to Postgres and run migrations.
pub async fn init_pool(config: &DatabaseConfig) -> Result<PgPool, DbInitError> {
    let options = config.connect_options()?;

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    MIGRATOR.run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
