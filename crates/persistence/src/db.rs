//! Datastore creation and schema migration.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./src/migrations");

/// Errors raised while preparing the datastore.
#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error("Unsupported datastore dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Failed to connect to datastore: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// SQL dialects the persistence layer can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
}

impl FromStr for Dialect {
    type Err = DatastoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            other => Err(DatastoreError::UnsupportedDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgres"),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub dialect: String,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
    }
}

/// Creates a connection pool for the configured dialect.
pub async fn create_datastore(config: &DatabaseConfig) -> Result<PgPool, DatastoreError> {
    let dialect: Dialect = config.dialect.parse()?;
    tracing::info!(dialect = %dialect, "Creating datastore");

    let pool = config.pool_options().connect(&config.url).await?;
    Ok(pool)
}

/// Creates a pool that connects on first use.
///
/// Fails only on a malformed URL or unsupported dialect.
pub fn create_lazy_datastore(config: &DatabaseConfig) -> Result<PgPool, DatastoreError> {
    let _: Dialect = config.dialect.parse()?;
    Ok(config.pool_options().connect_lazy(&config.url)?)
}

/// Brings the schema up to date for every persisted record type.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatastoreError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Successfully run all migrations");
    Ok(())
}
