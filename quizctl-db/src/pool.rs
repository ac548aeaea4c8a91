//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits. Each repository call
//! checks a connection out for its own duration; dropping the guard
//! returns it on every exit path.

use quizctl_core::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::DbError;

/// Build connect options from static configuration.
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user);

    match &config.password {
        Some(password) => options.password(password),
        None => options,
    }
}

/// Create a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns [`DbError::Connection`] if the store is unreachable or rejects
/// the credentials.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&DatabaseConfig::load()?).await?;
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    debug!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        max_connections = config.max_connections,
        "Connecting to database"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options(config))
        .await?;

    info!("Connected to {}:{}/{}", config.host, config.port, config.database);
    Ok(pool)
}

/// Acquire a connection and run a trivial query.
pub async fn ping(pool: &PgPool) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;
    let (one,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(&mut *conn).await?;
    debug!(result = one, "ping");
    Ok(())
}
