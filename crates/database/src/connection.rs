use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Opens the single connection a command works through.
///
/// The pool is capped at one connection: every command runs its statements
/// one after another, so a second connection would never be used.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    tracing::info!(url = %settings.redacted_url(), "Connecting to the database.");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&settings.connection_url())
        .await
        .map_err(DbError::ConnectionError)?;

    Ok(pool)
}

/// Creates the bookstore tables if they are missing.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
