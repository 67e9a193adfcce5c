use sqlx::error::ErrorKind;
use thiserror::Error;

/// Postgres `string_data_right_truncation`, raised when a value exceeds a VARCHAR cap.
const STRING_TOO_LONG: &str = "22001";
/// Postgres `numeric_value_out_of_range`, raised when a computed id overflows `integer`.
const OUT_OF_RANGE: &str = "22003";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to connect to the database: {0}")]
    ConnectionError(#[source] sqlx::Error),

    #[error("Database query failed: {0}")]
    QueryError(#[source] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            let code = db_err.code();
            let bad_value = matches!(code.as_deref(), Some(STRING_TOO_LONG | OUT_OF_RANGE));
            let violated = matches!(
                db_err.kind(),
                ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::UniqueViolation
                    | ErrorKind::CheckViolation
            );
            if bad_value || violated {
                return DbError::ConstraintViolation(db_err.message().to_string());
            }
        }
        DbError::QueryError(e)
    }
}
