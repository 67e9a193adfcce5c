use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid ISO-8601 timestamp: {0:?}")]
    InvalidTimestamp(String),
}
