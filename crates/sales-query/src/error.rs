use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Failed to query publisher sales: {0}")]
    Storage(#[from] database::DbError),
}
