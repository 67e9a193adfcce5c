use crate::error::DbError;
use core_types::{FixtureSet, PublisherFilter, SaleRecord, TableCounts};

/// The storage operations the loader and the sales query need.
///
/// Implemented by [`crate::DbRepository`] for PostgreSQL and by
/// [`crate::MemoryStore`], which keeps id-indexed tables in process.
#[allow(async_fn_in_trait)]
pub trait Inventory {
    /// Deletes every row, children before parents, and commits.
    async fn clear_all(&self) -> Result<(), DbError>;

    /// Inserts a whole fixture set in one transaction, parents before children.
    ///
    /// Any constraint violation rolls back the entire set.
    async fn insert_fixtures(&self, fixtures: &FixtureSet) -> Result<(), DbError>;

    async fn table_counts(&self) -> Result<TableCounts, DbError>;

    /// Every sale of a book from a matching publisher, joined with its shop.
    ///
    /// Inner-join semantics: stock without sales and books without stock yield nothing.
    /// Row order is unspecified.
    async fn publisher_sales(&self, filter: &PublisherFilter) -> Result<Vec<SaleRecord>, DbError>;
}
