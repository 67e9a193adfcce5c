pub mod error;
pub mod report;

pub use error::QueryError;
pub use report::{DATE_PLACEHOLDER, NO_SALES_MESSAGE, format_sale, render_report};

use core_types::{PublisherFilter, SaleRecord};
use database::Inventory;

/// Sales of every book from the publisher(s) named by `identifier`.
///
/// A numeric identifier is always a publisher id; anything else is matched
/// case-insensitively as a substring of publisher names. No match is an empty
/// result, not an error.
pub async fn query_publisher_sales<S: Inventory>(
    store: &S,
    identifier: &str,
) -> Result<Vec<SaleRecord>, QueryError> {
    let filter = PublisherFilter::from_input(identifier);
    tracing::info!(?filter, "Querying publisher sales.");

    let records = store.publisher_sales(&filter).await?;
    if records.is_empty() {
        tracing::info!(?filter, "No sales matched.");
    }
    Ok(records)
}
