pub mod enums;
pub mod error;
pub mod structs;
pub mod timestamp;

// Re-export the core types to provide a clean public API.
pub use enums::{EntityKind, PublisherFilter};
pub use error::CoreError;
pub use structs::{
    Book, FixtureSet, Publisher, Sale, SaleRecord, Shop, Stock, TableCounts, BOOK_TITLE_MAX_LEN,
    PUBLISHER_NAME_MAX_LEN, SHOP_NAME_MAX_LEN,
};
pub use timestamp::parse_timestamp;
