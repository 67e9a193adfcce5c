use crate::enums::EntityKind;
use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const PUBLISHER_NAME_MAX_LEN: usize = 100;
pub const BOOK_TITLE_MAX_LEN: usize = 200;
pub const SHOP_NAME_MAX_LEN: usize = 100;

// Each entity carries an optional `id`. Fixtures usually pin it so children can
// reference their parents; rows without one get the next id from the store.
// Foreign keys keep their column names (`id_publisher`, ...) on the wire.

/// A book publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(deny_unknown_fields)]
pub struct Publisher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub name: String,
}

/// A title released by exactly one publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(deny_unknown_fields)]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub title: String,
    #[serde(rename = "id_publisher", alias = "publisher_id")]
    #[sqlx(rename = "id_publisher")]
    pub publisher_id: i32,
}

/// A store that stocks and sells books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(deny_unknown_fields)]
pub struct Shop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub name: String,
}

/// How many copies of a book a shop holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(deny_unknown_fields)]
pub struct Stock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(rename = "id_book", alias = "book_id")]
    #[sqlx(rename = "id_book")]
    pub book_id: i32,
    #[serde(rename = "id_shop", alias = "shop_id")]
    #[sqlx(rename = "id_shop")]
    pub shop_id: i32,
    pub count: i32,
}

/// A single sale drawn from a stock row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(deny_unknown_fields)]
pub struct Sale {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub price: i32,
    /// `None` (key absent) means "stamp with the insertion time".
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub date_sale: Option<NaiveDateTime>,
    #[serde(rename = "id_stock", alias = "stock_id")]
    #[sqlx(rename = "id_stock")]
    pub stock_id: i32,
    pub count: i32,
}

/// Everything parsed from one fixture directory, ready to insert.
///
/// A fixture file that failed to load leaves its vector empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSet {
    pub publishers: Vec<Publisher>,
    pub books: Vec<Book>,
    pub shops: Vec<Shop>,
    pub stocks: Vec<Stock>,
    pub sales: Vec<Sale>,
}

impl FixtureSet {
    /// Number of queued rows for one entity kind.
    pub fn len_of(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Publisher => self.publishers.len(),
            EntityKind::Book => self.books.len(),
            EntityKind::Shop => self.shops.len(),
            EntityKind::Stock => self.stocks.len(),
            EntityKind::Sale => self.sales.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::LOAD_ORDER
            .iter()
            .all(|kind| self.len_of(*kind) == 0)
    }
}

/// Row counts of all five tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub publisher: i64,
    pub book: i64,
    pub shop: i64,
    pub stock: i64,
    pub sale: i64,
}

impl TableCounts {
    pub fn get(&self, kind: EntityKind) -> i64 {
        match kind {
            EntityKind::Publisher => self.publisher,
            EntityKind::Book => self.book,
            EntityKind::Shop => self.shop,
            EntityKind::Stock => self.stock,
            EntityKind::Sale => self.sale,
        }
    }

    pub fn set(&mut self, kind: EntityKind, count: i64) {
        match kind {
            EntityKind::Publisher => self.publisher = count,
            EntityKind::Book => self.book = count,
            EntityKind::Shop => self.shop = count,
            EntityKind::Stock => self.stock = count,
            EntityKind::Sale => self.sale = count,
        }
    }
}

/// One row of the publisher sales join: which book sold where, for how much, and when.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, FromRow)]
pub struct SaleRecord {
    pub title: String,
    pub shop: String,
    pub price: i32,
    pub date_sale: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn book_reads_fixture_key_names() {
        let book: Book =
            serde_json::from_str(r#"{"id": 3, "title": "Physics", "id_publisher": 1}"#).unwrap();
        assert_eq!(
            book,
            Book { id: Some(3), title: "Physics".to_string(), publisher_id: 1 }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = serde_json::from_str::<Shop>(r#"{"name": "Central", "city": "Moscow"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn sale_date_is_coerced_from_iso_string() {
        let sale: Sale = serde_json::from_str(
            r#"{"id": 1, "price": 300, "date_sale": "2024-03-01T00:00:00", "id_stock": 1, "count": 1}"#,
        )
        .unwrap();
        assert_eq!(
            sale.date_sale,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn sale_date_may_be_omitted() {
        let sale: Sale =
            serde_json::from_str(r#"{"price": 120, "id_stock": 2, "count": 3}"#).unwrap();
        assert_eq!(sale.id, None);
        assert_eq!(sale.date_sale, None);
    }

    #[test]
    fn null_sale_date_fails_the_document() {
        let result = serde_json::from_str::<Vec<Sale>>(
            r#"[{"price": 1, "date_sale": null, "id_stock": 1, "count": 1}]"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn malformed_sale_date_fails_the_document() {
        let result = serde_json::from_str::<Vec<Sale>>(
            r#"[{"price": 1, "date_sale": "01/03/2024", "id_stock": 1, "count": 1}]"#,
        );
        assert!(result.unwrap_err().to_string().contains("Invalid ISO-8601"));
    }

    #[test]
    fn table_counts_are_addressable_by_kind() {
        let mut counts = TableCounts::default();
        counts.set(EntityKind::Stock, 4);
        assert_eq!(counts.get(EntityKind::Stock), 4);
        assert_eq!(counts.stock, 4);
        assert_eq!(counts.get(EntityKind::Sale), 0);
    }
}
