use crate::error::DbError;
use crate::store::Inventory;
use chrono::Utc;
use core_types::{
    BOOK_TITLE_MAX_LEN, Book, FixtureSet, PUBLISHER_NAME_MAX_LEN, Publisher, PublisherFilter,
    SHOP_NAME_MAX_LEN, Sale, SaleRecord, Shop, Stock, TableCounts,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An in-process store holding each table as an id → row index.
///
/// It enforces the same rules the SQL schema does: foreign keys must point at
/// existing rows, ids are unique, and names respect their length caps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    publishers: BTreeMap<i32, Publisher>,
    books: BTreeMap<i32, Book>,
    shops: BTreeMap<i32, Shop>,
    stocks: BTreeMap<i32, Stock>,
    sales: BTreeMap<i32, Sale>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // The tables are only swapped whole, so a poisoned guard still holds a valid state.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Picks the explicit id or `MAX(id) + 1`, rejecting duplicates and overflow.
fn assign_id<T>(table: &BTreeMap<i32, T>, wanted: Option<i32>, entity: &str) -> Result<i32, DbError> {
    match wanted {
        Some(id) if table.contains_key(&id) => Err(DbError::ConstraintViolation(format!(
            "duplicate key: {entity} with id {id} already exists"
        ))),
        Some(id) => Ok(id),
        None => match table.keys().next_back() {
            None => Ok(1),
            Some(last) => last.checked_add(1).ok_or_else(|| {
                DbError::ConstraintViolation(format!("{entity} id out of range after {last}"))
            }),
        },
    }
}

fn check_length(value: &str, max: usize, column: &str) -> Result<(), DbError> {
    if value.chars().count() > max {
        return Err(DbError::ConstraintViolation(format!(
            "value too long for {column} (max {max} characters)"
        )));
    }
    Ok(())
}

fn check_reference<T>(table: &BTreeMap<i32, T>, id: i32, column: &str, parent: &str) -> Result<(), DbError> {
    if !table.contains_key(&id) {
        return Err(DbError::ConstraintViolation(format!(
            "{column} = {id} is not present in table \"{parent}\""
        )));
    }
    Ok(())
}

impl Tables {
    fn insert_all(&mut self, fixtures: &FixtureSet) -> Result<(), DbError> {
        for publisher in &fixtures.publishers {
            check_length(&publisher.name, PUBLISHER_NAME_MAX_LEN, "publisher.name")?;
            let id = assign_id(&self.publishers, publisher.id, "publisher")?;
            self.publishers
                .insert(id, Publisher { id: Some(id), ..publisher.clone() });
        }

        for book in &fixtures.books {
            check_length(&book.title, BOOK_TITLE_MAX_LEN, "book.title")?;
            check_reference(&self.publishers, book.publisher_id, "id_publisher", "publisher")?;
            let id = assign_id(&self.books, book.id, "book")?;
            self.books.insert(id, Book { id: Some(id), ..book.clone() });
        }

        for shop in &fixtures.shops {
            check_length(&shop.name, SHOP_NAME_MAX_LEN, "shop.name")?;
            let id = assign_id(&self.shops, shop.id, "shop")?;
            self.shops.insert(id, Shop { id: Some(id), ..shop.clone() });
        }

        for stock in &fixtures.stocks {
            check_reference(&self.books, stock.book_id, "id_book", "book")?;
            check_reference(&self.shops, stock.shop_id, "id_shop", "shop")?;
            let id = assign_id(&self.stocks, stock.id, "stock")?;
            self.stocks.insert(id, Stock { id: Some(id), ..stock.clone() });
        }

        for sale in &fixtures.sales {
            check_reference(&self.stocks, sale.stock_id, "id_stock", "stock")?;
            let id = assign_id(&self.sales, sale.id, "sale")?;
            let date_sale = sale.date_sale.or_else(|| Some(Utc::now().naive_utc()));
            self.sales.insert(
                id,
                Sale { id: Some(id), date_sale, ..sale.clone() },
            );
        }

        Ok(())
    }

    fn join_sales(&self, filter: &PublisherFilter) -> Vec<SaleRecord> {
        self.sales
            .values()
            .filter_map(|sale| {
                let stock = self.stocks.get(&sale.stock_id)?;
                let book = self.books.get(&stock.book_id)?;
                let publisher = self.publishers.get(&book.publisher_id)?;
                let shop = self.shops.get(&stock.shop_id)?;

                let publisher_id = publisher.id.unwrap_or(book.publisher_id);
                if !filter.matches(publisher_id, &publisher.name) {
                    return None;
                }

                Some(SaleRecord {
                    title: book.title.clone(),
                    shop: shop.name.clone(),
                    price: sale.price,
                    date_sale: sale.date_sale,
                })
            })
            .collect()
    }
}

impl Inventory for MemoryStore {
    async fn clear_all(&self) -> Result<(), DbError> {
        *self.lock() = Tables::default();
        tracing::info!("All in-memory tables cleared.");
        Ok(())
    }

    async fn insert_fixtures(&self, fixtures: &FixtureSet) -> Result<(), DbError> {
        let mut tables = self.lock();
        // Work on a copy so a failed insert leaves nothing behind.
        let mut staged = tables.clone();
        staged.insert_all(fixtures)?;
        *tables = staged;
        Ok(())
    }

    async fn table_counts(&self) -> Result<TableCounts, DbError> {
        let tables = self.lock();
        Ok(TableCounts {
            publisher: tables.publishers.len() as i64,
            book: tables.books.len() as i64,
            shop: tables.shops.len() as i64,
            stock: tables.stocks.len() as i64,
            sale: tables.sales.len() as i64,
        })
    }

    async fn publisher_sales(&self, filter: &PublisherFilter) -> Result<Vec<SaleRecord>, DbError> {
        Ok(self.lock().join_sales(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(id: i32, name: &str) -> Publisher {
        Publisher { id: Some(id), name: name.to_string() }
    }

    fn book(id: i32, title: &str, publisher_id: i32) -> Book {
        Book { id: Some(id), title: title.to_string(), publisher_id }
    }

    fn shop(id: i32, name: &str) -> Shop {
        Shop { id: Some(id), name: name.to_string() }
    }

    fn stock(id: i32, book_id: i32, shop_id: i32) -> Stock {
        Stock { id: Some(id), book_id, shop_id, count: 10 }
    }

    fn sale(id: i32, price: i32, stock_id: i32) -> Sale {
        Sale { id: Some(id), price, date_sale: None, stock_id, count: 1 }
    }

    #[tokio::test]
    async fn insert_then_count() {
        let store = MemoryStore::new();
        let fixtures = FixtureSet {
            publishers: vec![publisher(1, "Nauka")],
            books: vec![book(1, "Physics", 1)],
            shops: vec![shop(1, "Central")],
            stocks: vec![stock(1, 1, 1)],
            sales: vec![sale(1, 300, 1), sale(2, 310, 1)],
        };
        store.insert_fixtures(&fixtures).await.unwrap();

        let counts = store.table_counts().await.unwrap();
        assert_eq!(counts, TableCounts { publisher: 1, book: 1, shop: 1, stock: 1, sale: 2 });
    }

    #[tokio::test]
    async fn dangling_foreign_key_rolls_back_everything() {
        let store = MemoryStore::new();
        let fixtures = FixtureSet {
            publishers: vec![publisher(1, "Nauka")],
            books: vec![book(1, "Physics", 7)],
            ..FixtureSet::default()
        };

        let err = store.insert_fixtures(&fixtures).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(ref msg) if msg.contains("id_publisher")));
        assert_eq!(store.table_counts().await.unwrap(), TableCounts::default());
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = MemoryStore::new();
        let fixtures = FixtureSet {
            shops: vec![shop(1, "Central"), shop(1, "North")],
            ..FixtureSet::default()
        };
        assert!(store.insert_fixtures(&fixtures).await.is_err());
    }

    #[tokio::test]
    async fn missing_ids_are_assigned_after_the_highest() {
        let store = MemoryStore::new();
        let fixtures = FixtureSet {
            publishers: vec![
                publisher(4, "Nauka"),
                Publisher { id: None, name: "Piter".to_string() },
            ],
            ..FixtureSet::default()
        };
        store.insert_fixtures(&fixtures).await.unwrap();

        let ids = store.lock().publishers.keys().copied().collect::<Vec<_>>();
        assert_eq!(ids, vec![4, 5]);
    }

    #[tokio::test]
    async fn next_id_after_i32_max_is_a_constraint_violation() {
        let store = MemoryStore::new();
        let fixtures = FixtureSet {
            publishers: vec![
                publisher(i32::MAX, "Nauka"),
                Publisher { id: None, name: "Piter".to_string() },
            ],
            ..FixtureSet::default()
        };

        let err = store.insert_fixtures(&fixtures).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(ref msg) if msg.contains("out of range")));
        assert_eq!(store.table_counts().await.unwrap(), TableCounts::default());
    }

    #[tokio::test]
    async fn explicit_id_after_an_assigned_one_collides() {
        let store = MemoryStore::new();
        let fixtures = FixtureSet {
            shops: vec![
                shop(1, "Central"),
                Shop { id: None, name: "North".to_string() },
                shop(2, "Dom Knigi"),
            ],
            ..FixtureSet::default()
        };

        let err = store.insert_fixtures(&fixtures).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(ref msg) if msg.contains("duplicate key")));
    }

    #[tokio::test]
    async fn overlong_title_is_rejected() {
        let store = MemoryStore::new();
        let fixtures = FixtureSet {
            publishers: vec![publisher(1, "Nauka")],
            books: vec![book(1, &"x".repeat(BOOK_TITLE_MAX_LEN + 1), 1)],
            ..FixtureSet::default()
        };
        assert!(store.insert_fixtures(&fixtures).await.is_err());
    }

    #[tokio::test]
    async fn undated_sale_is_stamped_on_insert() {
        let store = MemoryStore::new();
        let fixtures = FixtureSet {
            publishers: vec![publisher(1, "Nauka")],
            books: vec![book(1, "Physics", 1)],
            shops: vec![shop(1, "Central")],
            stocks: vec![stock(1, 1, 1)],
            sales: vec![sale(1, 300, 1)],
        };
        store.insert_fixtures(&fixtures).await.unwrap();

        let records = store.publisher_sales(&PublisherFilter::Id(1)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].date_sale.is_some());
    }

    #[tokio::test]
    async fn clear_all_empties_every_table() {
        let store = MemoryStore::new();
        let fixtures = FixtureSet {
            publishers: vec![publisher(1, "Nauka")],
            shops: vec![shop(1, "Central")],
            ..FixtureSet::default()
        };
        store.insert_fixtures(&fixtures).await.unwrap();
        store.clear_all().await.unwrap();
        assert_eq!(store.table_counts().await.unwrap(), TableCounts::default());
    }
}
