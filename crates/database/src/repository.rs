use crate::error::DbError;
use crate::store::Inventory;
use core_types::{
    Book, EntityKind, FixtureSet, Publisher, PublisherFilter, Sale, SaleRecord, Shop, Stock,
    TableCounts,
};
use sqlx::postgres::{PgPool, Postgres};
use sqlx::{PgConnection, Transaction};

/// The five-way join behind the publisher sales report. The filter is appended per call.
const PUBLISHER_SALES_SQL: &str = r#"
    SELECT
        b.title AS title,
        sh.name AS shop,
        s.price AS price,
        s.date_sale AS date_sale
    FROM
        book AS b
    JOIN
        publisher AS p ON b.id_publisher = p.id
    JOIN
        stock AS st ON st.id_book = b.id
    JOIN
        shop AS sh ON st.id_shop = sh.id
    JOIN
        sale AS s ON s.id_stock = st.id
"#;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the bookstore tables. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` over an open connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Closes the underlying connection. The repository is unusable afterwards.
    pub async fn close(self) {
        self.pool.close().await;
    }

    // Rows without an id take `MAX(id) + 1` of their table, as seen inside the
    // load transaction. An id past `i32::MAX` fails with `22003`.

    async fn insert_publisher(conn: &mut PgConnection, publisher: &Publisher) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO publisher (id, name)
            VALUES (COALESCE($1, (SELECT COALESCE(MAX(id), 0) + 1 FROM publisher)), $2)
            "#,
        )
        .bind(publisher.id)
        .bind(&publisher.name)
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn insert_book(conn: &mut PgConnection, book: &Book) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO book (id, title, id_publisher)
            VALUES (COALESCE($1, (SELECT COALESCE(MAX(id), 0) + 1 FROM book)), $2, $3)
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(book.publisher_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn insert_shop(conn: &mut PgConnection, shop: &Shop) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO shop (id, name)
            VALUES (COALESCE($1, (SELECT COALESCE(MAX(id), 0) + 1 FROM shop)), $2)
            "#,
        )
        .bind(shop.id)
        .bind(&shop.name)
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn insert_stock(conn: &mut PgConnection, stock: &Stock) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO stock (id, id_book, id_shop, count)
            VALUES (COALESCE($1, (SELECT COALESCE(MAX(id), 0) + 1 FROM stock)), $2, $3, $4)
            "#,
        )
        .bind(stock.id)
        .bind(stock.book_id)
        .bind(stock.shop_id)
        .bind(stock.count)
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn insert_sale(conn: &mut PgConnection, sale: &Sale) -> Result<(), DbError> {
        // A missing date takes the same UTC "now" as the column default.
        sqlx::query(
            r#"
            INSERT INTO sale (id, price, date_sale, id_stock, count)
            VALUES (
                COALESCE($1, (SELECT COALESCE(MAX(id), 0) + 1 FROM sale)),
                $2,
                COALESCE($3, NOW() AT TIME ZONE 'utc'),
                $4,
                $5
            )
            "#,
        )
        .bind(sale.id)
        .bind(sale.price)
        .bind(sale.date_sale)
        .bind(sale.stock_id)
        .bind(sale.count)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Moves each id sequence past the largest stored id, so rows inserted with
    /// explicit fixture ids never collide with later auto-assigned ones.
    async fn sync_id_sequences(tx: &mut Transaction<'_, Postgres>) -> Result<(), DbError> {
        for kind in EntityKind::LOAD_ORDER {
            let table = kind.table_name();
            let sql = format!(
                "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
                 COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)"
            );
            sqlx::query(&sql).execute(&mut **tx).await?;
        }
        Ok(())
    }
}

impl Inventory for DbRepository {
    async fn clear_all(&self) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        for kind in EntityKind::DELETE_ORDER {
            let sql = format!("DELETE FROM {}", kind.table_name());
            let deleted = sqlx::query(&sql).execute(&mut *tx).await?.rows_affected();
            tracing::debug!(table = %kind, deleted, "Cleared table.");
        }

        tx.commit().await?;
        tracing::info!("All bookstore tables cleared.");
        Ok(())
    }

    async fn insert_fixtures(&self, fixtures: &FixtureSet) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        // Note: every insert must go through the transaction `tx`, not the pool.
        for publisher in &fixtures.publishers {
            Self::insert_publisher(&mut tx, publisher).await?;
        }
        for book in &fixtures.books {
            Self::insert_book(&mut tx, book).await?;
        }
        for shop in &fixtures.shops {
            Self::insert_shop(&mut tx, shop).await?;
        }
        for stock in &fixtures.stocks {
            Self::insert_stock(&mut tx, stock).await?;
        }
        for sale in &fixtures.sales {
            Self::insert_sale(&mut tx, sale).await?;
        }
        Self::sync_id_sequences(&mut tx).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn table_counts(&self) -> Result<TableCounts, DbError> {
        let mut counts = TableCounts::default();
        for kind in EntityKind::LOAD_ORDER {
            let sql = format!("SELECT COUNT(*) FROM {}", kind.table_name());
            let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
            counts.set(kind, count);
        }
        Ok(counts)
    }

    async fn publisher_sales(&self, filter: &PublisherFilter) -> Result<Vec<SaleRecord>, DbError> {
        let records = match filter {
            PublisherFilter::Id(id) => {
                let sql = format!("{PUBLISHER_SALES_SQL} WHERE p.id = $1");
                sqlx::query_as::<_, SaleRecord>(&sql)
                    .bind(*id)
                    .fetch_all(&self.pool)
                    .await?
            }
            PublisherFilter::Name(fragment) => {
                // STRPOS instead of ILIKE so `%` and `_` in the input match literally.
                let sql = format!("{PUBLISHER_SALES_SQL} WHERE STRPOS(LOWER(p.name), LOWER($1)) > 0");
                sqlx::query_as::<_, SaleRecord>(&sql)
                    .bind(fragment.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        tracing::debug!(?filter, rows = records.len(), "Publisher sales fetched.");
        Ok(records)
    }
}
