//! # Product Repository
//!
//! Database operations for the Catalog Store.
//!
//! ## Key Operations
//! - CRUD scoped by owner
//! - Natural-key lookup by trimmed name (bulk intake, reversal)
//! - Optimistic-lock stock mutation for sale commits
//!
//! ## Revision-Checked Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 Stock Update Strategy                               │
//! │                                                                     │
//! │  Sale commits read a product, compute the new quantity, and write   │
//! │  it back ONLY if the revision is unchanged:                         │
//! │                                                                     │
//! │    UPDATE products SET quantity = ?, revision = revision + 1        │
//! │    WHERE id = ? AND revision = ?                                    │
//! │                                                                     │
//! │  Zero rows affected means another commit won the race. The losing   │
//! │  transaction rolls back entirely and the caller retries, so stock   │
//! │  can never be sold twice or driven negative.                        │
//! │                                                                     │
//! │  Manual corrections and intake increments use unconditional delta   │
//! │  updates instead: they are commutative, so last-write-wins is fine. │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockbook_core::Product;

/// Columns selected for every Product read, in FromRow order.
const PRODUCT_COLUMNS: &str = "id, owner_id, name, buy_price_cents, sell_price_cents, \
     quantity, revision, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.get_by_id("owner-1", "uuid-here").await?;
/// let by_name = repo.find_by_name("owner-1", "Widget").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found for this owner
    pub async fn get_by_id(&self, owner_id: &str, id: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE owner_id = ?1 AND id = ?2"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Looks a product up by its natural key: the exact trimmed name.
    ///
    /// ## The Natural-Key Seam
    /// This is the ONLY place name-based matching happens. Bulk intake
    /// merging and sale reversal both resolve products through this lookup,
    /// so switching to id-based matching later touches no caller.
    ///
    /// Matching is case-sensitive; `UNIQUE (owner_id, name)` guarantees at
    /// most one hit.
    pub async fn find_by_name(&self, owner_id: &str, name: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_name_in(&mut *conn, owner_id, name).await
    }

    /// Lists all products for an owner, sorted by name.
    pub async fn list(&self, owner_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE owner_id = ?1 ORDER BY name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - Name already taken for this owner
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(owner_id = %product.owner_id, name = %product.name, "Inserting product");

        let mut conn = self.pool.acquire().await?;
        Self::insert_in(&mut *conn, product).await
    }

    /// Updates both prices of a product.
    ///
    /// Cart lines snapshot prices at add time, so edits made here do not
    /// affect carts until a line is removed and re-added.
    pub async fn update_prices(
        &self,
        owner_id: &str,
        id: &str,
        buy_price_cents: i64,
        sell_price_cents: i64,
    ) -> DbResult<()> {
        debug!(id = %id, buy = %buy_price_cents, sell = %sell_price_cents, "Updating prices");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                buy_price_cents = ?3,
                sell_price_cents = ?4,
                updated_at = ?5,
                revision = revision + 1
            WHERE owner_id = ?1 AND id = ?2
            "#,
        )
        .bind(owner_id)
        .bind(id)
        .bind(buy_price_cents)
        .bind(sell_price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Adjusts product stock by a delta, clamped at zero.
    ///
    /// ## Usage
    /// Manual stock-in/stock-out/correction from the stock views. The clamp
    /// means an over-large correction lands on zero instead of failing; sale
    /// decrements do NOT use this path (they are revision-checked and never
    /// clamp).
    ///
    /// ## Returns
    /// The product after the adjustment.
    pub async fn adjust_quantity(&self, owner_id: &str, id: &str, delta: i64) -> DbResult<Product> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                quantity = MAX(0, quantity + ?3),
                updated_at = ?4,
                revision = revision + 1
            WHERE owner_id = ?1 AND id = ?2
            "#,
        )
        .bind(owner_id)
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(owner_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product entirely.
    pub async fn delete(&self, owner_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE owner_id = ?1 AND id = ?2")
            .bind(owner_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products for an owner (for diagnostics).
    pub async fn count(&self, owner_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE owner_id = ?1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Transaction Helpers
    // =========================================================================
    // Building blocks for LedgerService transactions. Each takes the open
    // connection of the enclosing transaction.

    /// Fetches a product by ID inside a transaction.
    pub async fn fetch_by_id_in(
        conn: &mut SqliteConnection,
        owner_id: &str,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE owner_id = ?1 AND id = ?2"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(product)
    }

    /// Natural-key lookup inside a transaction. See [`Self::find_by_name`].
    pub async fn find_by_name_in(
        conn: &mut SqliteConnection,
        owner_id: &str,
        name: &str,
    ) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE owner_id = ?1 AND name = ?2"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(owner_id)
            .bind(name.trim())
            .fetch_optional(conn)
            .await?;

        Ok(product)
    }

    /// Inserts a product inside a transaction.
    pub async fn insert_in(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, owner_id, name,
                buy_price_cents, sell_price_cents, quantity,
                revision, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.owner_id)
        .bind(&product.name)
        .bind(product.buy_price_cents)
        .bind(product.sell_price_cents)
        .bind(product.quantity)
        .bind(product.revision)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Sets a product's quantity, compare-and-swap on its revision.
    ///
    /// ## Errors
    /// * `DbError::StaleRevision` - the row changed since it was read;
    ///   the enclosing transaction must abort
    pub async fn set_quantity_in(
        conn: &mut SqliteConnection,
        owner_id: &str,
        id: &str,
        new_quantity: i64,
        expected_revision: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                quantity = ?4,
                updated_at = ?5,
                revision = revision + 1
            WHERE owner_id = ?1 AND id = ?2 AND revision = ?3
            "#,
        )
        .bind(owner_id)
        .bind(id)
        .bind(expected_revision)
        .bind(new_quantity)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale("Product", id));
        }

        Ok(())
    }

    /// Deletes a product, compare-and-swap on its revision.
    ///
    /// Used by sale commits under the legacy `DeleteRow` exhaustion policy.
    pub async fn delete_if_unchanged_in(
        conn: &mut SqliteConnection,
        owner_id: &str,
        id: &str,
        expected_revision: i64,
    ) -> DbResult<()> {
        let result =
            sqlx::query("DELETE FROM products WHERE owner_id = ?1 AND id = ?2 AND revision = ?3")
                .bind(owner_id)
                .bind(id)
                .bind(expected_revision)
                .execute(conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale("Product", id));
        }

        Ok(())
    }

    /// Adds stock and overwrites both prices (bulk intake merge).
    ///
    /// Quantity accumulates; prices always reflect the latest intake. Delta
    /// updates commute, so no revision check is needed here.
    pub async fn restock_in(
        conn: &mut SqliteConnection,
        owner_id: &str,
        id: &str,
        quantity_delta: i64,
        buy_price_cents: i64,
        sell_price_cents: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                quantity = quantity + ?3,
                buy_price_cents = ?4,
                sell_price_cents = ?5,
                updated_at = ?6,
                revision = revision + 1
            WHERE owner_id = ?1 AND id = ?2
            "#,
        )
        .bind(owner_id)
        .bind(id)
        .bind(quantity_delta)
        .bind(buy_price_cents)
        .bind(sell_price_cents)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Adds stock without touching prices (sale reversal restore).
    pub async fn add_quantity_in(
        conn: &mut SqliteConnection,
        owner_id: &str,
        id: &str,
        quantity_delta: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                quantity = quantity + ?3,
                updated_at = ?4,
                revision = revision + 1
            WHERE owner_id = ?1 AND id = ?2
            "#,
        )
        .bind(owner_id)
        .bind(id)
        .bind(quantity_delta)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

/// Helper to generate a new product ID.
///
/// ## Usage
/// ```rust,ignore
/// let id = generate_product_id();
/// let product = Product { id, ... };
/// ```
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
