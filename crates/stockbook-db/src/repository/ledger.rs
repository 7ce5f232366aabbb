//! # Ledger Repository
//!
//! Database operations for the Transaction Log.
//!
//! ## Entry Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Ledger Entry Lifecycle                          │
//! │                                                                     │
//! │  1. COMMIT (LedgerService::commit_sale)                             │
//! │     └── insert_entry_in() + insert_item_in() per cart line,         │
//! │         in the SAME transaction as the stock decrements             │
//! │                                                                     │
//! │  2. READ                                                            │
//! │     └── get_entry() / list_entries() / get_items()                  │
//! │         drive the transaction-history view                          │
//! │                                                                     │
//! │  3. REVERSE (LedgerService::reverse_sale)                           │
//! │     └── delete_entry_in(), in the SAME transaction as the stock     │
//! │         restores; items cascade on the entry's foreign key          │
//! │                                                                     │
//! │  There is no update step. Entries are immutable once written.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockbook_core::{LedgerEntry, LedgerItem};

/// Columns selected for every LedgerEntry read, in FromRow order.
const ENTRY_COLUMNS: &str = "id, owner_id, buyer_name, total_cents, profit_cents, created_at";

/// Columns selected for every LedgerItem read, in FromRow order.
const ITEM_COLUMNS: &str = "id, entry_id, product_id, name, quantity, \
     buy_price_cents, sell_price_cents, position, created_at";

/// Repository for ledger database operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Gets an entry by ID.
    pub async fn get_entry(&self, owner_id: &str, id: &str) -> DbResult<Option<LedgerEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE owner_id = ?1 AND id = ?2"
        );
        let entry = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    /// Lists all entries for an owner, newest first.
    pub async fn list_entries(&self, owner_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries \
             WHERE owner_id = ?1 ORDER BY created_at DESC, id"
        );
        let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// Gets all line items for an entry, in cart order.
    ///
    /// Scoped through the owning entry: an entry id belonging to another
    /// owner yields no rows, the same as an unknown id.
    pub async fn get_items(&self, owner_id: &str, entry_id: &str) -> DbResult<Vec<LedgerItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM ledger_items \
             WHERE entry_id = ?2 \
               AND EXISTS (SELECT 1 FROM ledger_entries e \
                           WHERE e.id = entry_id AND e.owner_id = ?1) \
             ORDER BY position"
        );
        let items = sqlx::query_as::<_, LedgerItem>(&sql)
            .bind(owner_id)
            .bind(entry_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Counts entries for an owner (for diagnostics).
    pub async fn count(&self, owner_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries WHERE owner_id = ?1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    // =========================================================================
    // Transaction Helpers
    // =========================================================================

    /// Fetches an entry inside a transaction.
    pub async fn fetch_entry_in(
        conn: &mut SqliteConnection,
        owner_id: &str,
        id: &str,
    ) -> DbResult<Option<LedgerEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE owner_id = ?1 AND id = ?2"
        );
        let entry = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(entry)
    }

    /// Fetches an entry's items inside a transaction, in cart order.
    pub async fn fetch_items_in(
        conn: &mut SqliteConnection,
        entry_id: &str,
    ) -> DbResult<Vec<LedgerItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM ledger_items WHERE entry_id = ?1 ORDER BY position"
        );
        let items = sqlx::query_as::<_, LedgerItem>(&sql)
            .bind(entry_id)
            .fetch_all(conn)
            .await?;

        Ok(items)
    }

    /// Inserts an entry inside a transaction.
    pub async fn insert_entry_in(
        conn: &mut SqliteConnection,
        entry: &LedgerEntry,
    ) -> DbResult<()> {
        debug!(id = %entry.id, buyer = %entry.buyer_name, "Inserting ledger entry");

        sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                id, owner_id, buyer_name,
                total_cents, profit_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.owner_id)
        .bind(&entry.buyer_name)
        .bind(entry.total_cents)
        .bind(entry.profit_cents)
        .bind(entry.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts a line item inside a transaction.
    ///
    /// ## Snapshot Pattern
    /// Product details (name, prices) are copied into the item. This
    /// preserves the sale history even if the product changes or is deleted
    /// later, and it is what reversal restores from.
    pub async fn insert_item_in(conn: &mut SqliteConnection, item: &LedgerItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ledger_items (
                id, entry_id, product_id, name,
                quantity, buy_price_cents, sell_price_cents,
                position, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.entry_id)
        .bind(&item.product_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.buy_price_cents)
        .bind(item.sell_price_cents)
        .bind(item.position)
        .bind(item.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Deletes an entry inside a transaction. Items cascade.
    pub async fn delete_entry_in(
        conn: &mut SqliteConnection,
        owner_id: &str,
        id: &str,
    ) -> DbResult<()> {
        debug!(id = %id, "Deleting ledger entry");

        let result = sqlx::query("DELETE FROM ledger_entries WHERE owner_id = ?1 AND id = ?2")
            .bind(owner_id)
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("LedgerEntry", id));
        }

        Ok(())
    }
}

/// Generates a new ledger entry ID.
pub fn generate_entry_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new ledger item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}
