//! # Ledger Service
//!
//! The standalone service implementing the cart, commit-sale, bulk-intake,
//! and reversal contracts. Presentation layers (the stock-management and
//! history views) are pure clients of this module; no business logic lives
//! in any view.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 One Sale Commit, One Transaction                    │
//! │                                                                     │
//! │  BEGIN                                                              │
//! │    for each cart line:                                              │
//! │      read product            ← current quantity and revision        │
//! │      new_qty = qty - line.quantity                                  │
//! │      new_qty == 0 ?                                                 │
//! │        RetainAtZero → UPDATE quantity = 0   (CAS on revision)       │
//! │        DeleteRow    → DELETE product        (CAS on revision)       │
//! │      else           → UPDATE quantity = new_qty (CAS on revision)   │
//! │    INSERT ledger entry (totals from cart snapshots)                 │
//! │    INSERT ledger item per line                                      │
//! │  COMMIT   ← all mutations become visible together, or none do       │
//! │                                                                     │
//! │  Any failure (missing product, insufficient stock, stale revision,  │
//! │  storage error) rolls the whole batch back: no partial decrement,   │
//! │  no orphan entry. Bulk intake and reversal follow the same shape.   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Commits racing on the same product are resolved by the revision
//! compare-and-swap: the loser fails with [`DbError::StaleRevision`] and may
//! retry from scratch. Retrying is safe because every mutating operation is
//! atomic; nothing is ever half-applied.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::ledger::{generate_entry_id, generate_item_id, LedgerRepository};
use crate::repository::product::{generate_product_id, ProductRepository};
use stockbook_core::validation::{
    validate_buyer_name, validate_intake_rows, validate_owner_id, validate_quantity,
};
use stockbook_core::{
    Cart, CoreError, ExhaustionPolicy, IntakeRow, LedgerEntry, LedgerItem, Product,
    ValidationError,
};

// =============================================================================
// Service Error
// =============================================================================

/// Errors surfaced by the ledger service.
///
/// Domain errors (validation, insufficient stock, not-found) and storage
/// errors (I/O, conflicts) are kept distinct so views can render field-level
/// messages for the former and a single operation-level failure for the
/// latter.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Domain(err.into())
    }
}

/// Result type for ledger service operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Ledger Service
// =============================================================================

/// The inventory & sales ledger service.
///
/// All operations take an explicit `owner_id`; the catalog and ledger are
/// partitioned per owner and never shared across owners.
#[derive(Debug, Clone)]
pub struct LedgerService {
    db: Database,
    exhaustion_policy: ExhaustionPolicy,
}

impl LedgerService {
    /// Creates a service with the default exhaustion policy
    /// ([`ExhaustionPolicy::RetainAtZero`]).
    pub fn new(db: Database) -> Self {
        Self::with_exhaustion_policy(db, ExhaustionPolicy::default())
    }

    /// Creates a service with an explicit exhaustion policy.
    ///
    /// [`ExhaustionPolicy::DeleteRow`] reproduces the legacy behavior of
    /// removing a product outright when a sale exhausts its stock.
    pub fn with_exhaustion_policy(db: Database, policy: ExhaustionPolicy) -> Self {
        LedgerService {
            db,
            exhaustion_policy: policy,
        }
    }

    /// The policy applied when a sale drives a product's stock to zero.
    pub fn exhaustion_policy(&self) -> ExhaustionPolicy {
        self.exhaustion_policy
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds a product to a cart, re-validating against CURRENT stock.
    ///
    /// The product is re-read from the catalog at call time, so the
    /// availability check always sees the latest quantity, not a cached one.
    /// The cart line snapshots the product's name and prices as read here.
    ///
    /// ## Errors
    /// - [`CoreError::ProductNotFound`] - no such product for this owner
    /// - [`CoreError::InsufficientStock`] - requested plus already-held
    ///   quantity exceeds current stock; the cart is left unchanged
    pub async fn add_to_cart(
        &self,
        owner_id: &str,
        cart: &mut Cart,
        product_id: &str,
        quantity: i64,
    ) -> LedgerResult<()> {
        validate_owner_id(owner_id)?;
        validate_quantity(quantity)?;

        debug!(owner_id = %owner_id, product_id = %product_id, quantity = %quantity, "Adding to cart");

        let product = self
            .db
            .products()
            .get_by_id(owner_id, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        cart.add_or_merge(&product, quantity)?;
        Ok(())
    }

    // =========================================================================
    // Commit-Sale
    // =========================================================================

    /// Commits the cart as one atomic sale.
    ///
    /// Decrements (or removes, per the exhaustion policy) every product in
    /// the cart and appends a ledger entry with an immutable copy of the
    /// lines, all in a single transaction. Totals are computed from the cart
    /// snapshots, not re-read from the catalog.
    ///
    /// The cart is NOT cleared here; the caller clears it after a successful
    /// commit.
    ///
    /// ## Errors
    /// - [`CoreError::Validation`] - empty buyer name
    /// - [`CoreError::EmptyCart`] - nothing to commit
    /// - [`CoreError::ProductNotFound`] - a line's product vanished since it
    ///   was added; the whole commit is rolled back
    /// - [`CoreError::InsufficientStock`] - stock was consumed elsewhere
    ///   since the line was added; the whole commit is rolled back
    /// - [`DbError::StaleRevision`] - lost a race with a concurrent commit;
    ///   retry the operation
    pub async fn commit_sale(
        &self,
        owner_id: &str,
        buyer_name: &str,
        cart: &Cart,
    ) -> LedgerResult<LedgerEntry> {
        validate_owner_id(owner_id)?;
        let buyer_name = validate_buyer_name(buyer_name)?;

        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        debug!(owner_id = %owner_id, lines = cart.line_count(), "Committing sale");

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        for line in cart.lines() {
            let product =
                ProductRepository::fetch_by_id_in(&mut tx, owner_id, &line.product_id)
                    .await?
                    .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            if product.quantity < line.quantity {
                return Err(CoreError::InsufficientStock {
                    name: product.name,
                    available: product.quantity,
                    requested: line.quantity,
                }
                .into());
            }

            let new_quantity = product.quantity - line.quantity;

            if new_quantity == 0 && self.exhaustion_policy == ExhaustionPolicy::DeleteRow {
                ProductRepository::delete_if_unchanged_in(
                    &mut tx,
                    owner_id,
                    &product.id,
                    product.revision,
                )
                .await?;
            } else {
                ProductRepository::set_quantity_in(
                    &mut tx,
                    owner_id,
                    &product.id,
                    new_quantity,
                    product.revision,
                )
                .await?;
            }
        }

        let entry = LedgerEntry {
            id: generate_entry_id(),
            owner_id: owner_id.to_string(),
            buyer_name,
            total_cents: cart.total().cents(),
            profit_cents: cart.profit().cents(),
            created_at: now,
        };

        LedgerRepository::insert_entry_in(&mut tx, &entry).await?;

        for (position, line) in cart.lines().iter().enumerate() {
            let item = LedgerItem {
                id: generate_item_id(),
                entry_id: entry.id.clone(),
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                buy_price_cents: line.buy_price_cents,
                sell_price_cents: line.sell_price_cents,
                position: position as i64,
                created_at: now,
            };
            LedgerRepository::insert_item_in(&mut tx, &item).await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            owner_id = %owner_id,
            entry_id = %entry.id,
            total = %entry.total(),
            profit = %entry.profit(),
            lines = cart.line_count(),
            "Sale committed"
        );

        Ok(entry)
    }

    // =========================================================================
    // Bulk Intake
    // =========================================================================

    /// Merges a batch of intake rows into the catalog, atomically.
    ///
    /// The batch is validated as a whole BEFORE any write: every row fault
    /// is reported together via [`CoreError::IntakeRejected`] and nothing is
    /// applied if any row fails. Rows then apply in one transaction:
    ///
    /// - existing product (matched by exact trimmed name): quantity is
    ///   ADDED, both prices are OVERWRITTEN with the row's values
    /// - no match: a new product is created from the row
    pub async fn bulk_intake(&self, owner_id: &str, rows: &[IntakeRow]) -> LedgerResult<()> {
        validate_owner_id(owner_id)?;

        let rows = validate_intake_rows(rows)
            .map_err(|faults| CoreError::IntakeRejected { faults })?;

        debug!(owner_id = %owner_id, rows = rows.len(), "Applying bulk intake");

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let mut created = 0usize;
        let mut merged = 0usize;

        for row in &rows {
            match ProductRepository::find_by_name_in(&mut tx, owner_id, &row.name).await? {
                Some(existing) => {
                    ProductRepository::restock_in(
                        &mut tx,
                        owner_id,
                        &existing.id,
                        row.quantity,
                        row.buy_price_cents,
                        row.sell_price_cents,
                    )
                    .await?;
                    merged += 1;
                }
                None => {
                    let product = Product {
                        id: generate_product_id(),
                        owner_id: owner_id.to_string(),
                        name: row.name.clone(),
                        buy_price_cents: row.buy_price_cents,
                        sell_price_cents: row.sell_price_cents,
                        quantity: row.quantity,
                        revision: 0,
                        created_at: now,
                        updated_at: now,
                    };
                    ProductRepository::insert_in(&mut tx, &product).await?;
                    created += 1;
                }
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(owner_id = %owner_id, created = created, merged = merged, "Bulk intake applied");

        Ok(())
    }

    // =========================================================================
    // Reversal
    // =========================================================================

    /// Reverses a committed sale, atomically.
    ///
    /// Restores each item's quantity to the product matching its snapshot
    /// name, recreates the product from the snapshot if it no longer exists
    /// (it may have been deleted by the sale itself under the legacy
    /// exhaustion policy, or by a later manual delete), then deletes the
    /// entry. Stock restoration and entry deletion are one atomic unit.
    ///
    /// ## Note
    /// Restoration matches by name, through the same natural-key lookup as
    /// bulk intake. If a different product now holds the name, stock merges
    /// into it. A recreated product gets a fresh id; the one in the snapshot
    /// is not reused.
    pub async fn reverse_sale(&self, owner_id: &str, entry_id: &str) -> LedgerResult<()> {
        validate_owner_id(owner_id)?;

        debug!(owner_id = %owner_id, entry_id = %entry_id, "Reversing sale");

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let entry = LedgerRepository::fetch_entry_in(&mut tx, owner_id, entry_id)
            .await?
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;

        let items = LedgerRepository::fetch_items_in(&mut tx, &entry.id).await?;

        for item in &items {
            match ProductRepository::find_by_name_in(&mut tx, owner_id, &item.name).await? {
                Some(existing) => {
                    ProductRepository::add_quantity_in(
                        &mut tx,
                        owner_id,
                        &existing.id,
                        item.quantity,
                    )
                    .await?;
                }
                None => {
                    let product = Product {
                        id: generate_product_id(),
                        owner_id: owner_id.to_string(),
                        name: item.name.clone(),
                        buy_price_cents: item.buy_price_cents,
                        sell_price_cents: item.sell_price_cents,
                        quantity: item.quantity,
                        revision: 0,
                        created_at: now,
                        updated_at: now,
                    };
                    ProductRepository::insert_in(&mut tx, &product).await?;
                }
            }
        }

        LedgerRepository::delete_entry_in(&mut tx, owner_id, &entry.id).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(owner_id = %owner_id, entry_id = %entry_id, items = items.len(), "Sale reversed");

        Ok(())
    }

    // =========================================================================
    // Catalog Passthroughs
    // =========================================================================
    // Thin wrappers so views depend on the service alone.

    /// Gets a product by id.
    pub async fn get_product(&self, owner_id: &str, id: &str) -> LedgerResult<Product> {
        validate_owner_id(owner_id)?;
        self.db
            .products()
            .get_by_id(owner_id, id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Lists the owner's catalog, sorted by name.
    pub async fn list_products(&self, owner_id: &str) -> LedgerResult<Vec<Product>> {
        validate_owner_id(owner_id)?;
        Ok(self.db.products().list(owner_id).await?)
    }

    /// Natural-key lookup by exact trimmed name.
    pub async fn find_product_by_name(
        &self,
        owner_id: &str,
        name: &str,
    ) -> LedgerResult<Option<Product>> {
        validate_owner_id(owner_id)?;
        Ok(self.db.products().find_by_name(owner_id, name).await?)
    }

    /// Manual stock correction, clamped at zero.
    pub async fn adjust_quantity(
        &self,
        owner_id: &str,
        id: &str,
        delta: i64,
    ) -> LedgerResult<Product> {
        validate_owner_id(owner_id)?;
        Ok(self.db.products().adjust_quantity(owner_id, id, delta).await?)
    }

    /// Edits both prices of a product. Cart lines keep their snapshots.
    pub async fn update_prices(
        &self,
        owner_id: &str,
        id: &str,
        buy_price_cents: i64,
        sell_price_cents: i64,
    ) -> LedgerResult<()> {
        validate_owner_id(owner_id)?;
        Ok(self
            .db
            .products()
            .update_prices(owner_id, id, buy_price_cents, sell_price_cents)
            .await?)
    }

    /// Explicitly deletes a product.
    pub async fn delete_product(&self, owner_id: &str, id: &str) -> LedgerResult<()> {
        validate_owner_id(owner_id)?;
        Ok(self.db.products().delete(owner_id, id).await?)
    }

    // =========================================================================
    // Ledger Reads
    // =========================================================================

    /// Gets a ledger entry by id.
    pub async fn get_entry(&self, owner_id: &str, id: &str) -> LedgerResult<LedgerEntry> {
        validate_owner_id(owner_id)?;
        self.db
            .ledger()
            .get_entry(owner_id, id)
            .await?
            .ok_or_else(|| CoreError::EntryNotFound(id.to_string()).into())
    }

    /// Lists the owner's ledger entries, newest first.
    pub async fn list_entries(&self, owner_id: &str) -> LedgerResult<Vec<LedgerEntry>> {
        validate_owner_id(owner_id)?;
        Ok(self.db.ledger().list_entries(owner_id).await?)
    }

    /// Gets the line snapshots of an entry, in cart order.
    ///
    /// ## Errors
    /// - [`CoreError::EntryNotFound`] - no such entry for this owner; an
    ///   entry id belonging to another owner is indistinguishable from an
    ///   unknown one
    pub async fn entry_items(
        &self,
        owner_id: &str,
        entry_id: &str,
    ) -> LedgerResult<Vec<LedgerItem>> {
        let entry = self.get_entry(owner_id, entry_id).await?;
        Ok(self.db.ledger().get_items(owner_id, &entry.id).await?)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;

    const OWNER: &str = "owner-1";

    async fn service() -> LedgerService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        LedgerService::new(db)
    }

    async fn service_with_policy(policy: ExhaustionPolicy) -> LedgerService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        LedgerService::with_exhaustion_policy(db, policy)
    }

    fn row(name: &str, qty: i64, buy: i64, sell: i64) -> IntakeRow {
        IntakeRow {
            name: name.to_string(),
            quantity: qty,
            buy_price_cents: buy,
            sell_price_cents: sell,
        }
    }

    async fn widget_product(svc: &LedgerService) -> Product {
        svc.find_product_by_name(OWNER, "Widget")
            .await
            .unwrap()
            .expect("Widget should exist")
    }

    #[tokio::test]
    async fn test_end_to_end_widget_scenario() {
        let svc = service().await;

        // Empty catalog -> intake 10 Widgets at buy $5.00 / sell $8.00
        svc.bulk_intake(OWNER, &[row("Widget", 10, 500, 800)])
            .await
            .unwrap();

        let widget = widget_product(&svc).await;
        assert_eq!(widget.quantity, 10);

        // Cart 4 units, commit
        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 4).await.unwrap();

        let entry = svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap();
        cart.clear();

        assert_eq!(entry.total_cents, 3200);
        assert_eq!(entry.profit_cents, 1200);
        assert_eq!(entry.buyer_name, "Ayşe");

        let widget = widget_product(&svc).await;
        assert_eq!(widget.quantity, 6);

        let entries = svc.list_entries(OWNER).await.unwrap();
        assert_eq!(entries.len(), 1);

        let items = svc.entry_items(OWNER, &entry.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Widget");
        assert_eq!(items[0].quantity, 4);

        // Reverse: stock restored, ledger empty
        svc.reverse_sale(OWNER, &entry.id).await.unwrap();

        let widget = widget_product(&svc).await;
        assert_eq!(widget.quantity, 10);
        assert!(svc.list_entries(OWNER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_intake_merge_law() {
        let svc = service().await;

        svc.bulk_intake(OWNER, &[row("X", 3, 1000, 1500)]).await.unwrap();
        svc.bulk_intake(OWNER, &[row("X", 2, 1200, 1800)]).await.unwrap();

        let products = svc.list_products(OWNER).await.unwrap();
        assert_eq!(products.len(), 1);

        let x = &products[0];
        assert_eq!(x.quantity, 5); // quantity accumulates
        assert_eq!(x.buy_price_cents, 1200); // prices overwritten
        assert_eq!(x.sell_price_cents, 1800);
    }

    #[tokio::test]
    async fn test_bulk_intake_matches_trimmed_name() {
        let svc = service().await;

        svc.bulk_intake(OWNER, &[row("Widget", 3, 500, 800)]).await.unwrap();
        svc.bulk_intake(OWNER, &[row("  Widget  ", 2, 500, 800)]).await.unwrap();

        let widget = widget_product(&svc).await;
        assert_eq!(widget.quantity, 5);
    }

    #[tokio::test]
    async fn test_bulk_intake_rejects_whole_batch() {
        let svc = service().await;

        let rows = vec![
            row("Widget", 10, 500, 800), // valid
            row("", 5, 100, 200),        // missing name
            row("Gadget", -1, 100, 200), // bad quantity
        ];

        let err = svc.bulk_intake(OWNER, &rows).await.unwrap_err();
        match err {
            LedgerError::Domain(CoreError::IntakeRejected { faults }) => {
                let faulted: Vec<usize> = faults.iter().map(|f| f.row).collect();
                assert_eq!(faulted, vec![1, 2]);
            }
            other => panic!("expected IntakeRejected, got {other:?}"),
        }

        // Nothing was written, including the valid row
        assert!(svc.list_products(OWNER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_intake_is_owner_scoped() {
        let svc = service().await;

        svc.bulk_intake("owner-1", &[row("Widget", 3, 500, 800)]).await.unwrap();
        svc.bulk_intake("owner-2", &[row("Widget", 7, 400, 900)]).await.unwrap();

        let one = svc.find_product_by_name("owner-1", "Widget").await.unwrap().unwrap();
        let two = svc.find_product_by_name("owner-2", "Widget").await.unwrap().unwrap();

        assert_eq!(one.quantity, 3);
        assert_eq!(two.quantity, 7);
        assert_ne!(one.id, two.id);
    }

    #[tokio::test]
    async fn test_add_to_cart_insufficient_stock_leaves_state() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 2, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        let mut cart = Cart::new();
        let err = svc
            .add_to_cart(OWNER, &mut cart, &widget.id, 5)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::InsufficientStock {
                available: 2,
                requested: 5,
                ..
            })
        ));

        // Catalog and cart unchanged
        assert!(cart.is_empty());
        assert_eq!(widget_product(&svc).await.quantity, 2);
    }

    #[tokio::test]
    async fn test_add_to_cart_rechecks_live_stock() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 10, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 6).await.unwrap();

        // Stock drops to 5 behind the cart's back
        svc.adjust_quantity(OWNER, &widget.id, -5).await.unwrap();

        // Even 1 more unit fails: 6 held + 1 > 5 currently on hand
        let err = svc
            .add_to_cart(OWNER, &mut cart, &widget.id, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(cart.quantity_held(&widget.id), 6);
    }

    #[tokio::test]
    async fn test_commit_requires_buyer_and_lines() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 10, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        // Empty cart
        let cart = Cart::new();
        let err = svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap_err();
        assert!(matches!(err, LedgerError::Domain(CoreError::EmptyCart)));

        // Blank buyer
        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 1).await.unwrap();
        let err = svc.commit_sale(OWNER, "   ", &cart).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::Validation(ValidationError::Required { .. }))
        ));

        // Nothing was committed either time
        assert!(svc.list_entries(OWNER).await.unwrap().is_empty());
        assert_eq!(widget_product(&svc).await.quantity, 10);
    }

    #[tokio::test]
    async fn test_commit_trims_buyer_name() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 10, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 1).await.unwrap();

        let entry = svc.commit_sale(OWNER, "  Ayşe  ", &cart).await.unwrap();
        assert_eq!(entry.buyer_name, "Ayşe");
    }

    #[tokio::test]
    async fn test_exhaustion_default_retains_row_at_zero() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 4, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 4).await.unwrap();
        svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap();

        // Row kept with quantity 0, metadata preserved
        let widget = widget_product(&svc).await;
        assert_eq!(widget.quantity, 0);
        assert_eq!(widget.id, cart.lines()[0].product_id);
    }

    #[tokio::test]
    async fn test_exhaustion_delete_row_policy() {
        let svc = service_with_policy(ExhaustionPolicy::DeleteRow).await;
        svc.bulk_intake(OWNER, &[row("Widget", 4, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 4).await.unwrap();
        let entry = svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap();

        // Exact-remaining sale removed the row entirely
        assert!(svc
            .find_product_by_name(OWNER, "Widget")
            .await
            .unwrap()
            .is_none());

        // Reversal recreates the product from the ledger snapshot
        svc.reverse_sale(OWNER, &entry.id).await.unwrap();

        let widget = widget_product(&svc).await;
        assert_eq!(widget.quantity, 4);
        assert_eq!(widget.buy_price_cents, 500);
        assert_eq!(widget.sell_price_cents, 800);
        assert!(svc.list_entries(OWNER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_sale_leaves_remainder() {
        let svc = service_with_policy(ExhaustionPolicy::DeleteRow).await;
        svc.bulk_intake(OWNER, &[row("Widget", 4, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 3).await.unwrap();
        svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap();

        // Fewer than remaining: row stays at remaining - sold
        assert_eq!(widget_product(&svc).await.quantity, 1);
    }

    #[tokio::test]
    async fn test_commit_atomicity_on_missing_product() {
        let svc = service().await;
        svc.bulk_intake(
            OWNER,
            &[row("Widget", 10, 500, 800), row("Gadget", 5, 100, 250)],
        )
        .await
        .unwrap();

        let widget = widget_product(&svc).await;
        let gadget = svc
            .find_product_by_name(OWNER, "Gadget")
            .await
            .unwrap()
            .unwrap();

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 4).await.unwrap();
        svc.add_to_cart(OWNER, &mut cart, &gadget.id, 2).await.unwrap();

        // Second line's product vanishes before the commit
        svc.delete_product(OWNER, &gadget.id).await.unwrap();

        let err = svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::ProductNotFound(_))
        ));

        // All-or-nothing: Widget was not decremented, no orphan entry exists
        assert_eq!(widget_product(&svc).await.quantity, 10);
        assert!(svc.list_entries(OWNER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_insufficient_stock_at_commit_time() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 2, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 2).await.unwrap();

        // Stock shrinks after the add but before the commit
        svc.adjust_quantity(OWNER, &widget.id, -1).await.unwrap();

        let err = svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::InsufficientStock {
                available: 1,
                requested: 2,
                ..
            })
        ));

        // No decrement happened, no entry was written
        assert_eq!(widget_product(&svc).await.quantity, 1);
        assert!(svc.list_entries(OWNER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cart_price_lock_against_catalog_edit() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 10, 500, 1000)]).await.unwrap();
        let widget = widget_product(&svc).await;

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 1).await.unwrap();

        // Catalog sell price doubles after the line was added
        svc.update_prices(OWNER, &widget.id, 500, 2000).await.unwrap();

        // Cart still shows the locked-in price...
        assert_eq!(cart.total().cents(), 1000);

        // ...and the committed entry uses the snapshot too
        let entry = svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap();
        assert_eq!(entry.total_cents, 1000);

        // Remove + re-add picks up the new price
        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 1).await.unwrap();
        assert_eq!(cart.total().cents(), 2000);
    }

    #[tokio::test]
    async fn test_reversal_merges_into_existing_product() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 10, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 4).await.unwrap();
        let entry = svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap();

        // More stock arrives between sale and reversal
        svc.bulk_intake(OWNER, &[row("Widget", 5, 600, 900)]).await.unwrap();

        svc.reverse_sale(OWNER, &entry.id).await.unwrap();

        // 6 remaining + 5 intake + 4 restored; prices stay at the latest intake
        let widget = widget_product(&svc).await;
        assert_eq!(widget.quantity, 15);
        assert_eq!(widget.buy_price_cents, 600);
        assert_eq!(widget.sell_price_cents, 900);
    }

    #[tokio::test]
    async fn test_reverse_missing_entry_not_found() {
        let svc = service().await;

        let err = svc.reverse_sale(OWNER, "no-such-entry").await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::EntryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reverse_twice_fails_second_time() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 10, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 4).await.unwrap();
        let entry = svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap();

        svc.reverse_sale(OWNER, &entry.id).await.unwrap();
        let err = svc.reverse_sale(OWNER, &entry.id).await.unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::EntryNotFound(_))
        ));
        // Not double-restored
        assert_eq!(widget_product(&svc).await.quantity, 10);
    }

    #[tokio::test]
    async fn test_multi_line_commit_totals_and_order() {
        let svc = service().await;
        svc.bulk_intake(
            OWNER,
            &[row("Widget", 10, 500, 800), row("Gadget", 5, 100, 250)],
        )
        .await
        .unwrap();

        let widget = widget_product(&svc).await;
        let gadget = svc
            .find_product_by_name(OWNER, "Gadget")
            .await
            .unwrap()
            .unwrap();

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 4).await.unwrap();
        svc.add_to_cart(OWNER, &mut cart, &gadget.id, 2).await.unwrap();

        let entry = svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap();

        assert_eq!(entry.total_cents, 4 * 800 + 2 * 250);
        assert_eq!(entry.profit_cents, 4 * 300 + 2 * 150);

        let items = svc.entry_items(OWNER, &entry.id).await.unwrap();
        assert_eq!(items.len(), 2);
        // Cart order preserved via position
        assert_eq!(items[0].name, "Widget");
        assert_eq!(items[1].name, "Gadget");
        assert_eq!(items[0].position, 0);
        assert_eq!(items[1].position, 1);
    }

    #[tokio::test]
    async fn test_quantity_never_negative_after_clamped_adjustment() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 3, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        // Over-large manual correction clamps at zero
        let adjusted = svc.adjust_quantity(OWNER, &widget.id, -10).await.unwrap();
        assert_eq!(adjusted.quantity, 0);
    }

    #[tokio::test]
    async fn test_stale_revision_rejected() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 10, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        // Bump the revision behind the writer's back
        svc.adjust_quantity(OWNER, &widget.id, 1).await.unwrap();

        // A write conditioned on the old revision must fail
        let pool = svc.db.pool().clone();
        let mut tx = pool.begin().await.unwrap();
        let err = ProductRepository::set_quantity_in(
            &mut tx,
            OWNER,
            &widget.id,
            5,
            widget.revision, // stale: adjust_quantity already incremented it
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DbError::StaleRevision { .. }));
    }

    #[tokio::test]
    async fn test_entry_items_owner_scoped() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 10, 500, 800)]).await.unwrap();
        let widget = widget_product(&svc).await;

        let mut cart = Cart::new();
        svc.add_to_cart(OWNER, &mut cart, &widget.id, 4).await.unwrap();
        let entry = svc.commit_sale(OWNER, "Ayşe", &cart).await.unwrap();

        // A different owner holding the entry id cannot read its snapshots
        let err = svc.entry_items("owner-2", &entry.id).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::EntryNotFound(_))
        ));

        // Repository-level read is scoped the same way
        let items = svc.db.ledger().get_items("owner-2", &entry.id).await.unwrap();
        assert!(items.is_empty());

        // The owning owner still sees the items
        let items = svc.entry_items(OWNER, &entry.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Widget");
    }

    #[tokio::test]
    async fn test_unknown_owner_sees_nothing() {
        let svc = service().await;
        svc.bulk_intake(OWNER, &[row("Widget", 10, 500, 800)]).await.unwrap();

        assert!(svc.list_products("someone-else").await.unwrap().is_empty());
        assert!(svc
            .find_product_by_name("someone-else", "Widget")
            .await
            .unwrap()
            .is_none());
    }
}
