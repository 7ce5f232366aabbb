//! # Domain Types
//!
//! Core domain types for the inventory & sales ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │    Product      │   │   LedgerEntry   │   │   LedgerItem    │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  entry_id (FK)  │   │
//! │  │  owner_id       │   │  owner_id       │   │  name snapshot  │   │
//! │  │  name (natural  │   │  buyer_name     │   │  prices frozen  │   │
//! │  │     key)        │   │  total_cents    │   │  at sale time   │   │
//! │  │  quantity       │   │  profit_cents   │   │  quantity       │   │
//! │  │  revision       │   └─────────────────┘   └─────────────────┘   │
//! │  └─────────────────┘                                               │
//! │                                                                     │
//! │  IntakeRow        - one row of a bulk intake batch (input only)    │
//! │  ExhaustionPolicy - what a sale does to a row it drives to zero    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Owner Scoping
//! Every durable record carries an explicit `owner_id`. The catalog and the
//! ledger are partitioned per owner; there is no ambient/global owner state
//! anywhere in the crate. Callers pass the owner on every operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog, with stock on hand and both unit prices.
///
/// ## Dual-Key Identity Pattern
/// - `id`: UUID v4 - immutable, used for database relations and cart lines
/// - `name`: natural key - trimmed, exact-match, unique per owner; used by
///   bulk intake merging and sale reversal
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owner this product belongs to.
    pub owner_id: String,

    /// Display name, also the natural key for intake matching.
    pub name: String,

    /// Unit cost in cents.
    pub buy_price_cents: i64,

    /// Unit price in cents.
    pub sell_price_cents: i64,

    /// Stock on hand. Never negative.
    pub quantity: i64,

    /// Optimistic-lock counter, incremented on every mutation.
    pub revision: i64,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit cost as a Money type.
    #[inline]
    pub fn buy_price(&self) -> Money {
        Money::from_cents(self.buy_price_cents)
    }

    /// Returns the unit price as a Money type.
    #[inline]
    pub fn sell_price(&self) -> Money {
        Money::from_cents(self.sell_price_cents)
    }

    /// Per-unit margin (sell minus buy). May be negative.
    #[inline]
    pub fn unit_margin(&self) -> Money {
        self.sell_price() - self.buy_price()
    }

    /// Checks whether the current stock covers the requested quantity.
    pub fn can_cover(&self, requested: i64) -> bool {
        self.quantity >= requested
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// A completed sale: the sole durable record of what stock was removed
/// and at what economics.
///
/// ## Immutability
/// Once written, an entry and its items never change. The only permitted
/// operation is reversal, which restores stock and deletes the entry as one
/// atomic unit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    pub id: String,
    pub owner_id: String,
    /// Non-empty at commit time (trimmed).
    pub buyer_name: String,
    /// Σ(sell_price × quantity) over all items, in cents.
    pub total_cents: i64,
    /// Σ((sell_price − buy_price) × quantity) over all items, in cents.
    pub profit_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns the total amount as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the total profit as Money.
    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

// =============================================================================
// Ledger Item
// =============================================================================

/// A line item in a ledger entry.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerItem {
    pub id: String,
    pub entry_id: String,
    /// Product ID at time of sale. The product may no longer exist.
    pub product_id: String,
    /// Product name at time of sale (frozen). Reversal restores by this name.
    pub name: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit cost in cents at time of sale (frozen).
    pub buy_price_cents: i64,
    /// Unit price in cents at time of sale (frozen).
    pub sell_price_cents: i64,
    /// Zero-based position preserving cart line order.
    pub position: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LedgerItem {
    /// Line total (unit price × quantity) as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.sell_price_cents).multiply_quantity(self.quantity)
    }

    /// Line profit ((sell − buy) × quantity) as Money.
    #[inline]
    pub fn line_profit(&self) -> Money {
        Money::from_cents(self.sell_price_cents - self.buy_price_cents)
            .multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Intake Row
// =============================================================================

/// One row of a bulk intake batch, as supplied by the bulk-entry grid.
///
/// ## Merge Policy
/// Rows are matched against the catalog by exact trimmed name. On a match,
/// quantity is ADDED to the existing stock and both prices are OVERWRITTEN
/// with the row's values, so prices always reflect the latest intake.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IntakeRow {
    pub name: String,
    pub quantity: i64,
    pub buy_price_cents: i64,
    pub sell_price_cents: i64,
}

// =============================================================================
// Exhaustion Policy
// =============================================================================

/// What a sale commit does to a product it drives to zero stock.
///
/// ## Background
/// The legacy system deleted the product row outright, discarding catalog
/// metadata and forcing reversal to resurrect a stripped-down record. That
/// behavior is kept available for compatibility, but retaining the row at
/// zero quantity is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Keep the product row with `quantity = 0` (default).
    RetainAtZero,
    /// Delete the product row when a sale exhausts its stock.
    DeleteRow,
}

impl Default for ExhaustionPolicy {
    fn default() -> Self {
        ExhaustionPolicy::RetainAtZero
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product {
            id: "p-1".to_string(),
            owner_id: "owner-1".to_string(),
            name: "Widget".to_string(),
            buy_price_cents: 500,
            sell_price_cents: 800,
            quantity: 10,
            revision: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_can_cover() {
        let product = widget();
        assert!(product.can_cover(10));
        assert!(product.can_cover(4));
        assert!(!product.can_cover(11));
    }

    #[test]
    fn test_product_unit_margin() {
        let product = widget();
        assert_eq!(product.unit_margin().cents(), 300);
    }

    #[test]
    fn test_ledger_item_totals() {
        let item = LedgerItem {
            id: "i-1".to_string(),
            entry_id: "e-1".to_string(),
            product_id: "p-1".to_string(),
            name: "Widget".to_string(),
            quantity: 4,
            buy_price_cents: 500,
            sell_price_cents: 800,
            position: 0,
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total().cents(), 3200);
        assert_eq!(item.line_profit().cents(), 1200);
    }

    #[test]
    fn test_exhaustion_policy_default() {
        assert_eq!(ExhaustionPolicy::default(), ExhaustionPolicy::RetainAtZero);
    }
}
