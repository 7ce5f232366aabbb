//! # Cart Module
//!
//! The transient, session-scoped cart that accumulates sale lines before
//! commit.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                  │
//! │                                                                     │
//! │  View Action              Service Call            Cart Change       │
//! │  ───────────              ────────────            ───────────       │
//! │                                                                     │
//! │  Click Product ─────────► add_to_cart() ────────► add_or_merge()    │
//! │                           (re-reads stock)                          │
//! │  Click Remove ──────────► remove line ──────────► remove()          │
//! │                                                                     │
//! │  Cancel / Commit ───────► clear cart ───────────► clear()           │
//! │                                                                     │
//! │  The cart never touches the catalog. Only commit_sale mutates       │
//! │  stock, inside one atomic transaction.                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Lock
//! A line snapshots the product's name and both prices at add time. Catalog
//! price edits made afterwards are NOT reflected in the cart until the line
//! is removed and re-added. Totals and profit are always computed from the
//! snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A pending sale line: a frozen product snapshot plus a requested quantity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Unit cost in cents at time of adding (frozen)
    pub buy_price_cents: i64,

    /// Unit price in cents at time of adding (frozen)
    /// This is critical: we lock in the price when added to cart
    pub sell_price_cents: i64,

    /// Quantity requested
    pub quantity: i64,

    /// When this line was added to the cart
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a new cart line from a product and quantity.
    ///
    /// ## Price Freezing
    /// Both prices are captured at this moment. If the product is edited in
    /// the catalog afterwards, this line retains the original values.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            buy_price_cents: product.buy_price_cents,
            sell_price_cents: product.sell_price_cents,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Line total (unit price × quantity) in cents.
    pub fn line_total_cents(&self) -> i64 {
        self.sell_price_cents * self.quantity
    }

    /// Line profit ((sell − buy) × quantity) in cents.
    pub fn line_profit_cents(&self) -> i64 {
        (self.sell_price_cents - self.buy_price_cents) * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The pending sale.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product merges)
/// - A line's quantity never exceeds the catalog quantity observed at the
///   moment of the add (callers re-read the product before every add)
/// - Maximum lines: 100; maximum quantity per line: 999
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in the cart
    lines: Vec<CartLine>,

    /// When the cart was created/last cleared
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product to the cart, merging into an existing line if present.
    ///
    /// ## Behavior
    /// - `quantity` must be positive
    /// - `quantity` plus any already-held quantity for this product must not
    ///   exceed `product.quantity` (the caller supplies a freshly-read
    ///   product, so this is a live check, not a cached one)
    /// - On merge, the ORIGINAL snapshot prices are kept (price lock)
    ///
    /// ## Errors
    /// - [`CoreError::Validation`] for non-positive quantity
    /// - [`CoreError::InsufficientStock`] when stock cannot cover the total
    /// - [`CoreError::QuantityTooLarge`] / [`CoreError::CartTooLarge`] at the caps
    pub fn add_or_merge(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        let held = self.quantity_held(&product.id);
        let requested = held + quantity;

        if requested > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_LINE_QUANTITY,
            });
        }

        if !product.can_cover(requested) {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.quantity,
                requested,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            // Merge: sum quantity, keep the snapshot taken at first add
            line.quantity = requested;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Removes the line for a product. No-op if the product is not in the cart.
    pub fn remove(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Clears all lines (after a successful commit or explicit cancel).
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// Returns the lines in add order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity already held in the cart for a product (0 if absent).
    pub fn quantity_held(&self, product_id: &str) -> i64 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Total amount over the snapshot prices.
    pub fn total(&self) -> Money {
        Money::from_cents(self.lines.iter().map(|l| l.line_total_cents()).sum())
    }

    /// Total profit over the snapshot prices.
    pub fn profit(&self) -> Money {
        Money::from_cents(self.lines.iter().map(|l| l.line_profit_cents()).sum())
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart totals summary for view responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub total_cents: i64,
    pub profit_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            total_cents: cart.total().cents(),
            profit_cents: cart.profit().cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
