//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  stockbook-core errors (this file)                                  │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  stockbook-db errors (separate crate)                               │
//! │  ├── DbError          - Storage failures, stale revisions           │
//! │  └── LedgerError      - What service callers see                    │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → LedgerError → caller           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, entry id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist in the catalog
    /// - Product was deleted by a sale that exhausted its stock
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Ledger entry cannot be found.
    ///
    /// ## When This Occurs
    /// - Reversing an entry that was already reversed
    /// - Entry ID doesn't exist for this owner
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(String),

    /// Insufficient stock to add to the cart or commit a sale.
    ///
    /// ## When This Occurs
    /// - Requested quantity plus cart-held quantity exceeds current stock
    /// - A concurrent sale consumed the stock before commit
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Re-read catalog: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Widget", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Widget in stock"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Commit attempted on an empty cart.
    #[error("Cart is empty, nothing to commit")]
    EmptyCart,

    /// A bulk intake batch was rejected before any write.
    ///
    /// All row faults are reported together so the caller can surface
    /// per-row messages. Nothing is applied when this is returned.
    #[error("Bulk intake rejected, {} row(s) failed validation", faults.len())]
    IntakeRejected { faults: Vec<RowFault> },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Row Fault
// =============================================================================

/// A validation failure attached to one row of a bulk intake batch.
///
/// Row indices are zero-based and refer to the submitted order.
#[derive(Debug, Error)]
#[error("row {row}: {fault}")]
pub struct RowFault {
    pub row: usize,
    #[source]
    pub fault: ValidationError,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
