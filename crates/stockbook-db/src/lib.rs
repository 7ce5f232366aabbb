//! # stockbook-db: Storage and Service Layer for Stockbook
//!
//! This crate provides SQLite persistence and the ledger service for the
//! Stockbook inventory & sales ledger. It uses sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stockbook Data Flow                               │
//! │                                                                         │
//! │  View (stock-management / transaction-history)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │ LedgerService │   │  Repositories  │   │  Migrations  │   │   │
//! │  │   │ (service.rs)  │   │ (product.rs,   │   │  (embedded)  │   │   │
//! │  │   │               │──►│  ledger.rs)    │   │              │   │   │
//! │  │   │ commit_sale   │   │                │   │ 001_initial_ │   │   │
//! │  │   │ bulk_intake   │   │ ProductRepo    │   │ schema.sql   │   │   │
//! │  │   │ reverse_sale  │   │ LedgerRepo     │   │              │   │   │
//! │  │   └───────────────┘   └────────────────┘   └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  SQLite Database (WAL mode)                     │   │
//! │  │        products / ledger_entries / ledger_items                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, ledger)
//! - [`service`] - The ledger service: cart, commit, intake, reversal
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_core::Cart;
//! use stockbook_db::{Database, DbConfig, LedgerService};
//!
//! let db = Database::new(DbConfig::new("path/to/stockbook.db")).await?;
//! let service = LedgerService::new(db);
//!
//! let mut cart = Cart::new();
//! service.add_to_cart("owner-1", &mut cart, &product_id, 4).await?;
//! let entry = service.commit_sale("owner-1", "Ayşe", &cart).await?;
//! cart.clear();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::{LedgerError, LedgerResult, LedgerService};

// Repository re-exports for convenience
pub use repository::ledger::LedgerRepository;
pub use repository::product::ProductRepository;
