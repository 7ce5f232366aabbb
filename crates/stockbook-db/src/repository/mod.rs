//! # Repository Layer
//!
//! Repositories own the SQL for one durable component each:
//!
//! - [`product`] - the Catalog Store (products, stock, prices)
//! - [`ledger`] - the Transaction Log (entries and line snapshots)
//!
//! ## Two Kinds of Methods
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Pool methods        repo.get_by_id(owner, id)                      │
//! │                      Single-statement reads and standalone writes,  │
//! │                      executed against the pool.                     │
//! │                                                                     │
//! │  `*_in` helpers      ProductRepository::set_quantity_in(&mut conn)  │
//! │                      Building blocks for the LedgerService's        │
//! │                      multi-statement transactions. They take a      │
//! │                      `&mut SqliteConnection` so every statement of  │
//! │                      a commit/intake/reversal runs inside ONE       │
//! │                      transaction and becomes visible atomically.    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod ledger;
pub mod product;

pub use ledger::LedgerRepository;
pub use product::ProductRepository;
