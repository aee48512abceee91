//! # Repository Module
//!
//! Database repository implementations for the Campuspay fee ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Engine operation                                                   │
//! │       │                                                             │
//! │       │  db.ledger().get_for_term(student, term, year)              │
//! │       ▼                                                             │
//! │  LedgerRepository                                                   │
//! │  ├── get_for_term(&self, ...)          ← pool read                  │
//! │  ├── apply_payment(conn, ...)          ← inside engine transaction  │
//! │  └── reset_term(conn, ...)             ← inside engine transaction  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database                                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Write methods that belong to an atomic ledger unit take
//! `&mut SqliteConnection` so the engine can run them against one sqlx
//! transaction; pool-based convenience reads live alongside them.
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - fee structure catalog (upsert, lookup)
//! - [`ledger::LedgerRepository`] - student fee ledger rows
//! - [`transactions::TransactionRepository`] - append-only payment log
//! - [`totals::TotalsRepository`] - denormalized per-student aggregate
//! - [`directory::DirectoryRepository`] - student → class → grade lookups

pub mod catalog;
pub mod directory;
pub mod ledger;
pub mod totals;
pub mod transactions;
