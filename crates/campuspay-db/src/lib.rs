//! # campuspay-db: Database Layer for Campuspay
//!
//! SQLite persistence for the fee ledger, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Campuspay Data Flow                            │
//! │                                                                     │
//! │  Engine operation (record_payment)                                  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                  campuspay-db (THIS CRATE)                    │ │
//! │  │                                                               │ │
//! │  │  ┌─────────────┐   ┌──────────────────┐   ┌───────────────┐  │ │
//! │  │  │  Database   │   │   Repositories   │   │  Migrations   │  │ │
//! │  │  │  (pool.rs)  │   │  catalog, ledger │   │  (embedded)   │  │ │
//! │  │  │             │◄──│  transactions,   │   │  001_init.sql │  │ │
//! │  │  │  SqlitePool │   │  totals, dir     │   │               │  │ │
//! │  │  └─────────────┘   └──────────────────┘   └───────────────┘  │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (WAL mode)                                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Composition
//!
//! Repository read helpers take the pool; the write methods that make up an
//! atomic ledger unit take `&mut SqliteConnection`, so the engine can run
//! ledger update + transaction append + aggregate upsert inside one sqlx
//! transaction obtained from [`Database::begin`].

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::catalog::CatalogRepository;
pub use repository::directory::DirectoryRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::totals::TotalsRepository;
pub use repository::transactions::TransactionRepository;
