//! # campuspay-engine: Fee Reconciliation Orchestration
//!
//! The operational layer of the Campuspay fee ledger. It owns the store
//! transactions and composes [`campuspay_core`]'s pure arithmetic with
//! [`campuspay_db`]'s repositories.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          FeeEngine                                  │
//! │                                                                     │
//! │  WRITE (transactional)            READ                              │
//! │  ├── record_payment               ├── student_fee_summary           │
//! │  ├── record_payments (bulk)       ├── student_totals                │
//! │  ├── cancel_payments              ├── daily_collection              │
//! │  ├── assign_fees                  └── recompute_totals (repair)     │
//! │  ├── create_fee_structure                                           │
//! │  └── upload_fee_structures                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every write that touches the ledger commits the full triad - ledger
//! row, transaction log, per-student aggregate - in one store transaction.

pub mod assignment;
pub mod cancellation;
pub mod error;
pub mod payment;
pub mod reporting;
pub mod upload;

pub use assignment::{AssignmentReport, SkippedStudent};
pub use cancellation::CancellationSummary;
pub use error::{EngineError, EngineResult};
pub use payment::{BulkPaymentReport, PaymentReceipt, PaymentRequest, PaymentRowOutcome};
pub use reporting::{DailyCollection, StudentFeeSummary, TermFeeLine};
pub use upload::{FeeStructureUploadRow, UploadReport};

use campuspay_db::Database;

/// The fee reconciliation engine.
///
/// Cheap to clone; all clones share the underlying pool.
#[derive(Debug, Clone)]
pub struct FeeEngine {
    db: Database,
}

impl FeeEngine {
    /// Creates an engine over an initialized database.
    pub fn new(db: Database) -> Self {
        FeeEngine { db }
    }

    /// The underlying database handle, for direct repository access.
    pub fn db(&self) -> &Database {
        &self.db
    }
}
