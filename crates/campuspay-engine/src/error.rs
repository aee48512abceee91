//! # Engine Error Types
//!
//! The error taxonomy callers of the engine see. Every lower-layer error
//! collapses into one of these categories:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Validation   - bad input, nothing was consulted or written         │
//! │  NotFound     - referenced entity doesn't exist                     │
//! │  Overpayment  - incoming amount exceeds the outstanding due         │
//! │  Conflict     - uniqueness violated (duplicate catalog key)         │
//! │  Store        - the database itself failed                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Overpayment is deliberately its own variant rather than a kind of
//! validation failure: it depends on ledger state, and callers present it
//! differently (they show the due figure).

use thiserror::Error;

use campuspay_core::{CoreError, Money, Term, ValidationError};
use campuspay_db::DbError;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A request field failed validation before any ledger state was read.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// The incoming amount exceeds the outstanding due for the term.
    #[error("payment of {attempted} exceeds outstanding due of {due} for {term}")]
    Overpayment {
        term: Term,
        due: Money,
        attempted: Money,
    },

    /// The requested term is not part of the grade's fee schedule.
    #[error("{term} is not part of a {schedule_len}-term schedule")]
    TermOutsideSchedule { term: Term, schedule_len: usize },

    /// A uniqueness rule was violated (e.g. duplicate catalog key).
    #[error("{entity} already exists: {key}")]
    Conflict { entity: String, key: String },

    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(DbError),
}

impl EngineError {
    /// Creates a NotFound error for a given entity type and lookup key.
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Creates a Conflict error for a given entity type and key.
    pub fn conflict(entity: impl Into<String>, key: impl Into<String>) -> Self {
        EngineError::Conflict {
            entity: entity.into(),
            key: key.into(),
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Overpayment {
                term,
                due,
                attempted,
            } => EngineError::Overpayment {
                term,
                due,
                attempted,
            },
            CoreError::TermOutsideSchedule { term, schedule_len } => {
                EngineError::TermOutsideSchedule { term, schedule_len }
            }
            CoreError::Validation(v) => EngineError::Validation(v),
        }
    }
}

/// Lifts NotFound through so callers see a single category; everything
/// else stays a store error.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, key } => EngineError::NotFound { entity, key },
            other => EngineError::Store(other),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_overpayment_maps_to_engine_overpayment() {
        let core = CoreError::Overpayment {
            term: Term::Term1,
            due: Money::from_paise(300_000),
            attempted: Money::from_paise(350_000),
        };
        let engine: EngineError = core.into();
        assert!(matches!(engine, EngineError::Overpayment { .. }));
    }

    #[test]
    fn test_db_not_found_lifts_to_engine_not_found() {
        let db = DbError::not_found("student", "42");
        let engine: EngineError = db.into();
        assert_eq!(engine.to_string(), "student not found: 42");
    }

    #[test]
    fn test_db_unique_violation_stays_store_error() {
        let db = DbError::UniqueViolation {
            constraint: "fee_structures.grade_id".to_string(),
        };
        let engine: EngineError = db.into();
        assert!(matches!(engine, EngineError::Store(_)));
    }
}
