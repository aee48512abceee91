//! # Error Types
//!
//! Domain-specific error types for campuspay-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  campuspay-core errors (this file)                                  │
//! │  ├── CoreError        - Ledger rule violations (overpayment, ...)   │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  campuspay-db errors (separate crate)                               │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  campuspay-engine errors (separate crate)                           │
//! │  └── EngineError      - What the HTTP boundary sees                 │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → EngineError → caller           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (student id, term, amounts)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::money::Money;
use crate::types::Term;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations.
///
/// These errors represent business rule failures computed from ledger state.
/// They are never retried automatically; the caller must correct the input.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The incoming amount (payment + discount + fine) exceeds the
    /// outstanding due for the term.
    ///
    /// Both figures are reported so the caller can correct the request.
    /// The engine never clamps the amount silently.
    #[error("payment of {attempted} exceeds outstanding due of {due} for {term}")]
    Overpayment {
        term: Term,
        due: Money,
        attempted: Money,
    },

    /// The requested term is not part of the grade's schedule
    /// (e.g. TERM_3 for a preKG grade on a two-term schedule).
    #[error("{term} is not part of a {schedule_len}-term schedule")]
    TermOutsideSchedule { term: Term, schedule_len: usize },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request field doesn't meet requirements, before any
/// ledger state is consulted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g. unparseable date, malformed academic year).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
