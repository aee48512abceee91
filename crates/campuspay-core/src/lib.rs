//! # campuspay-core: Pure Business Logic for the Campuspay Fee Ledger
//!
//! This crate is the heart of the fee reconciliation engine. It contains all
//! ledger arithmetic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Campuspay Architecture                          │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │              campuspay-engine (orchestration)                 │ │
//! │  │   record_payment, cancel_payments, assign_fees, reports       │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │                                  │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │              ★ campuspay-core (THIS CRATE) ★                  │ │
//! │  │                                                               │ │
//! │  │   ┌──────────┐ ┌──────────┐ ┌────────────┐ ┌────────────┐   │ │
//! │  │   │  types   │ │  money   │ │  schedule  │ │ validation │   │ │
//! │  │   │ ledger   │ │  Money   │ │ TermSchedule│ │   rules    │   │ │
//! │  │   │  rows    │ │  paise   │ │ due/status │ │   checks   │   │ │
//! │  │   └──────────┘ └──────────┘ └────────────┘ └────────────┘   │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │                                  │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │              campuspay-db (Database Layer)                    │ │
//! │  │        SQLite queries, migrations, repositories               │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (FeeStructure, StudentFees, FeeTransaction, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`schedule`] - Term-schedule strategy, due/status calculators, overpayment guard
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, network and file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in paise (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

pub mod error;
pub mod money;
pub mod schedule;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use schedule::{TermSchedule, TermStatus};
pub use types::*;

/// Maximum accepted length of a receipt number.
pub const MAX_RECEIPT_NO_LEN: usize = 40;

/// Maximum accepted length of free-text remarks on a payment.
pub const MAX_REMARKS_LEN: usize = 500;
