//! # Domain Types
//!
//! Core domain types for the Campuspay fee ledger.
//!
//! ## The Reconciliation Triad
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │  ┌────────────────┐      ┌────────────────┐     ┌───────────────┐  │
//! │  │  FeeStructure  │      │  StudentFees   │     │ FeeTransaction│  │
//! │  │  ────────────  │      │  ────────────  │     │ ───────────── │  │
//! │  │  catalog entry │◄─────│  ledger row    │◄────│ append-only   │  │
//! │  │  per (grade,   │ FK   │  per (student, │ FK  │ payment log   │  │
//! │  │  term, year)   │      │  term, year)   │     │ (receipts)    │  │
//! │  └────────────────┘      └───────┬────────┘     └───────────────┘  │
//! │                                  │                                  │
//! │                          ┌───────▼─────────┐                        │
//! │                          │ StudentTotalFees│  denormalized per-     │
//! │                          │ (aggregate)     │  student running total │
//! │                          └─────────────────┘                        │
//! │                                                                     │
//! │  Invariant: for every ledger row,                                   │
//! │    sum(transactions.amount)   == studentFees.paidAmount             │
//! │    sum(transactions.discount) == studentFees.discountAmount         │
//! │    sum(transactions.fine)     == studentFees.fineAmount             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All amounts are raw i64 paise in these rows; `Money` wraps them at the
//! calculation boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Term
// =============================================================================

/// An academic fee term.
///
/// Standard grades run a four-term schedule (TERM_1..TERM_4); preKG grades
/// run a two-term schedule using TERM_1 and TERM_2 only. The schedule shape
/// itself lives in [`crate::schedule::TermSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum Term {
    #[serde(rename = "TERM_1")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "TERM_1"))]
    Term1,
    #[serde(rename = "TERM_2")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "TERM_2"))]
    Term2,
    #[serde(rename = "TERM_3")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "TERM_3"))]
    Term3,
    #[serde(rename = "TERM_4")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "TERM_4"))]
    Term4,
}

impl Term {
    /// Zero-based position of the term within a schedule.
    pub const fn index(&self) -> usize {
        match self {
            Term::Term1 => 0,
            Term::Term2 => 1,
            Term::Term3 => 2,
            Term::Term4 => 3,
        }
    }

    /// Wire/database representation (`TERM_1` .. `TERM_4`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Term::Term1 => "TERM_1",
            Term::Term2 => "TERM_2",
            Term::Term3 => "TERM_3",
            Term::Term4 => "TERM_4",
        }
    }

    /// All terms in schedule order.
    pub const ALL: [Term; 4] = [Term::Term1, Term::Term2, Term::Term3, Term::Term4];
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

/// How a payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMode {
    Cash,
    Online,
    Upi,
    BankTransfer,
}

impl PaymentMode {
    /// Wire/database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "CASH",
            PaymentMode::Online => "ONLINE",
            PaymentMode::Upi => "UPI",
            PaymentMode::BankTransfer => "BANK_TRANSFER",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Grade Tier
// =============================================================================

/// Fee-schedule tier of a grade.
///
/// Determines which [`crate::schedule::TermSchedule`] applies: standard
/// grades pay across four terms with an abacus add-on on the second; preKG
/// grades split the total evenly across two terms with no add-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum GradeTier {
    Standard,
    PreKg,
}

// =============================================================================
// Fee Structure (catalog)
// =============================================================================

/// Catalog entry: the expected fee for one (grade, term, academic year).
///
/// Created and updated by administrators (directly or via bulk upload);
/// read-only to the reconciliation engine. At most one row exists per
/// (grade_id, term, academic_year).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct FeeStructure {
    /// Store-managed auto-increment identifier.
    pub id: i64,

    /// Grade this fee applies to.
    pub grade_id: i64,

    /// Term this fee covers.
    pub term: Term,

    /// Academic year, e.g. `Y2024_2025`.
    pub academic_year: String,

    /// Base term fee in paise.
    pub term_fees_paise: i64,

    /// Optional abacus add-on in paise; charged only on the schedule's
    /// add-on term. Defaults to 0.
    pub abacus_fees_paise: i64,

    /// First day of the term's collection window.
    pub start_date: NaiveDate,

    /// Last day to pay without follow-up.
    pub due_date: NaiveDate,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input shape for creating or upserting a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeeStructure {
    pub grade_id: i64,
    pub term: Term,
    pub academic_year: String,
    pub term_fees_paise: i64,
    #[serde(default)]
    pub abacus_fees_paise: i64,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
}

// =============================================================================
// Student Fees (ledger row)
// =============================================================================

/// Ledger row: cumulative payment state for one (student, term, year).
///
/// Created zeroed by the fee-assignment pass, then mutated in place by
/// payment recording and reset by cancellation. The paid/discount/fine
/// fields are cumulative and, under normal operation, monotonically
/// non-decreasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StudentFees {
    pub id: i64,
    pub student_id: i64,

    /// Catalog entry that determines this row's expected amount.
    pub fee_structure_id: i64,

    pub term: Term,
    pub academic_year: String,

    /// Cumulative amount paid, in paise.
    pub paid_amount_paise: i64,

    /// Cumulative discount granted, in paise.
    pub discount_amount_paise: i64,

    /// Cumulative fine levied, in paise. Fines increase what is owed.
    pub fine_amount_paise: i64,

    /// Cumulative abacus component paid, in paise. Provisioned at zero;
    /// preKG schedules never accrue it.
    pub abacus_amount_paise: i64,

    /// Reference of the most recent receipt against this row.
    pub receipt_no: Option<String>,
    pub receipt_date: Option<NaiveDate>,
    pub payment_mode: Option<PaymentMode>,
    pub remarks: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Fee Transaction (append-only log)
// =============================================================================

/// One payment event (receipt) against a ledger row.
///
/// Append-only: payment recording inserts exactly one row per successful
/// call and nothing else ever mutates it. Cancellation deletes the rows for
/// a (student, term, year) outright - see DESIGN.md for the audit-trail
/// decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct FeeTransaction {
    pub id: i64,
    pub student_id: i64,
    pub student_fees_id: i64,
    pub term: Term,
    pub academic_year: String,

    /// Amount paid in this transaction, in paise.
    pub amount_paise: i64,

    /// Discount component of this transaction, in paise.
    pub discount_amount_paise: i64,

    /// Fine component of this transaction, in paise.
    pub fine_amount_paise: i64,

    pub receipt_no: String,
    pub receipt_date: NaiveDate,
    pub payment_mode: PaymentMode,
    pub remarks: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input shape for appending a transaction.
#[derive(Debug, Clone)]
pub struct NewFeeTransaction {
    pub student_id: i64,
    pub student_fees_id: i64,
    pub term: Term,
    pub academic_year: String,
    pub amount_paise: i64,
    pub discount_amount_paise: i64,
    pub fine_amount_paise: i64,
    pub receipt_no: String,
    pub receipt_date: NaiveDate,
    pub payment_mode: PaymentMode,
    pub remarks: Option<String>,
}

// =============================================================================
// Student Total Fees (denormalized aggregate)
// =============================================================================

/// Per-student running totals across all ledger rows.
///
/// Maintained incrementally inside the same transaction as every ledger
/// mutation. `total_fee_paise` is the sum of all incoming amounts
/// (paid + discount + fine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StudentTotalFees {
    pub student_id: i64,
    pub total_paid_paise: i64,
    pub total_discount_paise: i64,
    pub total_fine_paise: i64,
    pub total_fee_paise: i64,
    pub total_abacus_paise: i64,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Directory Types (read-only to the engine)
// =============================================================================

/// A grade (e.g. "Grade 3", "PreKG").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: i64,
    pub name: String,
    pub tier: GradeTier,
}

/// A class section within a grade (e.g. "3-A").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    pub id: i64,
    pub name: String,
    pub grade_id: i64,
}

/// A student record, as far as the fee engine cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,

    /// Students pending class assignment have no class; fee assignment
    /// skips and reports them.
    pub class_id: Option<i64>,

    pub academic_year: String,
    pub is_active: bool,
}

/// Resolved student → class → grade chain, used to pick fee structures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StudentGradeRef {
    pub student_id: i64,
    pub class_id: i64,
    pub grade_id: i64,
    pub tier: GradeTier,
    pub academic_year: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
