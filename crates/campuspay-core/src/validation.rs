//! # Validation Module
//!
//! Field-level validation for fee-ledger requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Deserialization (serde)                                   │
//! │  ├── Type/shape checks, enum variants                               │
//! │  └── Rejects malformed JSON outright                                │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - field rules                                 │
//! │  ├── Positive amounts, date formats, year format                    │
//! │  └── Row-level errors for bulk operations                           │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── NOT NULL, UNIQUE, FOREIGN KEY constraints                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::{MAX_RECEIPT_NO_LEN, MAX_REMARKS_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Textual date format used by bulk uploads (day-month-year).
pub const UPLOAD_DATE_FORMAT: &str = "%d-%m-%Y";

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a store-managed entity id (student, grade, structure).
pub fn validate_entity_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a payment amount in paise.
///
/// ## Rules
/// - Must be strictly positive; a payment of zero is meaningless and a
///   negative one would be a hidden reversal.
pub fn validate_payment_paise(paise: i64) -> ValidationResult<()> {
    if paise <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a discount or fine component in paise.
///
/// ## Rules
/// - Zero is allowed (most payments carry neither)
/// - Negative is not
pub fn validate_adjustment_paise(field: &str, paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a catalog fee amount in paise (term fee or abacus fee).
pub fn validate_fee_paise(field: &str, paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String & Date Validators
// =============================================================================

/// Validates an academic-year label.
///
/// ## Rules
/// Format `Y<start>_<end>` with consecutive four-digit years,
/// e.g. `Y2024_2025`.
///
/// ## Example
/// ```rust
/// use campuspay_core::validation::validate_academic_year;
///
/// assert!(validate_academic_year("Y2024_2025").is_ok());
/// assert!(validate_academic_year("2024-2025").is_err());
/// assert!(validate_academic_year("Y2024_2026").is_err());
/// ```
pub fn validate_academic_year(year: &str) -> ValidationResult<()> {
    let year = year.trim();
    if year.is_empty() {
        return Err(ValidationError::Required {
            field: "academicYear".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "academicYear".to_string(),
        reason: "expected Y<start>_<end>, e.g. Y2024_2025".to_string(),
    };

    let rest = year.strip_prefix('Y').ok_or_else(invalid)?;
    let (start, end) = rest.split_once('_').ok_or_else(invalid)?;
    if start.len() != 4 || end.len() != 4 {
        return Err(invalid());
    }
    let start: i32 = start.parse().map_err(|_| invalid())?;
    let end: i32 = end.parse().map_err(|_| invalid())?;
    if end != start + 1 {
        return Err(invalid());
    }

    Ok(())
}

/// Parses a textual day-month-year date from a bulk upload row.
///
/// ## Example
/// ```rust
/// use campuspay_core::validation::parse_upload_date;
///
/// let date = parse_upload_date("startDate", "01-06-2024").unwrap();
/// assert_eq!(date.to_string(), "2024-06-01");
/// assert!(parse_upload_date("startDate", "2024-06-01").is_err());
/// ```
pub fn parse_upload_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    NaiveDate::parse_from_str(value, UPLOAD_DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("expected day-month-year, got '{value}'"),
        }
    })
}

/// Validates a caller-supplied receipt number.
///
/// ## Rules
/// - Must not be blank when present
/// - Capped at [`MAX_RECEIPT_NO_LEN`] characters
pub fn validate_receipt_no(receipt_no: &str) -> ValidationResult<()> {
    let receipt_no = receipt_no.trim();
    if receipt_no.is_empty() {
        return Err(ValidationError::Required {
            field: "receiptNo".to_string(),
        });
    }
    if receipt_no.len() > MAX_RECEIPT_NO_LEN {
        return Err(ValidationError::TooLong {
            field: "receiptNo".to_string(),
            max: MAX_RECEIPT_NO_LEN,
        });
    }
    Ok(())
}

/// Validates free-text remarks.
pub fn validate_remarks(remarks: &str) -> ValidationResult<()> {
    if remarks.len() > MAX_REMARKS_LEN {
        return Err(ValidationError::TooLong {
            field: "remarks".to_string(),
            max: MAX_REMARKS_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
