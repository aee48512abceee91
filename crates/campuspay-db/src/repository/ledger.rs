//! # Student Fee Ledger Repository
//!
//! Database operations for student_fees rows - the "current balance" view.
//!
//! ## Ledger Row Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  1. PROVISION (fee assignment)                                      │
//! │     └── insert_if_absent() → zeroed row, duplicate-skip             │
//! │                                                                     │
//! │  2. PAY (repeatedly)                                                │
//! │     └── apply_payment() → cumulative amounts grow, receipt          │
//! │         metadata overwritten with the latest event                  │
//! │                                                                     │
//! │  3. (OPTIONAL) CANCEL                                               │
//! │     └── reset_term() → amounts back to zero, receipt cleared        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mutating methods take `&mut SqliteConnection` because they only ever
//! run inside an engine transaction alongside the log and aggregate writes.

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use campuspay_core::{PaymentMode, StudentFees, Term};

const STUDENT_FEES_COLUMNS: &str = "\
    id, student_id, fee_structure_id, term, academic_year, \
    paid_amount_paise, discount_amount_paise, fine_amount_paise, abacus_amount_paise, \
    receipt_no, receipt_date, payment_mode, remarks, created_at, updated_at";

/// One payment event's deltas against a ledger row.
#[derive(Debug, Clone)]
pub struct PaymentDeltas<'a> {
    pub amount_paise: i64,
    pub discount_paise: i64,
    pub fine_paise: i64,
    /// Portion of this payment attributed to the abacus add-on fee.
    /// Zero on terms without the add-on.
    pub abacus_paise: i64,
    pub receipt_no: &'a str,
    pub receipt_date: NaiveDate,
    pub payment_mode: PaymentMode,
    pub remarks: Option<&'a str>,
}

/// Repository for student fee ledger operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Gets the ledger row for a (student, term, year).
    pub async fn get_for_term(
        &self,
        student_id: i64,
        term: Term,
        academic_year: &str,
    ) -> DbResult<Option<StudentFees>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_for_term_in(&mut conn, student_id, term, academic_year).await
    }

    /// Gets the ledger row on an existing connection/transaction.
    ///
    /// The engine reads the row *inside* its transaction so the overpayment
    /// guard always sees current balances.
    pub async fn get_for_term_in(
        conn: &mut SqliteConnection,
        student_id: i64,
        term: Term,
        academic_year: &str,
    ) -> DbResult<Option<StudentFees>> {
        let sql = format!(
            "SELECT {STUDENT_FEES_COLUMNS} FROM student_fees \
             WHERE student_id = ?1 AND term = ?2 AND academic_year = ?3"
        );
        let row = sqlx::query_as::<_, StudentFees>(&sql)
            .bind(student_id)
            .bind(term)
            .bind(academic_year)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row)
    }

    /// Lists all ledger rows for a student in a year, in term order.
    pub async fn list_for_student_year(
        &self,
        student_id: i64,
        academic_year: &str,
    ) -> DbResult<Vec<StudentFees>> {
        let sql = format!(
            "SELECT {STUDENT_FEES_COLUMNS} FROM student_fees \
             WHERE student_id = ?1 AND academic_year = ?2 \
             ORDER BY term"
        );
        let rows = sqlx::query_as::<_, StudentFees>(&sql)
            .bind(student_id)
            .bind(academic_year)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Counts ledger rows for a student (all years).
    pub async fn count_for_student(&self, student_id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM student_fees WHERE student_id = ?1")
                .bind(student_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Provisions a zeroed ledger row for (student, structure) unless one
    /// already exists - duplicate-skip, never overwrite.
    ///
    /// Returns `true` when a row was created.
    pub async fn insert_if_absent(
        conn: &mut SqliteConnection,
        student_id: i64,
        fee_structure_id: i64,
        term: Term,
        academic_year: &str,
    ) -> DbResult<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO student_fees (
                student_id, fee_structure_id, term, academic_year,
                paid_amount_paise, discount_amount_paise, fine_amount_paise,
                abacus_amount_paise, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, 0, 0, 0, 0, ?5, ?5)
            ON CONFLICT DO NOTHING",
        )
        .bind(student_id)
        .bind(fee_structure_id)
        .bind(term)
        .bind(academic_year)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Applies one payment event's deltas to a ledger row and stamps the
    /// receipt metadata with the latest event.
    ///
    /// The overpayment guard has already passed by the time this runs; the
    /// method itself only accumulates.
    pub async fn apply_payment(
        conn: &mut SqliteConnection,
        student_fees_id: i64,
        deltas: &PaymentDeltas<'_>,
    ) -> DbResult<()> {
        debug!(
            student_fees_id,
            amount = deltas.amount_paise,
            discount = deltas.discount_paise,
            fine = deltas.fine_paise,
            "applying payment to ledger row"
        );

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE student_fees SET
                paid_amount_paise = paid_amount_paise + ?2,
                discount_amount_paise = discount_amount_paise + ?3,
                fine_amount_paise = fine_amount_paise + ?4,
                abacus_amount_paise = abacus_amount_paise + ?10,
                receipt_no = ?5,
                receipt_date = ?6,
                payment_mode = ?7,
                remarks = ?8,
                updated_at = ?9
            WHERE id = ?1",
        )
        .bind(student_fees_id)
        .bind(deltas.amount_paise)
        .bind(deltas.discount_paise)
        .bind(deltas.fine_paise)
        .bind(deltas.receipt_no)
        .bind(deltas.receipt_date)
        .bind(deltas.payment_mode)
        .bind(deltas.remarks)
        .bind(now)
        .bind(deltas.abacus_paise)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("student fee ledger row", student_fees_id.to_string()));
        }

        Ok(())
    }

    /// Resets a (student, term, year) ledger row to its unpaid state:
    /// amounts to zero, receipt metadata cleared.
    ///
    /// Zero rows affected is not an error - cancellation is tolerant of a
    /// ledger row that was never provisioned.
    pub async fn reset_term(
        conn: &mut SqliteConnection,
        student_id: i64,
        term: Term,
        academic_year: &str,
    ) -> DbResult<u64> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE student_fees SET
                paid_amount_paise = 0,
                discount_amount_paise = 0,
                fine_amount_paise = 0,
                abacus_amount_paise = 0,
                receipt_no = NULL,
                receipt_date = NULL,
                payment_mode = NULL,
                remarks = NULL,
                updated_at = ?4
            WHERE student_id = ?1 AND term = ?2 AND academic_year = ?3",
        )
        .bind(student_id)
        .bind(term)
        .bind(academic_year)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Re-fetches a ledger row by id on an existing connection.
    pub async fn get_by_id_in(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> DbResult<StudentFees> {
        let sql = format!("SELECT {STUDENT_FEES_COLUMNS} FROM student_fees WHERE id = ?1");
        let row = sqlx::query_as::<_, StudentFees>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DbError::not_found("student fee ledger row", id.to_string()))?;

        Ok(row)
    }
}
