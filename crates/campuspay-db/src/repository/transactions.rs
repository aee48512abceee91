//! # Fee Transaction Log Repository
//!
//! Database operations for the append-only payment log. Each successful
//! payment appends exactly one row; cancellation is the only path that
//! removes rows (see DESIGN.md for the audit-trail decision). The log is
//! the source of truth the ledger and aggregate must reconcile against.

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use campuspay_core::{FeeTransaction, NewFeeTransaction, PaymentMode, Term};

const FEE_TRANSACTION_COLUMNS: &str = "\
    id, student_id, student_fees_id, term, academic_year, \
    amount_paise, discount_amount_paise, fine_amount_paise, \
    receipt_no, receipt_date, payment_mode, remarks, created_at";

/// Summed amount components across a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::FromRow)]
pub struct TransactionSums {
    pub amount_paise: i64,
    pub discount_amount_paise: i64,
    pub fine_amount_paise: i64,
}

impl TransactionSums {
    /// Combined incoming total (paid + discount + fine).
    pub fn incoming_paise(&self) -> i64 {
        self.amount_paise + self.discount_amount_paise + self.fine_amount_paise
    }

    /// True when every component is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_paise == 0 && self.discount_amount_paise == 0 && self.fine_amount_paise == 0
    }
}

/// One payment mode's share of a day's collection.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ModeCollection {
    pub payment_mode: PaymentMode,
    pub total_paise: i64,
    pub receipt_count: i64,
}

/// Repository for fee transaction log operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Appends one payment event to the log. Runs inside the engine's
    /// payment transaction.
    pub async fn append(
        conn: &mut SqliteConnection,
        new: &NewFeeTransaction,
    ) -> DbResult<FeeTransaction> {
        debug!(
            student_id = new.student_id,
            term = %new.term,
            amount = new.amount_paise,
            receipt_no = %new.receipt_no,
            "appending fee transaction"
        );

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO fee_transactions (
                student_id, student_fees_id, term, academic_year,
                amount_paise, discount_amount_paise, fine_amount_paise,
                receipt_no, receipt_date, payment_mode, remarks, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            RETURNING {FEE_TRANSACTION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, FeeTransaction>(&sql)
            .bind(new.student_id)
            .bind(new.student_fees_id)
            .bind(new.term)
            .bind(&new.academic_year)
            .bind(new.amount_paise)
            .bind(new.discount_amount_paise)
            .bind(new.fine_amount_paise)
            .bind(&new.receipt_no)
            .bind(new.receipt_date)
            .bind(new.payment_mode)
            .bind(&new.remarks)
            .bind(now)
            .fetch_one(&mut *conn)
            .await?;

        Ok(row)
    }

    /// Sums the amount components across all transactions for a
    /// (student, term, year). Zero sums for an empty set.
    pub async fn sums_for_term(
        conn: &mut SqliteConnection,
        student_id: i64,
        term: Term,
        academic_year: &str,
    ) -> DbResult<TransactionSums> {
        let sums = sqlx::query_as::<_, TransactionSums>(
            "SELECT
                COALESCE(SUM(amount_paise), 0) AS amount_paise,
                COALESCE(SUM(discount_amount_paise), 0) AS discount_amount_paise,
                COALESCE(SUM(fine_amount_paise), 0) AS fine_amount_paise
            FROM fee_transactions
            WHERE student_id = ?1 AND term = ?2 AND academic_year = ?3",
        )
        .bind(student_id)
        .bind(term)
        .bind(academic_year)
        .fetch_one(&mut *conn)
        .await?;

        Ok(sums)
    }

    /// Deletes all transactions for a (student, term, year); returns how
    /// many rows were removed. Cancellation only.
    pub async fn delete_for_term(
        conn: &mut SqliteConnection,
        student_id: i64,
        term: Term,
        academic_year: &str,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            "DELETE FROM fee_transactions
             WHERE student_id = ?1 AND term = ?2 AND academic_year = ?3",
        )
        .bind(student_id)
        .bind(term)
        .bind(academic_year)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Lists a student's transactions for a year, oldest first.
    pub async fn list_for_student(
        &self,
        student_id: i64,
        academic_year: &str,
    ) -> DbResult<Vec<FeeTransaction>> {
        let sql = format!(
            "SELECT {FEE_TRANSACTION_COLUMNS} FROM fee_transactions \
             WHERE student_id = ?1 AND academic_year = ?2 \
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, FeeTransaction>(&sql)
            .bind(student_id)
            .bind(academic_year)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Pool-based variant of [`Self::sums_for_term`], for tests and
    /// reporting outside a transaction.
    pub async fn sums_for_term_pooled(
        &self,
        student_id: i64,
        term: Term,
        academic_year: &str,
    ) -> DbResult<TransactionSums> {
        let mut conn = self.pool.acquire().await?;
        Self::sums_for_term(&mut conn, student_id, term, academic_year).await
    }

    /// Highest numeric suffix among `prefix`-style receipt numbers dated
    /// `date`, or 0 when none exist. Feeds receipt-number generation, so it
    /// runs on the payment transaction's connection.
    ///
    /// A MAX over surviving rows rather than a row count: cancellation can
    /// delete earlier same-day receipts, and the next generated number must
    /// still not collide with a survivor.
    pub async fn max_receipt_sequence(
        conn: &mut SqliteConnection,
        date: NaiveDate,
        prefix: &str,
    ) -> DbResult<i64> {
        let max: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(CAST(SUBSTR(receipt_no, ?2) AS INTEGER)), 0)
             FROM fee_transactions
             WHERE receipt_date = ?1 AND receipt_no LIKE ?3",
        )
        .bind(date)
        .bind(prefix.len() as i64 + 1)
        .bind(format!("{prefix}%"))
        .fetch_one(&mut *conn)
        .await?;

        Ok(max)
    }

    /// Per-payment-mode collection totals for one receipt date.
    pub async fn collected_on(&self, date: NaiveDate) -> DbResult<Vec<ModeCollection>> {
        let rows = sqlx::query_as::<_, ModeCollection>(
            "SELECT
                payment_mode,
                COALESCE(SUM(amount_paise), 0) AS total_paise,
                COUNT(*) AS receipt_count
            FROM fee_transactions
            WHERE receipt_date = ?1
            GROUP BY payment_mode
            ORDER BY payment_mode",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
