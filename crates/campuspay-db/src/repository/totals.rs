//! # Student Totals Repository
//!
//! Database operations for the denormalized per-student aggregate.
//!
//! The aggregate is maintained incrementally: every payment increments it
//! and every cancellation decrements it, always inside the same transaction
//! as the ledger and log writes. `recompute_for_student` exists as the
//! drift-repair escape hatch.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use campuspay_core::StudentTotalFees;

const TOTALS_COLUMNS: &str = "\
    student_id, total_paid_paise, total_discount_paise, total_fine_paise, \
    total_fee_paise, total_abacus_paise, updated_at";

/// Amount components moved by one payment or cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalsDelta {
    pub paid_paise: i64,
    pub discount_paise: i64,
    pub fine_paise: i64,
    /// Combined incoming total (paid + discount + fine).
    pub fee_paise: i64,
    pub abacus_paise: i64,
}

/// Repository for the per-student running totals.
#[derive(Debug, Clone)]
pub struct TotalsRepository {
    pool: SqlitePool,
}

impl TotalsRepository {
    /// Creates a new TotalsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TotalsRepository { pool }
    }

    /// Gets the aggregate row for a student.
    pub async fn get(&self, student_id: i64) -> DbResult<Option<StudentTotalFees>> {
        let sql = format!("SELECT {TOTALS_COLUMNS} FROM student_total_fees WHERE student_id = ?1");
        let row = sqlx::query_as::<_, StudentTotalFees>(&sql)
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Increments the aggregate for a payment, inserting a fresh row with
    /// the delta values when none exists yet.
    pub async fn apply_increment(
        conn: &mut SqliteConnection,
        student_id: i64,
        delta: &TotalsDelta,
    ) -> DbResult<()> {
        debug!(student_id, incoming = delta.fee_paise, "incrementing student totals");

        let now = Utc::now();
        sqlx::query(
            "INSERT INTO student_total_fees (
                student_id, total_paid_paise, total_discount_paise, total_fine_paise,
                total_fee_paise, total_abacus_paise, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (student_id) DO UPDATE SET
                total_paid_paise = total_paid_paise + excluded.total_paid_paise,
                total_discount_paise = total_discount_paise + excluded.total_discount_paise,
                total_fine_paise = total_fine_paise + excluded.total_fine_paise,
                total_fee_paise = total_fee_paise + excluded.total_fee_paise,
                total_abacus_paise = total_abacus_paise + excluded.total_abacus_paise,
                updated_at = excluded.updated_at",
        )
        .bind(student_id)
        .bind(delta.paid_paise)
        .bind(delta.discount_paise)
        .bind(delta.fine_paise)
        .bind(delta.fee_paise)
        .bind(delta.abacus_paise)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Decrements the aggregate by the amounts a cancellation removed.
    ///
    /// A missing aggregate row affects zero rows, which is tolerated: it
    /// means nothing was ever recorded to undo.
    pub async fn apply_decrement(
        conn: &mut SqliteConnection,
        student_id: i64,
        delta: &TotalsDelta,
    ) -> DbResult<()> {
        debug!(student_id, removed = delta.fee_paise, "decrementing student totals");

        let now = Utc::now();
        sqlx::query(
            "UPDATE student_total_fees SET
                total_paid_paise = total_paid_paise - ?2,
                total_discount_paise = total_discount_paise - ?3,
                total_fine_paise = total_fine_paise - ?4,
                total_fee_paise = total_fee_paise - ?5,
                total_abacus_paise = total_abacus_paise - ?6,
                updated_at = ?7
            WHERE student_id = ?1",
        )
        .bind(student_id)
        .bind(delta.paid_paise)
        .bind(delta.discount_paise)
        .bind(delta.fine_paise)
        .bind(delta.fee_paise)
        .bind(delta.abacus_paise)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Recomputes the aggregate from the student's ledger rows and upserts
    /// it - drift repair for the denormalized total.
    pub async fn recompute_for_student(&self, student_id: i64) -> DbResult<StudentTotalFees> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO student_total_fees (
                student_id, total_paid_paise, total_discount_paise, total_fine_paise,
                total_fee_paise, total_abacus_paise, updated_at
            )
            SELECT
                ?1,
                COALESCE(SUM(paid_amount_paise), 0),
                COALESCE(SUM(discount_amount_paise), 0),
                COALESCE(SUM(fine_amount_paise), 0),
                COALESCE(SUM(paid_amount_paise + discount_amount_paise + fine_amount_paise), 0),
                COALESCE(SUM(abacus_amount_paise), 0),
                ?2
            FROM student_fees
            WHERE student_id = ?1
            ON CONFLICT (student_id) DO UPDATE SET
                total_paid_paise = excluded.total_paid_paise,
                total_discount_paise = excluded.total_discount_paise,
                total_fine_paise = excluded.total_fine_paise,
                total_fee_paise = excluded.total_fee_paise,
                total_abacus_paise = excluded.total_abacus_paise,
                updated_at = excluded.updated_at
            RETURNING {TOTALS_COLUMNS}"
        );
        let row = sqlx::query_as::<_, StudentTotalFees>(&sql)
            .bind(student_id)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }
}
