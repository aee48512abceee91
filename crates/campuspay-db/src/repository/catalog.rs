//! # Fee Structure Catalog Repository
//!
//! Database operations for the fee structure catalog. Catalog entries are
//! created by administrators (single create or bulk upload upsert) and are
//! read-only to the reconciliation engine.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use campuspay_core::{FeeStructure, NewFeeStructure, Term};

const FEE_STRUCTURE_COLUMNS: &str = "\
    id, grade_id, term, academic_year, term_fees_paise, abacus_fees_paise, \
    start_date, due_date, created_at, updated_at";

/// Repository for fee structure catalog operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a catalog entry by its unique (grade, term, year) key.
    pub async fn get(
        &self,
        grade_id: i64,
        term: Term,
        academic_year: &str,
    ) -> DbResult<Option<FeeStructure>> {
        let sql = format!(
            "SELECT {FEE_STRUCTURE_COLUMNS} FROM fee_structures \
             WHERE grade_id = ?1 AND term = ?2 AND academic_year = ?3"
        );
        let structure = sqlx::query_as::<_, FeeStructure>(&sql)
            .bind(grade_id)
            .bind(term)
            .bind(academic_year)
            .fetch_optional(&self.pool)
            .await?;

        Ok(structure)
    }

    /// Gets a catalog entry by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<FeeStructure>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_by_id_in(&mut conn, id).await
    }

    /// Gets a catalog entry by id on an existing connection/transaction.
    pub async fn get_by_id_in(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> DbResult<Option<FeeStructure>> {
        let sql = format!("SELECT {FEE_STRUCTURE_COLUMNS} FROM fee_structures WHERE id = ?1");
        let structure = sqlx::query_as::<_, FeeStructure>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(structure)
    }

    /// Lists all catalog entries for a (grade, year), in term order.
    pub async fn list_for_grade_year(
        &self,
        grade_id: i64,
        academic_year: &str,
    ) -> DbResult<Vec<FeeStructure>> {
        let sql = format!(
            "SELECT {FEE_STRUCTURE_COLUMNS} FROM fee_structures \
             WHERE grade_id = ?1 AND academic_year = ?2 \
             ORDER BY term"
        );
        let structures = sqlx::query_as::<_, FeeStructure>(&sql)
            .bind(grade_id)
            .bind(academic_year)
            .fetch_all(&self.pool)
            .await?;

        Ok(structures)
    }

    /// Creates or updates a catalog entry, keyed on (grade, term, year).
    ///
    /// An existing row gets its fees and dates overwritten; `created_at`
    /// is preserved. Returns the row as stored.
    pub async fn upsert(&self, new: &NewFeeStructure) -> DbResult<FeeStructure> {
        debug!(
            grade_id = new.grade_id,
            term = %new.term,
            academic_year = %new.academic_year,
            "upserting fee structure"
        );

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO fee_structures (
                grade_id, term, academic_year, term_fees_paise, abacus_fees_paise,
                start_date, due_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            ON CONFLICT (grade_id, term, academic_year) DO UPDATE SET
                term_fees_paise = excluded.term_fees_paise,
                abacus_fees_paise = excluded.abacus_fees_paise,
                start_date = excluded.start_date,
                due_date = excluded.due_date,
                updated_at = excluded.updated_at
            RETURNING {FEE_STRUCTURE_COLUMNS}"
        );
        let structure = sqlx::query_as::<_, FeeStructure>(&sql)
            .bind(new.grade_id)
            .bind(new.term)
            .bind(&new.academic_year)
            .bind(new.term_fees_paise)
            .bind(new.abacus_fees_paise)
            .bind(new.start_date)
            .bind(new.due_date)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(structure)
    }

    /// Strict insert: fails with [`DbError::UniqueViolation`] when the
    /// (grade, term, year) key already exists. Used by the non-upsert
    /// create path so callers can surface a conflict distinctly.
    pub async fn insert_strict(&self, new: &NewFeeStructure) -> DbResult<FeeStructure> {
        debug!(
            grade_id = new.grade_id,
            term = %new.term,
            academic_year = %new.academic_year,
            "inserting fee structure"
        );

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO fee_structures (
                grade_id, term, academic_year, term_fees_paise, abacus_fees_paise,
                start_date, due_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            RETURNING {FEE_STRUCTURE_COLUMNS}"
        );
        let structure = sqlx::query_as::<_, FeeStructure>(&sql)
            .bind(new.grade_id)
            .bind(new.term)
            .bind(&new.academic_year)
            .bind(new.term_fees_paise)
            .bind(new.abacus_fees_paise)
            .bind(new.start_date)
            .bind(new.due_date)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(structure)
    }

    /// Deletes a catalog entry by id. Reset tooling only; fails if ledger
    /// rows still reference it (FK).
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM fee_structures WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("fee structure", id.to_string()));
        }

        Ok(())
    }
}
