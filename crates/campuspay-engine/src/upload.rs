//! # Fee Structure Catalog Management
//!
//! Single strict creation and the bulk upload upsert administrators use to
//! load a whole year's catalog at once.
//!
//! Bulk upload is last-write-wins per (grade, term, year) key and collects
//! per-row errors instead of aborting: a 200-row sheet with three bad rows
//! loads 197 and reports three messages.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use campuspay_core::validation::{
    parse_upload_date, validate_academic_year, validate_entity_id, validate_fee_paise,
};
use campuspay_core::{FeeStructure, NewFeeStructure, Term};
use campuspay_db::DbError;

use crate::error::{EngineError, EngineResult};
use crate::FeeEngine;

/// One row of a bulk catalog upload. Dates arrive as day-month-year text,
/// matching the sheets administrators export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStructureUploadRow {
    pub grade_id: i64,
    pub term: Term,
    pub academic_year: String,
    pub term_fees_paise: i64,
    #[serde(default)]
    pub abacus_fees_paise: i64,
    pub start_date: String,
    pub due_date: String,
}

impl FeeStructureUploadRow {
    fn validate(&self) -> EngineResult<NewFeeStructure> {
        validate_entity_id("gradeId", self.grade_id)?;
        validate_academic_year(&self.academic_year)?;
        validate_fee_paise("termFees", self.term_fees_paise)?;
        validate_fee_paise("abacusFees", self.abacus_fees_paise)?;
        let start_date = parse_upload_date("startDate", &self.start_date)?;
        let due_date = parse_upload_date("dueDate", &self.due_date)?;

        Ok(NewFeeStructure {
            grade_id: self.grade_id,
            term: self.term,
            academic_year: self.academic_year.clone(),
            term_fees_paise: self.term_fees_paise,
            abacus_fees_paise: self.abacus_fees_paise,
            start_date,
            due_date,
        })
    }
}

/// Outcome of a bulk catalog upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    /// Rows created or overwritten.
    pub upserted: usize,

    /// One `"row N: message"` entry per rejected row, 1-based.
    pub errors: Vec<String>,
}

impl FeeEngine {
    /// Creates a single catalog entry, failing on a duplicate
    /// (grade, term, year) key.
    #[instrument(skip(self, new), fields(grade_id = new.grade_id, term = %new.term))]
    pub async fn create_fee_structure(&self, new: &NewFeeStructure) -> EngineResult<FeeStructure> {
        validate_entity_id("gradeId", new.grade_id)?;
        validate_academic_year(&new.academic_year)?;
        validate_fee_paise("termFees", new.term_fees_paise)?;
        validate_fee_paise("abacusFees", new.abacus_fees_paise)?;

        match self.db.catalog().insert_strict(new).await {
            Ok(structure) => Ok(structure),
            Err(DbError::UniqueViolation { .. }) => Err(EngineError::conflict(
                "fee structure",
                format!("grade {} {} {}", new.grade_id, new.term, new.academic_year),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Bulk upserts catalog rows.
    ///
    /// Each row validates and writes independently; duplicates of the same
    /// key within one batch resolve to the last row's values. Uploading
    /// the same sheet twice leaves a single catalog row per key.
    pub async fn upload_fee_structures(
        &self,
        rows: &[FeeStructureUploadRow],
    ) -> EngineResult<UploadReport> {
        let catalog = self.db.catalog();
        let mut upserted = 0;
        let mut errors = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let row_no = i + 1;
            let new = match row.validate() {
                Ok(new) => new,
                Err(e) => {
                    errors.push(format!("row {row_no}: {e}"));
                    continue;
                }
            };
            match catalog.upsert(&new).await {
                Ok(_) => upserted += 1,
                Err(DbError::ForeignKeyViolation { .. }) => {
                    errors.push(format!("row {row_no}: grade {} not found", new.grade_id));
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            rows = rows.len(),
            upserted,
            rejected = errors.len(),
            "fee structure upload processed"
        );

        Ok(UploadReport { upserted, errors })
    }
}
