//! # Fee Assignment
//!
//! Provisions zeroed ledger rows for every active student from the catalog
//! entries their grade's schedule covers. Safe to re-run: existing rows are
//! skipped, never overwritten, so a mid-year catalog addition can be rolled
//! out by running the pass again.

use serde::Serialize;
use tracing::{info, instrument};

use campuspay_core::validation::validate_academic_year;
use campuspay_core::TermSchedule;
use campuspay_db::repository::ledger::LedgerRepository;
use campuspay_db::DbError;

use crate::error::EngineResult;
use crate::FeeEngine;

/// A student the assignment pass could not provision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedStudent {
    pub student_id: i64,
    pub reason: String,
}

/// Outcome of one assignment pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentReport {
    pub academic_year: String,

    /// Active students considered.
    pub students_processed: usize,

    /// Ledger rows newly created.
    pub rows_created: usize,

    /// Rows that already existed and were left untouched.
    pub rows_existing: usize,

    /// Students with no class assignment or unresolvable grade.
    pub skipped: Vec<SkippedStudent>,
}

impl FeeEngine {
    /// Provisions ledger rows for all active students in an academic year.
    ///
    /// For each student the grade is resolved through their class, the
    /// grade tier picks the term schedule, and one zeroed ledger row is
    /// created per catalog entry whose term the schedule includes. Terms
    /// outside the schedule (a TERM_3 catalog row against a preKG grade)
    /// are ignored rather than treated as errors.
    ///
    /// The whole pass runs in one store transaction, so a re-run after a
    /// mid-pass failure starts from a clean state.
    #[instrument(skip(self))]
    pub async fn assign_fees(&self, academic_year: &str) -> EngineResult<AssignmentReport> {
        validate_academic_year(academic_year)?;

        let students = self.db.directory().active_students(academic_year).await?;
        let catalog = self.db.catalog();

        let mut rows_created = 0;
        let mut rows_existing = 0;
        let mut skipped = Vec::new();

        // Grade resolution and catalog reads run on the pool; only the
        // provisioning inserts need the transaction.
        let mut plan = Vec::new();
        for student in &students {
            let Some(grade_ref) = self.db.directory().resolve_grade(student.id).await? else {
                skipped.push(SkippedStudent {
                    student_id: student.id,
                    reason: "no class assignment".to_string(),
                });
                continue;
            };

            let schedule = TermSchedule::for_tier(grade_ref.tier);
            let structures = catalog
                .list_for_grade_year(grade_ref.grade_id, academic_year)
                .await?;

            for structure in structures {
                if schedule.includes(structure.term) {
                    plan.push((student.id, structure.id, structure.term));
                }
            }
        }

        let mut tx = self.db.begin().await?;
        for (student_id, structure_id, term) in &plan {
            let created = LedgerRepository::insert_if_absent(
                &mut tx,
                *student_id,
                *structure_id,
                *term,
                academic_year,
            )
            .await?;
            if created {
                rows_created += 1;
            } else {
                rows_existing += 1;
            }
        }
        tx.commit().await.map_err(DbError::from)?;

        info!(
            academic_year,
            students = students.len(),
            rows_created,
            rows_existing,
            skipped = skipped.len(),
            "fee assignment pass complete"
        );

        Ok(AssignmentReport {
            academic_year: academic_year.to_string(),
            students_processed: students.len(),
            rows_created,
            rows_existing,
            skipped,
        })
    }
}
