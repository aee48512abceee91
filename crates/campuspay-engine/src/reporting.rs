//! # Reporting
//!
//! Read-only views: the merged per-student fee summary (catalog expectation
//! against ledger reality, term by term) and the daily collection register.
//! Reports run on the pool, outside any write transaction.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

use campuspay_core::schedule::{due_amount, expected_for_term, term_status};
use campuspay_core::validation::{validate_academic_year, validate_entity_id};
use campuspay_core::{Money, StudentTotalFees, Term, TermSchedule, TermStatus};
use campuspay_db::repository::transactions::ModeCollection;

use crate::error::{EngineError, EngineResult};
use crate::FeeEngine;

/// One term's line in a student fee summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermFeeLine {
    pub term: Term,
    pub expected_paise: i64,
    pub paid_paise: i64,
    pub discount_paise: i64,
    pub fine_paise: i64,

    /// Outstanding for this term, floored at zero for display.
    pub due_paise: i64,

    pub settled: bool,
    pub due_date: NaiveDate,
    pub receipt_no: Option<String>,
    pub receipt_date: Option<NaiveDate>,
}

/// Merged catalog + ledger view for one student and year.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFeeSummary {
    pub student_id: i64,
    pub academic_year: String,
    pub lines: Vec<TermFeeLine>,

    pub total_expected_paise: i64,
    pub total_paid_paise: i64,
    pub total_discount_paise: i64,
    pub total_fine_paise: i64,
    pub total_due_paise: i64,

    pub status: TermStatus,

    /// Human-facing status label, e.g. `"2 Term(s) Paid"`.
    pub status_label: String,
}

/// The day's collection register, broken down by payment mode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCollection {
    pub date: NaiveDate,
    pub modes: Vec<ModeCollection>,
    pub total_paise: i64,
    pub receipt_count: i64,
}

impl FeeEngine {
    /// Builds the per-term fee summary for one student and year.
    ///
    /// Lines appear in schedule order, one per catalog entry the grade's
    /// schedule covers. A term that was never provisioned still gets a
    /// line - fully due - so the summary shows the whole year's picture.
    #[instrument(skip(self))]
    pub async fn student_fee_summary(
        &self,
        student_id: i64,
        academic_year: &str,
    ) -> EngineResult<StudentFeeSummary> {
        validate_entity_id("studentId", student_id)?;
        validate_academic_year(academic_year)?;

        let grade_ref = self
            .db
            .directory()
            .resolve_grade(student_id)
            .await?
            .ok_or_else(|| {
                EngineError::not_found("student with class assignment", student_id.to_string())
            })?;
        let schedule = TermSchedule::for_tier(grade_ref.tier);

        let structures = self
            .db
            .catalog()
            .list_for_grade_year(grade_ref.grade_id, academic_year)
            .await?;
        let ledger_rows = self
            .db
            .ledger()
            .list_for_student_year(student_id, academic_year)
            .await?;

        let mut lines = Vec::with_capacity(schedule.term_count());
        // Status thresholds accumulate over the base term fees; the abacus
        // add-on rides on top and counts toward coverage instead.
        let mut base_total = Money::zero();
        let mut total_expected = Money::zero();
        let mut total_paid = Money::zero();
        let mut total_discount = Money::zero();
        let mut total_fine = Money::zero();
        let mut total_abacus = Money::zero();

        for term in schedule.terms() {
            let Some(structure) = structures.iter().find(|s| s.term == term) else {
                continue;
            };
            let row = ledger_rows.iter().find(|r| r.term == term);

            let expected = expected_for_term(structure, &schedule)?;
            let paid = Money::from_paise(row.map(|r| r.paid_amount_paise).unwrap_or(0));
            let discount = Money::from_paise(row.map(|r| r.discount_amount_paise).unwrap_or(0));
            let fine = Money::from_paise(row.map(|r| r.fine_amount_paise).unwrap_or(0));
            let abacus = Money::from_paise(row.map(|r| r.abacus_amount_paise).unwrap_or(0));
            let due = due_amount(expected, paid, discount, fine);

            base_total += Money::from_paise(structure.term_fees_paise);
            total_expected += expected;
            total_paid += paid;
            total_discount += discount;
            total_fine += fine;
            total_abacus += abacus;

            lines.push(TermFeeLine {
                term,
                expected_paise: expected.paise(),
                paid_paise: paid.paise(),
                discount_paise: discount.paise(),
                fine_paise: fine.paise(),
                due_paise: due.paise().max(0),
                settled: due.paise() <= 0,
                due_date: structure.due_date,
                receipt_no: row.and_then(|r| r.receipt_no.clone()),
                receipt_date: row.and_then(|r| r.receipt_date),
            });
        }

        let total_due = Money::from_paise(lines.iter().map(|l| l.due_paise).sum());
        // The abacus share is recorded inside the paid amount; split it back
        // out so coverage counts it once against the base-fee thresholds.
        let status = term_status(
            total_paid - total_abacus,
            total_abacus,
            base_total,
            total_due,
            &schedule,
        );

        Ok(StudentFeeSummary {
            student_id,
            academic_year: academic_year.to_string(),
            lines,
            total_expected_paise: total_expected.paise(),
            total_paid_paise: total_paid.paise(),
            total_discount_paise: total_discount.paise(),
            total_fine_paise: total_fine.paise(),
            total_due_paise: total_due.paise(),
            status,
            status_label: status.to_string(),
        })
    }

    /// The denormalized running totals for a student, if any payments have
    /// ever been recorded.
    pub async fn student_totals(&self, student_id: i64) -> EngineResult<Option<StudentTotalFees>> {
        validate_entity_id("studentId", student_id)?;
        Ok(self.db.totals().get(student_id).await?)
    }

    /// Rebuilds a student's aggregate from their ledger rows. Drift repair;
    /// the normal write paths keep the aggregate in step incrementally.
    pub async fn recompute_totals(&self, student_id: i64) -> EngineResult<StudentTotalFees> {
        validate_entity_id("studentId", student_id)?;
        Ok(self.db.totals().recompute_for_student(student_id).await?)
    }

    /// Per-payment-mode collection totals for one receipt date.
    #[instrument(skip(self))]
    pub async fn daily_collection(&self, date: NaiveDate) -> EngineResult<DailyCollection> {
        let modes = self.db.transactions().collected_on(date).await?;
        let total_paise = modes.iter().map(|m| m.total_paise).sum();
        let receipt_count = modes.iter().map(|m| m.receipt_count).sum();

        Ok(DailyCollection {
            date,
            modes,
            total_paise,
            receipt_count,
        })
    }
}
