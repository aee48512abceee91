//! # Payment Cancellation
//!
//! Reverses everything recorded against one (student, term, year):
//! the log rows are deleted, the ledger row is reset to its unpaid state,
//! and the per-student aggregate is decremented by exactly what the log
//! rows summed to. One store transaction, like recording.
//!
//! Cancellation is destructive - the receipts are gone afterwards - so
//! every call is logged at WARN with the amounts it removed.

use serde::Serialize;
use tracing::{instrument, warn};

use campuspay_core::validation::{validate_academic_year, validate_entity_id};
use campuspay_core::Term;
use campuspay_db::repository::ledger::LedgerRepository;
use campuspay_db::repository::totals::{TotalsDelta, TotalsRepository};
use campuspay_db::repository::transactions::TransactionRepository;
use campuspay_db::DbError;

use crate::error::EngineResult;
use crate::FeeEngine;

/// What a cancellation removed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationSummary {
    pub student_id: i64,
    pub term: Term,
    pub academic_year: String,

    /// Log rows deleted.
    pub receipts_removed: u64,

    /// Paid amount reversed, in paise.
    pub amount_reversed_paise: i64,

    /// Discount reversed, in paise.
    pub discount_reversed_paise: i64,

    /// Fine reversed, in paise.
    pub fine_reversed_paise: i64,

    /// Whether a ledger row existed and was reset.
    pub ledger_reset: bool,
}

impl FeeEngine {
    /// Cancels all payments for a (student, term, year).
    ///
    /// Tolerant of partial state: a term with no log rows, or no ledger
    /// row at all, cancels to a no-op summary rather than an error. The
    /// aggregate is only decremented by what actually existed, so
    /// cancelling twice cannot drive totals negative.
    #[instrument(skip(self))]
    pub async fn cancel_payments(
        &self,
        student_id: i64,
        term: Term,
        academic_year: &str,
    ) -> EngineResult<CancellationSummary> {
        validate_entity_id("studentId", student_id)?;
        validate_academic_year(academic_year)?;

        let mut tx = self.db.begin().await?;

        // Sum what the log says before deleting it; the decrement must
        // mirror exactly what recording accumulated.
        let sums =
            TransactionRepository::sums_for_term(&mut tx, student_id, term, academic_year).await?;

        let ledger_row =
            LedgerRepository::get_for_term_in(&mut tx, student_id, term, academic_year).await?;
        let abacus_paise = ledger_row.as_ref().map(|r| r.abacus_amount_paise).unwrap_or(0);

        let receipts_removed =
            TransactionRepository::delete_for_term(&mut tx, student_id, term, academic_year)
                .await?;

        let ledger_reset =
            LedgerRepository::reset_term(&mut tx, student_id, term, academic_year).await? > 0;

        if !sums.is_zero() || abacus_paise != 0 {
            TotalsRepository::apply_decrement(
                &mut tx,
                student_id,
                &TotalsDelta {
                    paid_paise: sums.amount_paise,
                    discount_paise: sums.discount_amount_paise,
                    fine_paise: sums.fine_amount_paise,
                    fee_paise: sums.incoming_paise(),
                    abacus_paise,
                },
            )
            .await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        warn!(
            student_id,
            term = %term,
            academic_year,
            receipts_removed,
            amount_reversed = sums.amount_paise,
            "payments cancelled"
        );

        Ok(CancellationSummary {
            student_id,
            term,
            academic_year: academic_year.to_string(),
            receipts_removed,
            amount_reversed_paise: sums.amount_paise,
            discount_reversed_paise: sums.discount_amount_paise,
            fine_reversed_paise: sums.fine_amount_paise,
            ledger_reset,
        })
    }
}
