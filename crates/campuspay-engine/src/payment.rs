//! # Payment Recording
//!
//! The core reconciliation write path.
//!
//! ## The Atomic Triad
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  BEGIN TRANSACTION                                                  │
//! │                                                                     │
//! │   1. Read ledger row + catalog entry + grade tier                   │
//! │   2. due = expected - paid - discount + fine                        │
//! │   3. GUARD: incoming (amount+discount+fine) must not exceed due     │
//! │   4. Ledger row    : cumulative amounts +=, receipt stamped         │
//! │   5. Transaction   : one append-only log row                        │
//! │   6. Aggregate     : per-student totals incremented                 │
//! │                                                                     │
//! │  COMMIT - all three or none                                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guard reads the ledger row inside the same transaction it writes,
//! so concurrent payments against one term serialize at the store and the
//! second one re-evaluates against the first one's committed balance.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use campuspay_core::schedule::{check_overpayment, due_amount, expected_for_term};
use campuspay_core::validation::{
    validate_academic_year, validate_adjustment_paise, validate_entity_id,
    validate_payment_paise, validate_receipt_no, validate_remarks,
};
use campuspay_core::{
    FeeTransaction, Money, NewFeeTransaction, PaymentMode, StudentFees, Term, TermSchedule,
};
use campuspay_db::repository::catalog::CatalogRepository;
use campuspay_db::repository::directory::DirectoryRepository;
use campuspay_db::repository::ledger::{LedgerRepository, PaymentDeltas};
use campuspay_db::repository::totals::{TotalsDelta, TotalsRepository};
use campuspay_db::repository::transactions::TransactionRepository;

use crate::error::{EngineError, EngineResult};
use crate::FeeEngine;

/// One payment to record against a (student, term, year).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub student_id: i64,
    pub term: Term,
    pub academic_year: String,

    /// Amount tendered, in paise. Strictly positive.
    pub amount_paise: i64,

    /// Discount granted alongside this payment, in paise.
    #[serde(default)]
    pub discount_paise: i64,

    /// Fine collected alongside this payment, in paise.
    #[serde(default)]
    pub fine_paise: i64,

    pub payment_mode: PaymentMode,

    /// Caller-supplied receipt number; generated when absent.
    #[serde(default)]
    pub receipt_no: Option<String>,

    /// Receipt date; defaults to today.
    #[serde(default)]
    pub receipt_date: Option<NaiveDate>,

    #[serde(default)]
    pub remarks: Option<String>,
}

impl PaymentRequest {
    fn validate(&self) -> EngineResult<()> {
        validate_entity_id("studentId", self.student_id)?;
        validate_academic_year(&self.academic_year)?;
        validate_payment_paise(self.amount_paise)?;
        validate_adjustment_paise("discount", self.discount_paise)?;
        validate_adjustment_paise("fine", self.fine_paise)?;
        if let Some(receipt_no) = &self.receipt_no {
            validate_receipt_no(receipt_no)?;
        }
        if let Some(remarks) = &self.remarks {
            validate_remarks(remarks)?;
        }
        Ok(())
    }

    /// Combined incoming total the overpayment guard checks.
    fn incoming(&self) -> Money {
        Money::from_paise(self.amount_paise + self.discount_paise + self.fine_paise)
    }
}

/// Result of a successful payment: the logged receipt, the ledger row it
/// moved, and what remains due on that term.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub transaction: FeeTransaction,
    pub ledger: StudentFees,
    pub remaining_due_paise: i64,
}

/// Per-row outcome of a bulk payment batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRowOutcome {
    pub student_id: i64,
    pub term: Term,
    pub success: bool,
    pub receipt_no: Option<String>,
    pub message: Option<String>,
}

/// Summary of a bulk payment batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPaymentReport {
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<PaymentRowOutcome>,
}

impl FeeEngine {
    /// Records one payment against a (student, term, year) ledger row.
    ///
    /// The whole operation is a single store transaction: the overpayment
    /// guard, the ledger update, the log append and the aggregate bump
    /// commit together or not at all. On [`EngineError::Overpayment`]
    /// nothing is written.
    #[instrument(skip(self, request), fields(student_id = request.student_id, term = %request.term))]
    pub async fn record_payment(&self, request: &PaymentRequest) -> EngineResult<PaymentReceipt> {
        request.validate()?;

        let mut tx = self.db.begin().await?;

        let ledger_row = LedgerRepository::get_for_term_in(
            &mut tx,
            request.student_id,
            request.term,
            &request.academic_year,
        )
        .await?
        .ok_or_else(|| {
            EngineError::not_found(
                "student fee ledger row",
                format!(
                    "student {} {} {}",
                    request.student_id, request.term, request.academic_year
                ),
            )
        })?;

        let structure = CatalogRepository::get_by_id_in(&mut tx, ledger_row.fee_structure_id)
            .await?
            .ok_or_else(|| {
                EngineError::not_found("fee structure", ledger_row.fee_structure_id.to_string())
            })?;

        let tier = DirectoryRepository::grade_tier_in(&mut tx, structure.grade_id)
            .await?
            .ok_or_else(|| EngineError::not_found("grade", structure.grade_id.to_string()))?;
        let schedule = TermSchedule::for_tier(tier);

        let expected = expected_for_term(&structure, &schedule)?;
        let due = due_amount(
            expected,
            Money::from_paise(ledger_row.paid_amount_paise),
            Money::from_paise(ledger_row.discount_amount_paise),
            Money::from_paise(ledger_row.fine_amount_paise),
        );

        if let Err(e) = check_overpayment(request.term, due, request.incoming()) {
            warn!(
                student_id = request.student_id,
                term = %request.term,
                due = %due,
                attempted = %request.incoming(),
                "overpayment rejected"
            );
            return Err(e.into());
        }

        // Abacus share of this payment: the slice of paid + discount
        // coverage that lands above the base term fee on the add-on term,
        // capped at the add-on fee. Recorded separately so cancellation and
        // the status calculator can tell the add-on apart from the base.
        let abacus_delta_paise = if schedule.carries_addon(request.term) {
            let covered = |paid: i64, discount: i64| {
                (paid + discount - structure.term_fees_paise)
                    .clamp(0, structure.abacus_fees_paise)
            };
            let prior = covered(ledger_row.paid_amount_paise, ledger_row.discount_amount_paise);
            let after = covered(
                ledger_row.paid_amount_paise + request.amount_paise,
                ledger_row.discount_amount_paise + request.discount_paise,
            );
            after - prior
        } else {
            0
        };

        let receipt_date = request.receipt_date.unwrap_or_else(|| Utc::now().date_naive());
        let receipt_no = match &request.receipt_no {
            Some(r) => r.trim().to_string(),
            None => {
                let prefix = format!("RCP-{}-", receipt_date.format("%Y%m%d"));
                let sequence =
                    TransactionRepository::max_receipt_sequence(&mut tx, receipt_date, &prefix)
                        .await?
                        + 1;
                format!("{prefix}{sequence:04}")
            }
        };

        let deltas = PaymentDeltas {
            amount_paise: request.amount_paise,
            discount_paise: request.discount_paise,
            fine_paise: request.fine_paise,
            abacus_paise: abacus_delta_paise,
            receipt_no: &receipt_no,
            receipt_date,
            payment_mode: request.payment_mode,
            remarks: request.remarks.as_deref(),
        };
        LedgerRepository::apply_payment(&mut tx, ledger_row.id, &deltas).await?;

        let transaction = TransactionRepository::append(
            &mut tx,
            &NewFeeTransaction {
                student_id: request.student_id,
                student_fees_id: ledger_row.id,
                term: request.term,
                academic_year: request.academic_year.clone(),
                amount_paise: request.amount_paise,
                discount_amount_paise: request.discount_paise,
                fine_amount_paise: request.fine_paise,
                receipt_no: receipt_no.clone(),
                receipt_date,
                payment_mode: request.payment_mode,
                remarks: request.remarks.clone(),
            },
        )
        .await?;

        TotalsRepository::apply_increment(
            &mut tx,
            request.student_id,
            &TotalsDelta {
                paid_paise: request.amount_paise,
                discount_paise: request.discount_paise,
                fine_paise: request.fine_paise,
                fee_paise: request.amount_paise + request.discount_paise + request.fine_paise,
                abacus_paise: abacus_delta_paise,
            },
        )
        .await?;

        let ledger = LedgerRepository::get_by_id_in(&mut tx, ledger_row.id).await?;

        tx.commit().await.map_err(campuspay_db::DbError::from)?;

        let remaining = due - request.incoming();
        info!(
            student_id = request.student_id,
            term = %request.term,
            amount = request.amount_paise,
            receipt_no = %receipt_no,
            remaining_due = remaining.paise(),
            "payment recorded"
        );

        Ok(PaymentReceipt {
            transaction,
            ledger,
            remaining_due_paise: remaining.paise(),
        })
    }

    /// Records a batch of payments, one store transaction per row.
    ///
    /// Rows are independent: a failed row (overpayment, unknown student)
    /// is reported and does not abort the rest of the batch.
    pub async fn record_payments(&self, requests: &[PaymentRequest]) -> BulkPaymentReport {
        let mut outcomes = Vec::with_capacity(requests.len());
        let mut succeeded = 0;

        for request in requests {
            match self.record_payment(request).await {
                Ok(receipt) => {
                    succeeded += 1;
                    outcomes.push(PaymentRowOutcome {
                        student_id: request.student_id,
                        term: request.term,
                        success: true,
                        receipt_no: Some(receipt.transaction.receipt_no),
                        message: None,
                    });
                }
                Err(e) => {
                    outcomes.push(PaymentRowOutcome {
                        student_id: request.student_id,
                        term: request.term,
                        success: false,
                        receipt_no: None,
                        message: Some(e.to_string()),
                    });
                }
            }
        }

        BulkPaymentReport {
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
        }
    }
}
