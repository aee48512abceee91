//! Integration tests for the payment write path: the atomic triad,
//! the overpayment guard, and cancellation as its exact inverse.

mod common;

use campuspay_core::Term;
use campuspay_engine::EngineError;
use common::{payment, provisioned_school, rupees, YEAR};

#[tokio::test]
async fn payment_moves_ledger_log_and_aggregate_together() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    let receipt = engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(1000)))
        .await
        .unwrap();

    assert_eq!(receipt.ledger.paid_amount_paise, rupees(1000));
    assert_eq!(receipt.remaining_due_paise, rupees(3000));
    assert!(receipt.transaction.receipt_no.starts_with("RCP-"));

    // Log row matches the ledger delta.
    let log = engine
        .db()
        .transactions()
        .list_for_student(school.student_id, YEAR)
        .await
        .unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].amount_paise, rupees(1000));
    assert_eq!(log[0].term, Term::Term1);

    // Aggregate moved by the same amount.
    let totals = engine.student_totals(school.student_id).await.unwrap().unwrap();
    assert_eq!(totals.total_paid_paise, rupees(1000));
    assert_eq!(totals.total_fee_paise, rupees(1000));
}

#[tokio::test]
async fn repeated_payments_accumulate_on_one_ledger_row() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(1000)))
        .await
        .unwrap();
    let second = engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(2500)))
        .await
        .unwrap();

    assert_eq!(second.ledger.paid_amount_paise, rupees(3500));
    assert_eq!(second.remaining_due_paise, rupees(500));

    let log = engine
        .db()
        .transactions()
        .list_for_student(school.student_id, YEAR)
        .await
        .unwrap();
    assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn overpayment_is_rejected_and_writes_nothing() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    // ₹1000 of ₹4000 paid leaves ₹3000 due; ₹3500 must bounce.
    engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(1000)))
        .await
        .unwrap();

    let err = engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(3500)))
        .await
        .unwrap_err();
    match err {
        EngineError::Overpayment { due, attempted, .. } => {
            assert_eq!(due.paise(), rupees(3000));
            assert_eq!(attempted.paise(), rupees(3500));
        }
        other => panic!("expected overpayment, got {other}"),
    }

    // Nothing moved: still one log row, ledger and aggregate unchanged.
    let ledger = engine
        .db()
        .ledger()
        .get_for_term(school.student_id, Term::Term1, YEAR)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ledger.paid_amount_paise, rupees(1000));

    let log = engine
        .db()
        .transactions()
        .list_for_student(school.student_id, YEAR)
        .await
        .unwrap();
    assert_eq!(log.len(), 1);

    let totals = engine.student_totals(school.student_id).await.unwrap().unwrap();
    assert_eq!(totals.total_paid_paise, rupees(1000));
}

#[tokio::test]
async fn discount_and_fine_count_toward_the_guard() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    let mut request = payment(school.student_id, Term::Term1, rupees(3800));
    request.discount_paise = rupees(300);
    // 3800 + 300 = 4100 > 4000 due.
    assert!(matches!(
        engine.record_payment(&request).await,
        Err(EngineError::Overpayment { .. })
    ));

    request.discount_paise = rupees(200);
    let receipt = engine.record_payment(&request).await.unwrap();
    assert_eq!(receipt.remaining_due_paise, 0);
    assert_eq!(receipt.ledger.discount_amount_paise, rupees(200));
}

#[tokio::test]
async fn abacus_term_allows_exact_settlement_of_base_plus_addon() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    // TERM_2 carries the ₹500 abacus add-on: expected ₹4500.
    let receipt = engine
        .record_payment(&payment(school.student_id, Term::Term2, rupees(4500)))
        .await
        .unwrap();
    assert_eq!(receipt.remaining_due_paise, 0);

    assert!(matches!(
        engine
            .record_payment(&payment(school.student_id, Term::Term2, rupees(1)))
            .await,
        Err(EngineError::Overpayment { .. })
    ));
}

#[tokio::test]
async fn pre_kg_term_carries_no_addon() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    // PreKG TERM_2 expected is the bare ₹4000.
    let receipt = engine
        .record_payment(&payment(school.pre_kg_student_id, Term::Term2, rupees(4000)))
        .await
        .unwrap();
    assert_eq!(receipt.remaining_due_paise, 0);
}

#[tokio::test]
async fn abacus_share_accrues_only_on_the_addon_term() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    // Base-only terms never accrue an abacus share.
    let term1 = engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(4000)))
        .await
        .unwrap();
    assert_eq!(term1.ledger.abacus_amount_paise, 0);

    // TERM_2: first ₹3000 sits below the ₹4000 base, no abacus yet.
    let partial = engine
        .record_payment(&payment(school.student_id, Term::Term2, rupees(3000)))
        .await
        .unwrap();
    assert_eq!(partial.ledger.abacus_amount_paise, 0);

    // The next ₹1500 crosses the base; ₹500 of it is the add-on.
    let settled = engine
        .record_payment(&payment(school.student_id, Term::Term2, rupees(1500)))
        .await
        .unwrap();
    assert_eq!(settled.ledger.paid_amount_paise, rupees(4500));
    assert_eq!(settled.ledger.abacus_amount_paise, rupees(500));

    let totals = engine.student_totals(school.student_id).await.unwrap().unwrap();
    assert_eq!(totals.total_abacus_paise, rupees(500));
    assert_eq!(totals.total_paid_paise, rupees(8500));

    // PreKG has no add-on slot at all.
    let pre_kg = engine
        .record_payment(&payment(school.pre_kg_student_id, Term::Term2, rupees(4000)))
        .await
        .unwrap();
    assert_eq!(pre_kg.ledger.abacus_amount_paise, 0);
}

#[tokio::test]
async fn cancelling_the_addon_term_reverses_the_abacus_share() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    engine
        .record_payment(&payment(school.student_id, Term::Term2, rupees(4500)))
        .await
        .unwrap();
    let totals = engine.student_totals(school.student_id).await.unwrap().unwrap();
    assert_eq!(totals.total_abacus_paise, rupees(500));

    engine
        .cancel_payments(school.student_id, Term::Term2, YEAR)
        .await
        .unwrap();

    let ledger = engine
        .db()
        .ledger()
        .get_for_term(school.student_id, Term::Term2, YEAR)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ledger.abacus_amount_paise, 0);

    let totals = engine.student_totals(school.student_id).await.unwrap().unwrap();
    assert_eq!(totals.total_abacus_paise, 0);
    assert_eq!(totals.total_paid_paise, 0);
}

#[tokio::test]
async fn recompute_preserves_the_abacus_split() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    engine
        .record_payment(&payment(school.student_id, Term::Term2, rupees(4500)))
        .await
        .unwrap();

    let rebuilt = engine.recompute_totals(school.student_id).await.unwrap();
    assert_eq!(rebuilt.total_abacus_paise, rupees(500));
    assert_eq!(rebuilt.total_paid_paise, rupees(4500));
}

#[tokio::test]
async fn payment_against_unprovisioned_term_is_not_found() {
    let school = provisioned_school().await;

    // PreKG runs a two-term schedule; assignment never provisioned TERM_3.
    let err = school
        .engine
        .record_payment(&payment(school.pre_kg_student_id, Term::Term3, rupees(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[tokio::test]
async fn generated_receipt_numbers_sequence_within_a_day() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    let first = engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(100)))
        .await
        .unwrap();
    let second = engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(100)))
        .await
        .unwrap();

    assert!(first.transaction.receipt_no.ends_with("-0001"));
    assert!(second.transaction.receipt_no.ends_with("-0002"));
}

#[tokio::test]
async fn generated_receipt_numbers_skip_cancelled_suffixes() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(100)))
        .await
        .unwrap();
    engine
        .record_payment(&payment(school.student_id, Term::Term3, rupees(100)))
        .await
        .unwrap();

    // Cancelling TERM_1 deletes receipt -0001; -0002 survives, and the
    // next generated number must not collide with it.
    engine
        .cancel_payments(school.student_id, Term::Term1, YEAR)
        .await
        .unwrap();
    let next = engine
        .record_payment(&payment(school.student_id, Term::Term4, rupees(100)))
        .await
        .unwrap();
    assert!(next.transaction.receipt_no.ends_with("-0003"));
}

#[tokio::test]
async fn caller_supplied_receipt_number_is_kept() {
    let school = provisioned_school().await;

    let mut request = payment(school.student_id, Term::Term1, rupees(100));
    request.receipt_no = Some("OFFICE-7781".to_string());
    let receipt = school.engine.record_payment(&request).await.unwrap();
    assert_eq!(receipt.transaction.receipt_no, "OFFICE-7781");
    assert_eq!(receipt.ledger.receipt_no.as_deref(), Some("OFFICE-7781"));
}

#[tokio::test]
async fn zero_amount_payment_is_rejected_before_any_lookup() {
    let school = provisioned_school().await;

    let err = school
        .engine
        .record_payment(&payment(school.student_id, Term::Term1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn bulk_batch_reports_per_row_and_keeps_going() {
    let school = provisioned_school().await;

    let requests = vec![
        payment(school.student_id, Term::Term1, rupees(1000)),
        payment(school.student_id, Term::Term1, rupees(9999)), // overpays
        payment(school.student_id, Term::Term3, rupees(2000)),
    ];
    let report = school.engine.record_payments(&requests).await;

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert!(report.outcomes[0].success);
    assert!(!report.outcomes[1].success);
    assert!(report.outcomes[1]
        .message
        .as_deref()
        .unwrap()
        .contains("exceeds outstanding due"));
    assert!(report.outcomes[2].success);
}

#[tokio::test]
async fn cancellation_reverses_a_term_completely() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    let mut with_fine = payment(school.student_id, Term::Term1, rupees(1000));
    with_fine.fine_paise = rupees(50);
    engine.record_payment(&with_fine).await.unwrap();
    engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(2000)))
        .await
        .unwrap();
    // An untouched term stays untouched by cancellation.
    engine
        .record_payment(&payment(school.student_id, Term::Term3, rupees(500)))
        .await
        .unwrap();

    let summary = engine
        .cancel_payments(school.student_id, Term::Term1, YEAR)
        .await
        .unwrap();
    assert_eq!(summary.receipts_removed, 2);
    assert_eq!(summary.amount_reversed_paise, rupees(3000));
    assert_eq!(summary.fine_reversed_paise, rupees(50));
    assert!(summary.ledger_reset);

    let ledger = engine
        .db()
        .ledger()
        .get_for_term(school.student_id, Term::Term1, YEAR)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ledger.paid_amount_paise, 0);
    assert_eq!(ledger.fine_amount_paise, 0);
    assert!(ledger.receipt_no.is_none());

    // Only TERM_3's payment survives in log and aggregate.
    let log = engine
        .db()
        .transactions()
        .list_for_student(school.student_id, YEAR)
        .await
        .unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].term, Term::Term3);

    let totals = engine.student_totals(school.student_id).await.unwrap().unwrap();
    assert_eq!(totals.total_paid_paise, rupees(500));
    assert_eq!(totals.total_fine_paise, 0);
}

#[tokio::test]
async fn cancelling_an_unpaid_term_is_a_tolerated_no_op() {
    let school = provisioned_school().await;

    let summary = school
        .engine
        .cancel_payments(school.student_id, Term::Term4, YEAR)
        .await
        .unwrap();
    assert_eq!(summary.receipts_removed, 0);
    assert_eq!(summary.amount_reversed_paise, 0);
    assert!(summary.ledger_reset); // the zeroed row was still re-zeroed

    // Aggregate never went negative - no row was ever created.
    assert!(school
        .engine
        .student_totals(school.student_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn pay_cancel_pay_reaches_the_same_state_as_paying_once() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(4000)))
        .await
        .unwrap();
    engine
        .cancel_payments(school.student_id, Term::Term1, YEAR)
        .await
        .unwrap();
    let receipt = engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(4000)))
        .await
        .unwrap();

    assert_eq!(receipt.remaining_due_paise, 0);
    let totals = engine.student_totals(school.student_id).await.unwrap().unwrap();
    assert_eq!(totals.total_paid_paise, rupees(4000));
}
