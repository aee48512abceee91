//! Integration tests for catalog management, the fee-assignment pass, and
//! the read-side reports.

mod common;

use campuspay_core::{Term, TermStatus};
use campuspay_engine::{EngineError, FeeStructureUploadRow};
use chrono::NaiveDate;
use common::{payment, provisioned_school, rupees, school, structure, YEAR};

// =============================================================================
// Fee Assignment
// =============================================================================

#[tokio::test]
async fn assignment_provisions_schedule_shaped_ledgers() {
    let school = school().await;
    let report = school.engine.assign_fees(YEAR).await.unwrap();

    assert_eq!(report.students_processed, 3);
    // 4 rows for the standard student, 2 for preKG; the unassigned
    // student contributes nothing.
    assert_eq!(report.rows_created, 6);
    assert_eq!(report.rows_existing, 0);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].student_id, school.unassigned_student_id);

    let standard_rows = school
        .engine
        .db()
        .ledger()
        .list_for_student_year(school.student_id, YEAR)
        .await
        .unwrap();
    assert_eq!(standard_rows.len(), 4);
    assert!(standard_rows.iter().all(|r| r.paid_amount_paise == 0));

    let pre_kg_rows = school
        .engine
        .db()
        .ledger()
        .list_for_student_year(school.pre_kg_student_id, YEAR)
        .await
        .unwrap();
    assert_eq!(pre_kg_rows.len(), 2);
}

#[tokio::test]
async fn rerunning_assignment_creates_nothing_and_overwrites_nothing() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    // Put money on a row, then re-run the pass.
    engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(1000)))
        .await
        .unwrap();

    let report = engine.assign_fees(YEAR).await.unwrap();
    assert_eq!(report.rows_created, 0);
    assert_eq!(report.rows_existing, 6);

    let ledger = engine
        .db()
        .ledger()
        .get_for_term(school.student_id, Term::Term1, YEAR)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ledger.paid_amount_paise, rupees(1000));
}

#[tokio::test]
async fn assignment_ignores_catalog_terms_outside_the_schedule() {
    let school = school().await;

    // A stray TERM_3 catalog row against the preKG grade must not
    // provision anything on the two-term schedule.
    school
        .engine
        .db()
        .catalog()
        .upsert(&structure(school.pre_kg_grade_id, Term::Term3, rupees(4000), 0))
        .await
        .unwrap();

    school.engine.assign_fees(YEAR).await.unwrap();
    let rows = school
        .engine
        .db()
        .ledger()
        .list_for_student_year(school.pre_kg_student_id, YEAR)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.term != Term::Term3));
}

// =============================================================================
// Catalog Management
// =============================================================================

#[tokio::test]
async fn strict_create_conflicts_on_duplicate_key() {
    let school = school().await;

    // The fixture already has (Grade 3, TERM_1, year).
    let err = school
        .engine
        .create_fee_structure(&structure(school.grade_id, Term::Term1, rupees(5000), 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict { .. }));
}

fn upload_row(grade_id: i64, term: Term, term_fees_paise: i64) -> FeeStructureUploadRow {
    FeeStructureUploadRow {
        grade_id,
        term,
        academic_year: YEAR.to_string(),
        term_fees_paise,
        abacus_fees_paise: 0,
        start_date: "01-06-2024".to_string(),
        due_date: "30-06-2024".to_string(),
    }
}

#[tokio::test]
async fn upload_collects_row_errors_and_loads_the_rest() {
    let school = school().await;

    let mut bad_date = upload_row(school.grade_id, Term::Term2, rupees(4100));
    bad_date.due_date = "2024-06-30".to_string(); // wrong format

    let rows = vec![
        upload_row(school.grade_id, Term::Term1, rupees(4100)),
        bad_date,
        upload_row(school.grade_id, Term::Term3, -1), // negative fee
        upload_row(school.grade_id, Term::Term4, rupees(4100)),
    ];
    let report = school.engine.upload_fee_structures(&rows).await.unwrap();

    assert_eq!(report.upserted, 2);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].starts_with("row 2:"));
    assert!(report.errors[1].starts_with("row 3:"));

    // The good rows overwrote the fixture values.
    let t1 = school
        .engine
        .db()
        .catalog()
        .get(school.grade_id, Term::Term1, YEAR)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(t1.term_fees_paise, rupees(4100));
}

#[tokio::test]
async fn reuploading_the_same_sheet_leaves_one_row_per_key() {
    let school = school().await;

    let rows: Vec<_> = Term::ALL
        .iter()
        .map(|&t| upload_row(school.grade_id, t, rupees(4200)))
        .collect();
    school.engine.upload_fee_structures(&rows).await.unwrap();
    school.engine.upload_fee_structures(&rows).await.unwrap();

    let catalog = school
        .engine
        .db()
        .catalog()
        .list_for_grade_year(school.grade_id, YEAR)
        .await
        .unwrap();
    assert_eq!(catalog.len(), 4);
    assert!(catalog.iter().all(|s| s.term_fees_paise == rupees(4200)));
}

#[tokio::test]
async fn upload_reports_unknown_grade_as_a_row_error() {
    let school = school().await;

    let rows = vec![upload_row(9999, Term::Term1, rupees(4000))];
    let report = school.engine.upload_fee_structures(&rows).await.unwrap();
    assert_eq!(report.upserted, 0);
    assert!(report.errors[0].contains("grade 9999 not found"));
}

// =============================================================================
// Reporting
// =============================================================================

#[tokio::test]
async fn summary_walks_the_status_ladder() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    let summary = engine
        .student_fee_summary(school.student_id, YEAR)
        .await
        .unwrap();
    assert_eq!(summary.status, TermStatus::NotPaid);
    assert_eq!(summary.status_label, "Not Paid");
    assert_eq!(summary.lines.len(), 4);
    // ₹4000 × 4 terms + ₹500 abacus on TERM_2.
    assert_eq!(summary.total_expected_paise, rupees(16_500));
    assert_eq!(summary.total_due_paise, rupees(16_500));

    engine
        .record_payment(&payment(school.student_id, Term::Term1, rupees(4000)))
        .await
        .unwrap();
    let summary = engine
        .student_fee_summary(school.student_id, YEAR)
        .await
        .unwrap();
    assert_eq!(summary.status, TermStatus::TermsPaid(1));
    assert_eq!(summary.status_label, "1 Term(s) Paid");
    assert!(summary.lines[0].settled);
    assert!(!summary.lines[1].settled);

    engine
        .record_payment(&payment(school.student_id, Term::Term2, rupees(4500)))
        .await
        .unwrap();
    engine
        .record_payment(&payment(school.student_id, Term::Term3, rupees(4000)))
        .await
        .unwrap();
    engine
        .record_payment(&payment(school.student_id, Term::Term4, rupees(4000)))
        .await
        .unwrap();

    let summary = engine
        .student_fee_summary(school.student_id, YEAR)
        .await
        .unwrap();
    assert_eq!(summary.status, TermStatus::FullyPaid);
    assert_eq!(summary.total_due_paise, 0);
    assert!(summary.lines.iter().all(|l| l.settled));
}

#[tokio::test]
async fn summary_for_pre_kg_covers_two_terms() {
    let school = provisioned_school().await;

    let summary = school
        .engine
        .student_fee_summary(school.pre_kg_student_id, YEAR)
        .await
        .unwrap();
    assert_eq!(summary.lines.len(), 2);
    assert_eq!(summary.total_expected_paise, rupees(8000));
}

#[tokio::test]
async fn summary_requires_a_resolvable_grade() {
    let school = provisioned_school().await;

    let err = school
        .engine
        .student_fee_summary(school.unassigned_student_id, YEAR)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[tokio::test]
async fn daily_collection_groups_by_payment_mode() {
    let school = provisioned_school().await;
    let engine = &school.engine;
    let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

    let mut cash = payment(school.student_id, Term::Term1, rupees(1000));
    cash.receipt_date = Some(date);
    engine.record_payment(&cash).await.unwrap();

    let mut upi = payment(school.student_id, Term::Term2, rupees(2000));
    upi.payment_mode = campuspay_core::PaymentMode::Upi;
    upi.receipt_date = Some(date);
    engine.record_payment(&upi).await.unwrap();

    let mut other_day = payment(school.student_id, Term::Term3, rupees(500));
    other_day.receipt_date = Some(NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
    engine.record_payment(&other_day).await.unwrap();

    let register = engine.daily_collection(date).await.unwrap();
    assert_eq!(register.receipt_count, 2);
    assert_eq!(register.total_paise, rupees(3000));
    assert_eq!(register.modes.len(), 2);
}

#[tokio::test]
async fn recompute_matches_the_incrementally_maintained_aggregate() {
    let school = provisioned_school().await;
    let engine = &school.engine;

    let mut request = payment(school.student_id, Term::Term1, rupees(1500));
    request.discount_paise = rupees(100);
    engine.record_payment(&request).await.unwrap();
    engine
        .record_payment(&payment(school.student_id, Term::Term2, rupees(2000)))
        .await
        .unwrap();

    let incremental = engine.student_totals(school.student_id).await.unwrap().unwrap();
    let rebuilt = engine.recompute_totals(school.student_id).await.unwrap();

    assert_eq!(rebuilt.total_paid_paise, incremental.total_paid_paise);
    assert_eq!(rebuilt.total_discount_paise, incremental.total_discount_paise);
    assert_eq!(rebuilt.total_fee_paise, incremental.total_fee_paise);
    assert_eq!(rebuilt.total_paid_paise, rupees(3500));
    assert_eq!(rebuilt.total_fee_paise, rupees(3600));
}
