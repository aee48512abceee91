//! Shared fixture for engine integration tests: an in-memory database with
//! a small school directory and a full fee catalog for one year.

// Each test binary uses a different subset of the fixture.
#![allow(dead_code)]

use campuspay_core::{GradeTier, NewFeeStructure, PaymentMode, Term};
use campuspay_db::{Database, DbConfig};
use campuspay_engine::{FeeEngine, PaymentRequest};
use chrono::NaiveDate;

pub const YEAR: &str = "Y2024_2025";

/// ₹ to paise.
pub fn rupees(r: i64) -> i64 {
    r * 100
}

pub struct School {
    pub engine: FeeEngine,

    /// Standard-tier student, class-assigned, four-term schedule.
    pub student_id: i64,

    /// PreKG student on the two-term schedule.
    pub pre_kg_student_id: i64,

    /// Active student with no class assignment.
    pub unassigned_student_id: i64,

    pub grade_id: i64,
    pub pre_kg_grade_id: i64,
}

/// Standard grade: ₹4000/term across four terms, ₹500 abacus add-on.
/// PreKG grade: ₹4000/term across two terms, no add-on.
pub async fn school() -> School {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    let directory = db.directory();
    let catalog = db.catalog();

    let grade_id = directory
        .insert_grade("Grade 3", GradeTier::Standard)
        .await
        .unwrap();
    let class_id = directory.insert_class("3-A", grade_id).await.unwrap();
    let student_id = directory
        .insert_student("Asha Verma", Some(class_id), YEAR)
        .await
        .unwrap();

    let pre_kg_grade_id = directory
        .insert_grade("PreKG", GradeTier::PreKg)
        .await
        .unwrap();
    let pre_kg_class_id = directory
        .insert_class("PreKG-A", pre_kg_grade_id)
        .await
        .unwrap();
    let pre_kg_student_id = directory
        .insert_student("Rohan Das", Some(pre_kg_class_id), YEAR)
        .await
        .unwrap();

    let unassigned_student_id = directory
        .insert_student("Leela Joshi", None, YEAR)
        .await
        .unwrap();

    for term in Term::ALL {
        catalog
            .upsert(&structure(grade_id, term, rupees(4000), rupees(500)))
            .await
            .unwrap();
    }
    for term in [Term::Term1, Term::Term2] {
        catalog
            .upsert(&structure(pre_kg_grade_id, term, rupees(4000), 0))
            .await
            .unwrap();
    }

    School {
        engine: FeeEngine::new(db),
        student_id,
        pre_kg_student_id,
        unassigned_student_id,
        grade_id,
        pre_kg_grade_id,
    }
}

/// A plain cash payment request with no discount, fine or receipt number.
pub fn payment(student_id: i64, term: Term, amount_paise: i64) -> PaymentRequest {
    PaymentRequest {
        student_id,
        term,
        academic_year: YEAR.to_string(),
        amount_paise,
        discount_paise: 0,
        fine_paise: 0,
        payment_mode: PaymentMode::Cash,
        receipt_no: None,
        receipt_date: None,
        remarks: None,
    }
}

pub fn structure(
    grade_id: i64,
    term: Term,
    term_fees_paise: i64,
    abacus_fees_paise: i64,
) -> NewFeeStructure {
    let month = 3 * term.index() as u32 + 6;
    let (year, month) = if month > 12 {
        (2025, month - 12)
    } else {
        (2024, month)
    };
    NewFeeStructure {
        grade_id,
        term,
        academic_year: YEAR.to_string(),
        term_fees_paise,
        abacus_fees_paise,
        start_date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
        due_date: NaiveDate::from_ymd_opt(year, month, 28).unwrap(),
    }
}

/// Fixture with ledger rows already provisioned for the year.
pub async fn provisioned_school() -> School {
    let school = school().await;
    school.engine.assign_fees(YEAR).await.expect("assignment");
    school
}
