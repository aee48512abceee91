//! # Seed Data Generator
//!
//! Populates the database with a demo school directory and fee catalog for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p campuspay-db --bin seed
//!
//! # Specify database path and academic year
//! cargo run -p campuspay-db --bin seed -- --db ./data/fees.db --year Y2024_2025
//! ```
//!
//! ## Generated Data
//! - Grades: PreKG (two-term tier) and Grade 1-5 (standard tier)
//! - One class section per grade, a handful of students per class
//! - A full fee-structure catalog for the chosen academic year
//!
//! Ledger rows are NOT provisioned here; run the engine's fee assignment
//! for that, so the seed exercises the same path production uses.

use std::env;

use campuspay_core::{GradeTier, NewFeeStructure, Term};
use campuspay_db::{Database, DbConfig};
use chrono::NaiveDate;

/// (grade name, tier, annual fee in rupees, abacus add-on in rupees)
const GRADES: &[(&str, GradeTier, i64, i64)] = &[
    ("PreKG", GradeTier::PreKg, 8_000, 0),
    ("Grade 1", GradeTier::Standard, 16_000, 500),
    ("Grade 2", GradeTier::Standard, 16_000, 500),
    ("Grade 3", GradeTier::Standard, 18_000, 500),
    ("Grade 4", GradeTier::Standard, 18_000, 0),
    ("Grade 5", GradeTier::Standard, 20_000, 0),
];

const STUDENT_NAMES: &[&str] = &[
    "Aarav Sharma",
    "Diya Patel",
    "Vihaan Reddy",
    "Ananya Iyer",
    "Arjun Nair",
    "Ishita Rao",
    "Kabir Menon",
    "Meera Pillai",
];

/// Term collection windows for the demo year (start, due), day-month.
const TERM_WINDOWS: &[(Term, (u32, u32), (u32, u32))] = &[
    (Term::Term1, (1, 6), (30, 6)),
    (Term::Term2, (1, 9), (30, 9)),
    (Term::Term3, (1, 12), (31, 12)),
    (Term::Term4, (1, 3), (31, 3)),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./campuspay_dev.db");
    let mut year = String::from("Y2024_2025");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--year" | "-y" => {
                if i + 1 < args.len() {
                    year = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Campuspay Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./campuspay_dev.db)");
                println!("  -y, --year <YEAR>  Academic year label (default: Y2024_2025)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    campuspay_core::validation::validate_academic_year(&year)?;

    println!("🌱 Campuspay Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Year:     {}", year);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Start year of the academic year, for term window dates. Safe to
    // slice: the label was validated above.
    let start_year: i32 = year[1..5].parse().unwrap_or(2024);

    let directory = db.directory();
    let catalog = db.catalog();

    let mut students = 0usize;
    let mut structures = 0usize;

    for (grade_name, tier, annual_rupees, abacus_rupees) in GRADES {
        let grade_id = directory.insert_grade(grade_name, *tier).await?;
        let class_id = directory
            .insert_class(&format!("{grade_name} A"), grade_id)
            .await?;

        for name in STUDENT_NAMES {
            directory.insert_student(name, Some(class_id), &year).await?;
            students += 1;
        }

        let term_count = match tier {
            GradeTier::PreKg => 2,
            GradeTier::Standard => 4,
        };
        let term_fees_paise = (*annual_rupees * 100) / term_count;

        for (term, (sd, sm), (dd, dm)) in TERM_WINDOWS.iter().take(term_count as usize) {
            // Terms 1-3 fall in the start year, term 4 rolls into the next.
            let y = if *sm < 6 { start_year + 1 } else { start_year };
            let structure = NewFeeStructure {
                grade_id,
                term: *term,
                academic_year: year.clone(),
                term_fees_paise,
                abacus_fees_paise: *abacus_rupees * 100,
                start_date: NaiveDate::from_ymd_opt(y, *sm, *sd)
                    .ok_or("bad term start date")?,
                due_date: NaiveDate::from_ymd_opt(y, *dm, *dd).ok_or("bad term due date")?,
            };
            catalog.upsert(&structure).await?;
            structures += 1;
        }

        println!("  Seeded {grade_name} ({} terms)", term_count);
    }

    println!();
    println!("✓ Seed complete: {students} students, {structures} fee structures");
    println!("  Run fee assignment next to provision ledger rows.");

    Ok(())
}
