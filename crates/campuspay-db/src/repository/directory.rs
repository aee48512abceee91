//! # Directory Repository
//!
//! Read-only student → class → grade resolution for the fee engine, plus
//! the insert helpers the seed binary and test fixtures use to build a
//! directory. The engine itself never writes here.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use campuspay_core::{Grade, GradeTier, Student, StudentGradeRef};

/// Repository for school directory lookups.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: SqlitePool,
}

impl DirectoryRepository {
    /// Creates a new DirectoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DirectoryRepository { pool }
    }

    /// Resolves a student's class → grade chain.
    ///
    /// Returns `None` when the student doesn't exist or has no class
    /// assignment; fee assignment reports such students instead of failing.
    pub async fn resolve_grade(&self, student_id: i64) -> DbResult<Option<StudentGradeRef>> {
        let row = sqlx::query_as::<_, StudentGradeRef>(
            "SELECT
                s.id AS student_id,
                c.id AS class_id,
                g.id AS grade_id,
                g.tier AS tier,
                s.academic_year AS academic_year
            FROM students s
            JOIN classes c ON c.id = s.class_id
            JOIN grades g ON g.id = c.grade_id
            WHERE s.id = ?1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Gets a grade's schedule tier.
    pub async fn grade_tier(&self, grade_id: i64) -> DbResult<Option<GradeTier>> {
        let mut conn = self.pool.acquire().await?;
        Self::grade_tier_in(&mut conn, grade_id).await
    }

    /// Gets a grade's schedule tier on an existing connection/transaction.
    pub async fn grade_tier_in(
        conn: &mut SqliteConnection,
        grade_id: i64,
    ) -> DbResult<Option<GradeTier>> {
        let tier: Option<GradeTier> =
            sqlx::query_scalar("SELECT tier FROM grades WHERE id = ?1")
                .bind(grade_id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(tier)
    }

    /// Lists all active students for an academic year.
    pub async fn active_students(&self, academic_year: &str) -> DbResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT id, name, class_id, academic_year, is_active
             FROM students
             WHERE academic_year = ?1 AND is_active = 1
             ORDER BY id",
        )
        .bind(academic_year)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    /// Gets a grade by id.
    pub async fn get_grade(&self, grade_id: i64) -> DbResult<Option<Grade>> {
        let grade = sqlx::query_as::<_, Grade>("SELECT id, name, tier FROM grades WHERE id = ?1")
            .bind(grade_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(grade)
    }

    // -------------------------------------------------------------------------
    // Directory provisioning (seed binary and test fixtures)
    // -------------------------------------------------------------------------

    /// Inserts a grade; returns its id.
    pub async fn insert_grade(&self, name: &str, tier: GradeTier) -> DbResult<i64> {
        let result = sqlx::query("INSERT INTO grades (name, tier) VALUES (?1, ?2)")
            .bind(name)
            .bind(tier)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Inserts a class section in a grade; returns its id.
    pub async fn insert_class(&self, name: &str, grade_id: i64) -> DbResult<i64> {
        let result = sqlx::query("INSERT INTO classes (name, grade_id) VALUES (?1, ?2)")
            .bind(name)
            .bind(grade_id)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Inserts a student; returns their id.
    pub async fn insert_student(
        &self,
        name: &str,
        class_id: Option<i64>,
        academic_year: &str,
    ) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO students (name, class_id, academic_year, is_active)
             VALUES (?1, ?2, ?3, 1)",
        )
        .bind(name)
        .bind(class_id)
        .bind(academic_year)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
