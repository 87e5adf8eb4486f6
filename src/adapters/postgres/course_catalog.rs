//! PostgreSQL implementation of CourseCatalog.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::course::Course;
use crate::domain::foundation::{CourseId, Currency, DomainError, ErrorCode, Money};
use crate::ports::CourseCatalog;

use super::{corrupt_row, db_error};

pub struct PostgresCourseCatalog {
    pool: PgPool,
}

impl PostgresCourseCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    title: String,
    price_minor: i64,
    currency: String,
    is_published: bool,
    enrollment_count: i64,
}

impl TryFrom<CourseRow> for Course {
    type Error = DomainError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let currency = Currency::new(&row.currency).map_err(|e| corrupt_row("currency", e))?;
        let price = Money::new(row.price_minor, currency).map_err(|e| corrupt_row("price_minor", e))?;

        Ok(Course {
            id: CourseId::from_uuid(row.id),
            title: row.title,
            price,
            is_published: row.is_published,
            enrollment_count: row.enrollment_count,
        })
    }
}

#[async_trait]
impl CourseCatalog for PostgresCourseCatalog {
    async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(
            r#"
            SELECT id, title, price_minor, currency, is_published, enrollment_count
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch course", e))?;

        row.map(Course::try_from).transpose()
    }

    async fn increment_enrollment_count(&self, id: &CourseId) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET enrollment_count = enrollment_count + 1, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("increment enrollment count", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::CourseNotFound,
                format!("Course not found: {}", id),
            ));
        }
        Ok(())
    }
}
