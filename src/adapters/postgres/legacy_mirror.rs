//! PostgreSQL implementation of LegacyEnrollmentMirror.
//!
//! The list is a JSONB array on `users.legacy_enrollments`. Containment
//! check and append happen in one `UPDATE`, so redelivered webhooks don't
//! grow the list.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::enrollment::{LegacyEnrollmentEntry, MirrorOutcome};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::LegacyEnrollmentMirror;

use super::db_error;

pub struct PostgresLegacyMirror {
    pool: PgPool,
}

impl PostgresLegacyMirror {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LegacyEnrollmentMirror for PostgresLegacyMirror {
    async fn ensure_entry(
        &self,
        user_id: &UserId,
        entry: &LegacyEnrollmentEntry,
    ) -> Result<MirrorOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET legacy_enrollments = COALESCE(legacy_enrollments, '[]'::jsonb)
                || jsonb_build_array(jsonb_build_object(
                    'course_id', $2::text,
                    'enrolled_at', $3::timestamptz,
                    'progress', $4::int
                ))
            WHERE id = $1
              AND NOT COALESCE(legacy_enrollments, '[]'::jsonb)
                  @> jsonb_build_array(jsonb_build_object('course_id', $2::text))
            "#,
        )
        .bind(user_id.as_str())
        .bind(entry.course_id.to_string())
        .bind(entry.enrolled_at.as_datetime())
        .bind(i32::from(entry.progress))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("mirror legacy enrollment", e))?;

        if result.rows_affected() > 0 {
            return Ok(MirrorOutcome::Appended);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("check user", e))?;

        if exists {
            Ok(MirrorOutcome::AlreadyPresent)
        } else {
            Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("User not found: {}", user_id),
            ))
        }
    }
}
