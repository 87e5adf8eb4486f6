//! PostgreSQL implementation of EnrollmentRepository.
//!
//! `UNIQUE (user_id, course_id)` is the only thing standing between
//! concurrent writers and duplicate enrollments; every write goes through
//! `ON CONFLICT` on that key.
//!
//! `activation_id` is stamped by the upsert that first records a payment and
//! never changed afterwards. Comparing it with the token a call supplied
//! tells that call whether it did the activation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::enrollment::{
    Enrollment, EnrollmentStatus, PaymentRecord, PendingOrder, Progress,
};
use crate::domain::foundation::{
    CourseId, Currency, DomainError, EnrollmentId, Money, Timestamp, UserId,
};
use crate::domain::payment::PaymentFacts;
use crate::ports::{EnrollmentRepository, OpenPendingOutcome, ReconcileOutcome};

use super::{corrupt_row, db_error};

const ENROLLMENT_COLUMNS: &str = "id, user_id, course_id, status, amount_minor, currency, \
    payment_method, gateway_order_id, transaction_id, paid_at, enrolled_at, \
    progress_lessons, progress_percent, created_at, updated_at";

pub struct PostgresEnrollmentRepository {
    pool: PgPool,
}

impl PostgresEnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    id: Uuid,
    user_id: String,
    course_id: Uuid,
    status: String,
    amount_minor: i64,
    currency: String,
    payment_method: Option<String>,
    gateway_order_id: Option<String>,
    transaction_id: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    enrolled_at: Option<DateTime<Utc>>,
    progress_lessons: i32,
    progress_percent: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ReconciledRow {
    #[sqlx(flatten)]
    enrollment: EnrollmentRow,
    newly_activated: bool,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = DomainError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        let status: EnrollmentStatus = row.status.parse().map_err(|e| corrupt_row("status", e))?;
        let currency = Currency::new(&row.currency).map_err(|e| corrupt_row("currency", e))?;
        let amount =
            Money::new(row.amount_minor, currency).map_err(|e| corrupt_row("amount_minor", e))?;
        let user_id = UserId::new(row.user_id).map_err(|e| corrupt_row("user_id", e))?;

        Ok(Enrollment {
            id: EnrollmentId::from_uuid(row.id),
            user_id,
            course_id: CourseId::from_uuid(row.course_id),
            status,
            payment: PaymentRecord {
                amount,
                method: row.payment_method,
                gateway_order_id: row.gateway_order_id,
                transaction_id: row.transaction_id,
                paid_at: row.paid_at.map(Timestamp::from_datetime),
            },
            progress: Progress {
                completed_lessons: row.progress_lessons,
                percent: row.progress_percent,
            },
            enrolled_at: row.enrolled_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl EnrollmentRepository for PostgresEnrollmentRepository {
    async fn find_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError> {
        let sql = format!(
            "SELECT {} FROM enrollments WHERE user_id = $1 AND course_id = $2",
            ENROLLMENT_COLUMNS
        );
        let row: Option<EnrollmentRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .bind(course_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch enrollment", e))?;

        row.map(Enrollment::try_from).transpose()
    }

    async fn open_pending(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        order: PendingOrder,
    ) -> Result<OpenPendingOutcome, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO enrollments (
                id, user_id, course_id, status, amount_minor, currency,
                gateway_order_id, created_at, updated_at
            ) VALUES ($1, $2, $3, 'pending', $4, $5, $6, now(), now())
            ON CONFLICT (user_id, course_id) DO UPDATE SET
                status = 'pending',
                amount_minor = EXCLUDED.amount_minor,
                currency = EXCLUDED.currency,
                gateway_order_id = EXCLUDED.gateway_order_id,
                payment_method = NULL,
                transaction_id = NULL,
                updated_at = now()
            WHERE enrollments.status IN ('pending', 'cancelled')
            RETURNING {}
            "#,
            ENROLLMENT_COLUMNS
        );

        let row: Option<EnrollmentRow> = sqlx::query_as(&sql)
            .bind(EnrollmentId::new().as_uuid())
            .bind(user_id.as_str())
            .bind(course_id.as_uuid())
            .bind(order.amount.amount_minor())
            .bind(order.amount.currency().as_str())
            .bind(&order.gateway_order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("open pending enrollment", e))?;

        if let Some(row) = row {
            return Ok(OpenPendingOutcome::Opened(row.try_into()?));
        }

        // Conflict with a paid row: the guarded DO UPDATE skipped it.
        match self.find_by_user_and_course(user_id, course_id).await? {
            Some(existing) => Ok(OpenPendingOutcome::AlreadyEnrolled(existing)),
            None => Err(DomainError::database(format!(
                "Enrollment for user {} and course {} vanished during upsert",
                user_id, course_id
            ))),
        }
    }

    async fn reconcile_payment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        facts: &PaymentFacts,
    ) -> Result<ReconcileOutcome, DomainError> {
        let activation_token = Uuid::new_v4();
        let sql = format!(
            r#"
            INSERT INTO enrollments (
                id, user_id, course_id, status, amount_minor, currency,
                payment_method, gateway_order_id, transaction_id,
                paid_at, enrolled_at, activation_id, created_at, updated_at
            ) VALUES ($1, $2, $3, 'active', $4, $5, $6, $7, $8, $9, $9, $10, now(), now())
            ON CONFLICT (user_id, course_id) DO UPDATE SET
                status = CASE WHEN enrollments.status = 'completed' THEN 'completed' ELSE 'active' END,
                amount_minor = EXCLUDED.amount_minor,
                currency = EXCLUDED.currency,
                payment_method = COALESCE(EXCLUDED.payment_method, enrollments.payment_method),
                gateway_order_id = COALESCE(EXCLUDED.gateway_order_id, enrollments.gateway_order_id),
                transaction_id = EXCLUDED.transaction_id,
                paid_at = COALESCE(enrollments.paid_at, EXCLUDED.paid_at),
                enrolled_at = COALESCE(enrollments.enrolled_at, EXCLUDED.enrolled_at),
                activation_id = COALESCE(enrollments.activation_id, EXCLUDED.activation_id),
                updated_at = now()
            RETURNING {}, (activation_id = $10) AS newly_activated
            "#,
            ENROLLMENT_COLUMNS
        );

        let reconciled: ReconciledRow = sqlx::query_as(&sql)
            .bind(EnrollmentId::new().as_uuid())
            .bind(user_id.as_str())
            .bind(course_id.as_uuid())
            .bind(facts.amount.amount_minor())
            .bind(facts.amount.currency().as_str())
            .bind(&facts.method)
            .bind(&facts.gateway_order_id)
            .bind(&facts.transaction_id)
            .bind(facts.captured_at.as_datetime())
            .bind(activation_token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("reconcile enrollment", e))?;

        Ok(ReconcileOutcome {
            enrollment: reconciled.enrollment.try_into()?,
            newly_activated: reconciled.newly_activated,
        })
    }

    async fn cancel_abandoned(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE enrollments
            SET status = 'cancelled', updated_at = now()
            WHERE status = 'pending'
              AND paid_at IS NULL
              AND updated_at < $1
            "#,
        )
        .bind(cutoff.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("cancel abandoned enrollments", e))?;

        Ok(result.rows_affected())
    }
}
