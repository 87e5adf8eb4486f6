//! PostgreSQL implementation of CouponRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::coupon::{Coupon, CouponCode, DiscountPercent};
use crate::domain::foundation::{CouponId, CourseId, DomainError, Timestamp};
use crate::ports::CouponRepository;

use super::{corrupt_row, db_error};

pub struct PostgresCouponRepository {
    pool: PgPool,
}

impl PostgresCouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: Uuid,
    code: String,
    percent_off: i16,
    course_id: Option<Uuid>,
    expires_at: Option<DateTime<Utc>>,
    is_active: bool,
    usage_count: i32,
    usage_limit: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = DomainError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let code = CouponCode::try_new(&row.code).map_err(|e| corrupt_row("code", e))?;
        let percent = u8::try_from(row.percent_off)
            .map_err(|e| corrupt_row("percent_off", e))
            .and_then(|p| DiscountPercent::try_new(p).map_err(|e| corrupt_row("percent_off", e)))?;

        Ok(Coupon {
            id: CouponId::from_uuid(row.id),
            code,
            percent_off: percent,
            course_id: row.course_id.map(CourseId::from_uuid),
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            is_active: row.is_active,
            usage_count: row.usage_count,
            usage_limit: row.usage_limit,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl CouponRepository for PostgresCouponRepository {
    async fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>, DomainError> {
        let row: Option<CouponRow> = sqlx::query_as(
            r#"
            SELECT id, code, percent_off, course_id, expires_at, is_active,
                   usage_count, usage_limit, created_at, updated_at
            FROM coupons
            WHERE code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch coupon", e))?;

        row.map(Coupon::try_from).transpose()
    }

    async fn redeem(&self, id: &CouponId) -> Result<Option<Coupon>, DomainError> {
        // SET expressions read the pre-update row, so the limit check and the
        // deactivation see the same usage_count.
        let row: Option<CouponRow> = sqlx::query_as(
            r#"
            UPDATE coupons SET
                usage_count = usage_count + 1,
                is_active = CASE
                    WHEN usage_limit IS NOT NULL AND usage_count + 1 >= usage_limit THEN FALSE
                    ELSE is_active
                END,
                updated_at = now()
            WHERE id = $1
              AND is_active
              AND (expires_at IS NULL OR expires_at > now())
              AND (usage_limit IS NULL OR usage_count < usage_limit)
            RETURNING id, code, percent_off, course_id, expires_at, is_active,
                      usage_count, usage_limit, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("redeem coupon", e))?;

        row.map(Coupon::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn row() -> CouponRow {
        CouponRow {
            id: Uuid::new_v4(),
            code: "save20".to_string(),
            percent_off: 20,
            course_id: None,
            expires_at: None,
            is_active: true,
            usage_count: 0,
            usage_limit: Some(5),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_with_normalized_code() {
        let coupon = Coupon::try_from(row()).unwrap();
        assert_eq!(coupon.code.as_str(), "SAVE20");
        assert_eq!(coupon.percent_off.value(), 20);
    }

    #[test]
    fn out_of_range_percent_is_corrupt() {
        for bad in [0, 101, -5, 300] {
            let mut r = row();
            r.percent_off = bad;
            let err = Coupon::try_from(r).unwrap_err();
            assert_eq!(err.code, ErrorCode::DatabaseError, "percent {}", bad);
        }
    }
}
