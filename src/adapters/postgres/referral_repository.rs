//! PostgreSQL implementation of ReferralRepository.
//!
//! Referral state lives on the platform's `users` table.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::referral::{ReferralCode, ReferralProfile, ReferralStatus};
use crate::ports::ReferralRepository;

use super::{corrupt_row, db_error};

pub struct PostgresReferralRepository {
    pool: PgPool,
}

impl PostgresReferralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn user_exists(&self, user_id: &UserId) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("check user", e))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReferralRow {
    id: String,
    referral_code: Option<String>,
    referral_discount_used: bool,
    referred_by: Option<String>,
    invite_count: i32,
}

impl TryFrom<ReferralRow> for ReferralProfile {
    type Error = DomainError;

    fn try_from(row: ReferralRow) -> Result<Self, Self::Error> {
        let referral_code = row
            .referral_code
            .as_deref()
            .map(ReferralCode::try_new)
            .transpose()
            .map_err(|e| corrupt_row("referral_code", e))?;
        let referred_by = row
            .referred_by
            .map(UserId::new)
            .transpose()
            .map_err(|e| corrupt_row("referred_by", e))?;

        Ok(ReferralProfile {
            user_id: UserId::new(row.id).map_err(|e| corrupt_row("id", e))?,
            referral_code,
            status: if row.referral_discount_used {
                ReferralStatus::Used
            } else {
                ReferralStatus::Unused
            },
            referred_by,
            invite_count: row.invite_count,
        })
    }
}

#[async_trait]
impl ReferralRepository for PostgresReferralRepository {
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<ReferralProfile>, DomainError> {
        let row: Option<ReferralRow> = sqlx::query_as(
            r#"
            SELECT id, referral_code, referral_discount_used, referred_by, invite_count
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch referral profile", e))?;

        row.map(ReferralProfile::try_from).transpose()
    }

    async fn find_by_code(
        &self,
        code: &ReferralCode,
    ) -> Result<Option<ReferralProfile>, DomainError> {
        let row: Option<ReferralRow> = sqlx::query_as(
            r#"
            SELECT id, referral_code, referral_discount_used, referred_by, invite_count
            FROM users
            WHERE upper(referral_code) = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch referrer", e))?;

        row.map(ReferralProfile::try_from).transpose()
    }

    async fn claim(&self, requester: &UserId, referrer: &UserId) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin referral claim", e))?;

        let claimed = sqlx::query(
            r#"
            UPDATE users
            SET referral_discount_used = TRUE, referred_by = $2, updated_at = now()
            WHERE id = $1 AND NOT referral_discount_used
            "#,
        )
        .bind(requester.as_str())
        .bind(referrer.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("claim referral discount", e))?;

        if claimed.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| db_error("roll back referral claim", e))?;
            if !self.user_exists(requester).await? {
                return Err(DomainError::new(
                    ErrorCode::UserNotFound,
                    format!("User not found: {}", requester),
                ));
            }
            return Ok(false);
        }

        let invited = sqlx::query(
            r#"
            UPDATE users
            SET invite_count = invite_count + 1, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(referrer.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("record referral invite", e))?;

        if invited.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| db_error("roll back referral claim", e))?;
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("Referrer not found: {}", referrer),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit referral claim", e))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(used: bool) -> ReferralRow {
        ReferralRow {
            id: "user-1".to_string(),
            referral_code: Some("abcd12".to_string()),
            referral_discount_used: used,
            referred_by: used.then(|| "user-9".to_string()),
            invite_count: 2,
        }
    }

    #[test]
    fn row_maps_flag_to_status() {
        assert_eq!(
            ReferralProfile::try_from(row(false)).unwrap().status,
            ReferralStatus::Unused
        );
        let used = ReferralProfile::try_from(row(true)).unwrap();
        assert_eq!(used.status, ReferralStatus::Used);
        assert_eq!(used.referred_by.unwrap().as_str(), "user-9");
    }

    #[test]
    fn referral_code_is_normalized() {
        let profile = ReferralProfile::try_from(row(false)).unwrap();
        assert_eq!(profile.referral_code.unwrap().as_str(), "ABCD12");
    }

    fn sql_type<T: sqlx::Type<sqlx::Postgres>>(_: &T) -> String {
        use sqlx::TypeInfo;
        T::type_info().name().to_string()
    }

    #[test]
    fn invite_count_matches_integer_column() {
        // users.invite_count is INTEGER; sqlx will not decode INT4 into i64.
        let row = row(false);
        assert_eq!(sql_type(&row.invite_count), "INT4");
    }
}
