use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{LeaveBalance, LeaveType};
use crate::error::LeaveError;
use crate::services::leave::LeaveBalanceStore;

/// Quota ledger backed by single-statement conditional UPDATEs. Postgres
/// evaluates each WHERE clause against the current row under its row lock,
/// which is what makes reserve/confirm/release safe without any locking here.
#[derive(Clone)]
pub struct LeaveBalanceRepository {
    pool: PgPool,
}

impl LeaveBalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LeaveBalanceStore for LeaveBalanceRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<LeaveBalance>, LeaveError> {
        let balances = sqlx::query_as::<_, LeaveBalance>(
            r#"
            SELECT
                id,
                user_id,
                leave_type,
                year,
                total_days,
                used_days,
                pending_days,
                created_at,
                updated_at
            FROM
                leave_balances
            WHERE
                user_id = $1
            ORDER BY
                leave_type
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(balances)
    }

    /// Admission control: the reservation is applied only if the whole quota
    /// check passes at write time. Two racing reservations serialize on the
    /// row; the loser re-evaluates the guard against the winner's update and
    /// matches zero rows.
    async fn reserve_pending(
        &self,
        user_id: Uuid,
        leave_type: LeaveType,
        year: i32,
        days: &BigDecimal,
    ) -> Result<(), LeaveError> {
        let result = sqlx::query(
            r#"
            UPDATE
                leave_balances
            SET
                pending_days = pending_days + $4,
                updated_at = $5
            WHERE
                user_id = $1
                AND leave_type = $2
                AND year = $3
                AND used_days + pending_days + $4 <= total_days
            "#,
        )
        .bind(user_id)
        .bind(leave_type)
        .bind(year)
        .bind(days)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LeaveError::InsufficientBalance);
        }

        Ok(())
    }

    /// Moves previously reserved days into consumed days. No quota re-check:
    /// the days were admitted at reservation time.
    async fn confirm_pending(
        &self,
        user_id: Uuid,
        leave_type: LeaveType,
        year: i32,
        days: &BigDecimal,
    ) -> Result<(), LeaveError> {
        let result = sqlx::query(
            r#"
            UPDATE
                leave_balances
            SET
                used_days = used_days + $4,
                pending_days = pending_days - $4,
                updated_at = $5
            WHERE
                user_id = $1
                AND leave_type = $2
                AND year = $3
            "#,
        )
        .bind(user_id)
        .bind(leave_type)
        .bind(year)
        .bind(days)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LeaveError::BalanceNotFound);
        }

        Ok(())
    }

    /// Returns reserved days to availability (rejection or rollback).
    async fn release_pending(
        &self,
        user_id: Uuid,
        leave_type: LeaveType,
        year: i32,
        days: &BigDecimal,
    ) -> Result<(), LeaveError> {
        let result = sqlx::query(
            r#"
            UPDATE
                leave_balances
            SET
                pending_days = pending_days - $4,
                updated_at = $5
            WHERE
                user_id = $1
                AND leave_type = $2
                AND year = $3
            "#,
        )
        .bind(user_id)
        .bind(leave_type)
        .bind(year)
        .bind(days)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LeaveError::BalanceNotFound);
        }

        Ok(())
    }
}
