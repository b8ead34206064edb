use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{LeaveRequest, LeaveStatus};
use crate::error::LeaveError;
use crate::pagination::{Paginated, PaginationParams};
use crate::services::leave::LeaveRequestStore;

const REQUEST_COLUMNS: &str = r#"
    id,
    user_id,
    leave_type,
    start_date,
    end_date,
    total_days,
    reason,
    status,
    reviewer_id,
    review_note,
    reviewed_at,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct LeaveRequestRepository {
    pool: PgPool,
}

impl LeaveRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LeaveRequestStore for LeaveRequestRepository {
    async fn insert(&self, request: &LeaveRequest) -> Result<(), LeaveError> {
        sqlx::query(
            r#"
            INSERT INTO
                leave_requests (
                    id,
                    user_id,
                    leave_type,
                    start_date,
                    end_date,
                    total_days,
                    reason,
                    status,
                    reviewer_id,
                    review_note,
                    reviewed_at,
                    created_at,
                    updated_at
                )
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(request.leave_type)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.total_days)
        .bind(&request.reason)
        .bind(request.status)
        .bind(request.review.reviewer_id())
        .bind(request.review.note())
        .bind(request.review.reviewed_at())
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<LeaveRequest, LeaveError> {
        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE id = $1"
        );

        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(LeaveError::RequestNotFound)
    }

    /// A user's own history, newest first.
    async fn find_by_user(
        &self,
        user_id: Uuid,
        params: PaginationParams,
    ) -> Result<Paginated<LeaveRequest>, LeaveError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM leave_requests WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let query = format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM leave_requests
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let requests = sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(user_id)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Paginated::new(requests, total, params))
    }

    /// Review queue, oldest first so managers work through it in FIFO order.
    async fn find_by_status(
        &self,
        status: LeaveStatus,
        params: PaginationParams,
    ) -> Result<Paginated<LeaveRequest>, LeaveError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM leave_requests WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;

        let query = format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM leave_requests
            WHERE status = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#
        );

        let requests = sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(status)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Paginated::new(requests, total, params))
    }

    async fn replace(&self, request: &LeaveRequest) -> Result<(), LeaveError> {
        let result = sqlx::query(
            r#"
            UPDATE
                leave_requests
            SET
                leave_type = $2,
                start_date = $3,
                end_date = $4,
                total_days = $5,
                reason = $6,
                status = $7,
                reviewer_id = $8,
                review_note = $9,
                reviewed_at = $10,
                updated_at = $11
            WHERE
                id = $1
            "#,
        )
        .bind(request.id)
        .bind(request.leave_type)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.total_days)
        .bind(&request.reason)
        .bind(request.status)
        .bind(request.review.reviewer_id())
        .bind(request.review.note())
        .bind(request.review.reviewed_at())
        .bind(request.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LeaveError::RequestNotFound);
        }

        Ok(())
    }

    /// Status-guarded replace: the write lands only if the stored status is
    /// still `expected`. Of two racing reviewers exactly one matches the row;
    /// the other gets `AlreadyProcessed`.
    async fn replace_if_status(
        &self,
        request: &LeaveRequest,
        expected: LeaveStatus,
    ) -> Result<(), LeaveError> {
        let result = sqlx::query(
            r#"
            UPDATE
                leave_requests
            SET
                leave_type = $2,
                start_date = $3,
                end_date = $4,
                total_days = $5,
                reason = $6,
                status = $7,
                reviewer_id = $8,
                review_note = $9,
                reviewed_at = $10,
                updated_at = $11
            WHERE
                id = $1
                AND status = $12
            "#,
        )
        .bind(request.id)
        .bind(request.leave_type)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.total_days)
        .bind(&request.reason)
        .bind(request.status)
        .bind(request.review.reviewer_id())
        .bind(request.review.note())
        .bind(request.review.reviewed_at())
        .bind(request.updated_at)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LeaveError::AlreadyProcessed);
        }

        Ok(())
    }

    /// Two inclusive ranges [s1,e1] and [s2,e2] intersect iff
    /// s1 <= e2 AND e1 >= s2. Rejected requests never block new leave.
    async fn has_overlap(
        &self,
        user_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, LeaveError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM leave_requests
                WHERE
                    user_id = $1
                    AND status IN ('pending', 'approved')
                    AND start_date <= $3
                    AND end_date >= $2
                    AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
