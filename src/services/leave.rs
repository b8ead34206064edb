use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::database::models::{LeaveBalance, LeaveRequest, LeaveStatus, LeaveType, Review};
use crate::error::LeaveError;
use crate::pagination::{Paginated, PaginationParams};

/// Persistence contract for leave requests. `replace_if_status` must be an
/// atomic compare-and-update on the stored status; it is the only defense
/// against two reviewers deciding the same request.
#[allow(async_fn_in_trait)]
pub trait LeaveRequestStore {
    async fn insert(&self, request: &LeaveRequest) -> Result<(), LeaveError>;
    async fn find_by_id(&self, id: Uuid) -> Result<LeaveRequest, LeaveError>;
    async fn find_by_user(
        &self,
        user_id: Uuid,
        params: PaginationParams,
    ) -> Result<Paginated<LeaveRequest>, LeaveError>;
    async fn find_by_status(
        &self,
        status: LeaveStatus,
        params: PaginationParams,
    ) -> Result<Paginated<LeaveRequest>, LeaveError>;
    async fn replace(&self, request: &LeaveRequest) -> Result<(), LeaveError>;
    async fn replace_if_status(
        &self,
        request: &LeaveRequest,
        expected: LeaveStatus,
    ) -> Result<(), LeaveError>;
    async fn has_overlap(
        &self,
        user_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, LeaveError>;
}

/// Persistence contract for the balance ledger. All three mutations must be
/// atomic conditional updates on the (user, type, year) row; `reserve_pending`
/// must evaluate its quota guard against the current row, never a stale read.
#[allow(async_fn_in_trait)]
pub trait LeaveBalanceStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<LeaveBalance>, LeaveError>;
    async fn reserve_pending(
        &self,
        user_id: Uuid,
        leave_type: LeaveType,
        year: i32,
        days: &BigDecimal,
    ) -> Result<(), LeaveError>;
    async fn confirm_pending(
        &self,
        user_id: Uuid,
        leave_type: LeaveType,
        year: i32,
        days: &BigDecimal,
    ) -> Result<(), LeaveError>;
    async fn release_pending(
        &self,
        user_id: Uuid,
        leave_type: LeaveType,
        year: i32,
        days: &BigDecimal,
    ) -> Result<(), LeaveError>;
}

/// Orchestrates the submit/approve/reject workflows over the two stores.
///
/// There is no transaction spanning a request and its balance; each workflow
/// sequences the two writes so that an unreserved request can never exist,
/// and compensates the first write when the second one fails. Reservation
/// happens before the request is persisted; the status transition is
/// persisted before the balance is confirmed or released.
pub struct LeaveService<R, B> {
    requests: R,
    balances: B,
}

impl<R, B> LeaveService<R, B>
where
    R: LeaveRequestStore,
    B: LeaveBalanceStore,
{
    pub fn new(requests: R, balances: B) -> Self {
        Self { requests, balances }
    }

    /// Files a new leave request. On success the request is stored in
    /// `pending` status and its days are reserved against the year's quota.
    pub async fn submit(
        &self,
        user_id: Uuid,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: String,
    ) -> Result<LeaveRequest, LeaveError> {
        if end_date < start_date {
            return Err(LeaveError::InvalidDateRange);
        }

        let request = LeaveRequest::new(user_id, leave_type, start_date, end_date, reason);

        if self
            .requests
            .has_overlap(user_id, start_date, end_date, None)
            .await?
        {
            return Err(LeaveError::OverlappingLeave);
        }

        let year = start_date.year();
        self.balances
            .reserve_pending(user_id, leave_type, year, &request.total_days)
            .await?;

        if let Err(insert_err) = self.requests.insert(&request).await {
            log::error!(
                "persisting leave request {} failed, releasing {} reserved day(s): {}",
                request.id,
                request.total_days,
                insert_err
            );
            let rollback = self
                .balances
                .release_pending(user_id, leave_type, year, &request.total_days)
                .await;
            return Err(match rollback {
                Ok(()) => insert_err,
                Err(rollback_err) => LeaveError::ReconciliationRequired {
                    operation: "persist leave request",
                    source: Box::new(insert_err),
                    rollback: Box::new(rollback_err),
                },
            });
        }

        Ok(request)
    }

    /// A user's own request history, newest first.
    pub async fn my_requests(
        &self,
        user_id: Uuid,
        params: PaginationParams,
    ) -> Result<Paginated<LeaveRequest>, LeaveError> {
        self.requests.find_by_user(user_id, params).await
    }

    /// All of a user's yearly balances.
    pub async fn my_balances(&self, user_id: Uuid) -> Result<Vec<LeaveBalance>, LeaveError> {
        self.balances.find_by_user(user_id).await
    }

    /// The manager review queue, oldest submissions first.
    pub async fn pending_requests(
        &self,
        params: PaginationParams,
    ) -> Result<Paginated<LeaveRequest>, LeaveError> {
        self.requests
            .find_by_status(LeaveStatus::Pending, params)
            .await
    }

    /// Approves a pending request and moves its reserved days into consumed
    /// days. Exactly one of any set of racing reviewers wins the status
    /// guard; everyone else gets `AlreadyProcessed` before any balance
    /// mutation happens on their behalf.
    pub async fn approve(
        &self,
        request_id: Uuid,
        reviewer_id: Uuid,
        note: Option<String>,
    ) -> Result<(), LeaveError> {
        let mut request = self.requests.find_by_id(request_id).await?;

        if request.user_id == reviewer_id {
            return Err(LeaveError::SelfApproval);
        }

        request.approve(reviewer_id, note)?;
        self.requests
            .replace_if_status(&request, LeaveStatus::Pending)
            .await?;

        let confirmed = self
            .balances
            .confirm_pending(
                request.user_id,
                request.leave_type,
                request.start_date.year(),
                &request.total_days,
            )
            .await;

        if let Err(confirm_err) = confirmed {
            return Err(self
                .revert_review(request, "confirm reserved days", confirm_err)
                .await);
        }

        Ok(())
    }

    /// Rejects a pending request and returns its reserved days to
    /// availability. Same guard structure as [`LeaveService::approve`].
    pub async fn reject(
        &self,
        request_id: Uuid,
        reviewer_id: Uuid,
        note: Option<String>,
    ) -> Result<(), LeaveError> {
        let mut request = self.requests.find_by_id(request_id).await?;

        if request.user_id == reviewer_id {
            return Err(LeaveError::SelfApproval);
        }

        request.reject(reviewer_id, note)?;
        self.requests
            .replace_if_status(&request, LeaveStatus::Pending)
            .await?;

        let released = self
            .balances
            .release_pending(
                request.user_id,
                request.leave_type,
                request.start_date.year(),
                &request.total_days,
            )
            .await;

        if let Err(release_err) = released {
            return Err(self
                .revert_review(request, "release reserved days", release_err)
                .await);
        }

        Ok(())
    }

    /// Administrative revert: puts a just-reviewed request back to `pending`
    /// because the paired balance update failed. This is deliberately not a
    /// state-machine transition. If the revert itself fails the two records
    /// are out of step and the caller gets the composite reconciliation
    /// error instead of a silently half-applied decision.
    async fn revert_review(
        &self,
        mut request: LeaveRequest,
        operation: &'static str,
        cause: LeaveError,
    ) -> LeaveError {
        log::error!(
            "{} failed for request {}, reverting status to pending: {}",
            operation,
            request.id,
            cause
        );

        request.status = LeaveStatus::Pending;
        request.review = Review::Unreviewed;
        request.updated_at = Utc::now();

        match self.requests.replace(&request).await {
            Ok(()) => cause,
            Err(rollback_err) => LeaveError::ReconciliationRequired {
                operation,
                source: Box::new(cause),
                rollback: Box::new(rollback_err),
            },
        }
    }
}
