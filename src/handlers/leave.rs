use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{LeaveBalance, LeaveRequest, LeaveStatus, LeaveType};
use crate::error::{AppError, LeaveError};
use crate::handlers::shared::ApiResponse;
use crate::pagination::{Paginated, PaginationQuery};
use crate::services::auth::Claims;
use crate::AppLeaveService;

#[derive(Debug, Deserialize)]
pub struct SubmitLeaveRequest {
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewLeaveRequest {
    pub note: Option<String>,
}

/// Wire shape of a request: the review sum type flattened into the nullable
/// fields clients expect.
#[derive(Debug, Serialize)]
pub struct LeaveRequestResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: BigDecimal,
    pub reason: String,
    pub status: LeaveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeaveRequest> for LeaveRequestResponse {
    fn from(request: LeaveRequest) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            total_days: request.total_days,
            reason: request.reason,
            status: request.status,
            reviewer_id: request.review.reviewer_id(),
            review_note: request.review.note().map(str::to_string),
            reviewed_at: request.review.reviewed_at(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeaveBalanceResponse {
    pub id: Uuid,
    pub leave_type: LeaveType,
    pub year: i32,
    pub total_days: BigDecimal,
    pub used_days: BigDecimal,
    pub pending_days: BigDecimal,
    pub available_days: BigDecimal,
}

impl From<LeaveBalance> for LeaveBalanceResponse {
    fn from(balance: LeaveBalance) -> Self {
        let available_days = balance.available_days();
        Self {
            id: balance.id,
            leave_type: balance.leave_type,
            year: balance.year,
            total_days: balance.total_days,
            used_days: balance.used_days,
            pending_days: balance.pending_days,
            available_days,
        }
    }
}

/// POST /api/v1/leaves
pub async fn submit_leave(
    claims: Claims,
    service: web::Data<AppLeaveService>,
    input: web::Json<SubmitLeaveRequest>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();

    let leave_type: LeaveType = input
        .leave_type
        .parse()
        .map_err(|_| LeaveError::InvalidLeaveType)?;

    let request = service
        .submit(
            claims.user_id(),
            leave_type,
            input.start_date,
            input.end_date,
            input.reason,
        )
        .await?;

    log::info!(
        "user {} submitted leave request {} ({} day(s) of {})",
        request.user_id,
        request.id,
        request.total_days,
        request.leave_type
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(LeaveRequestResponse::from(request))))
}

/// GET /api/v1/leaves/my-requests
pub async fn my_requests(
    claims: Claims,
    service: web::Data<AppLeaveService>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, AppError> {
    let result = service
        .my_requests(claims.user_id(), query.into_inner().into())
        .await?;

    let result: Paginated<LeaveRequestResponse> = result.map(Into::into);
    Ok(HttpResponse::Ok().json(ApiResponse::success(result)))
}

/// GET /api/v1/leaves/my-balance
pub async fn my_balance(
    claims: Claims,
    service: web::Data<AppLeaveService>,
) -> Result<HttpResponse, AppError> {
    let balances = service.my_balances(claims.user_id()).await?;

    let balances: Vec<LeaveBalanceResponse> = balances.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(balances)))
}

/// GET /api/v1/manager/pending-requests
pub async fn pending_requests(
    claims: Claims,
    service: web::Data<AppLeaveService>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, AppError> {
    require_manager(&claims)?;

    let result = service.pending_requests(query.into_inner().into()).await?;

    let result: Paginated<LeaveRequestResponse> = result.map(Into::into);
    Ok(HttpResponse::Ok().json(ApiResponse::success(result)))
}

/// POST /api/v1/manager/requests/{id}/approve
pub async fn approve_leave(
    claims: Claims,
    service: web::Data<AppLeaveService>,
    path: web::Path<Uuid>,
    input: web::Json<ReviewLeaveRequest>,
) -> Result<HttpResponse, AppError> {
    require_manager(&claims)?;
    let request_id = path.into_inner();

    service
        .approve(request_id, claims.user_id(), input.into_inner().note)
        .await?;

    log::info!("request {} approved by {}", request_id, claims.user_id());

    Ok(HttpResponse::Ok().json(ApiResponse::message("Leave request approved")))
}

/// POST /api/v1/manager/requests/{id}/reject
pub async fn reject_leave(
    claims: Claims,
    service: web::Data<AppLeaveService>,
    path: web::Path<Uuid>,
    input: web::Json<ReviewLeaveRequest>,
) -> Result<HttpResponse, AppError> {
    require_manager(&claims)?;
    let request_id = path.into_inner();

    service
        .reject(request_id, claims.user_id(), input.into_inner().note)
        .await?;

    log::info!("request {} rejected by {}", request_id, claims.user_id());

    Ok(HttpResponse::Ok().json(ApiResponse::message("Leave request rejected")))
}

/// Role checks stay at this boundary; the service layer only knows about
/// reviewer identity, not roles.
fn require_manager(claims: &Claims) -> Result<(), AppError> {
    if claims.is_manager() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "manager role required".to_string(),
        ))
    }
}
