use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::handlers::shared::ApiResponse;

/// Closed error taxonomy for the leave workflow. Every business failure the
/// service layer can produce is one of these kinds; the HTTP mapping lives in
/// [`AppError`] and nowhere else.
#[derive(Error, Debug)]
pub enum LeaveError {
    #[error("unknown leave type")]
    InvalidLeaveType,

    #[error("invalid date range: end date must not be before start date")]
    InvalidDateRange,

    #[error("requested dates overlap an existing leave request")]
    OverlappingLeave,

    #[error("insufficient leave balance")]
    InsufficientBalance,

    #[error("leave request not found")]
    RequestNotFound,

    #[error("cannot approve or reject your own leave request")]
    SelfApproval,

    #[error("leave request is not pending")]
    RequestNotPending,

    #[error("leave request was already processed")]
    AlreadyProcessed,

    #[error("no leave balance for the requested type and year")]
    BalanceNotFound,

    /// A workflow step failed and the compensating rollback failed too.
    /// Request and balance records may disagree until an operator reconciles
    /// them, so both failures are preserved verbatim.
    #[error("{operation} failed and rollback failed, manual reconciliation required: {source} (rollback: {rollback})")]
    ReconciliationRequired {
        operation: &'static str,
        source: Box<LeaveError>,
        rollback: Box<LeaveError>,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LeaveError {
    pub fn needs_reconciliation(&self) -> bool {
        matches!(self, LeaveError::ReconciliationRequired { .. })
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Leave(#[from] LeaveError),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal server error: {0}")]
    Internal(anyhow::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Leave(err) => leave_status_code(err),
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            log::error!("request failed with status {}: {:#}", status_code, self);
        } else {
            log::debug!("request rejected with status {}: {}", status_code, self);
        }

        // Reconciliation details belong in the log, not in the client payload.
        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status_code).json(ApiResponse::<()>::error(&message))
    }
}

fn leave_status_code(err: &LeaveError) -> StatusCode {
    match err {
        LeaveError::InvalidLeaveType | LeaveError::InvalidDateRange => StatusCode::BAD_REQUEST,
        LeaveError::SelfApproval => StatusCode::FORBIDDEN,
        LeaveError::RequestNotFound | LeaveError::BalanceNotFound => StatusCode::NOT_FOUND,
        LeaveError::OverlappingLeave
        | LeaveError::RequestNotPending
        | LeaveError::AlreadyProcessed => StatusCode::CONFLICT,
        LeaveError::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
        LeaveError::ReconciliationRequired { .. } | LeaveError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leave_errors_map_to_expected_statuses() {
        let cases = [
            (LeaveError::InvalidLeaveType, StatusCode::BAD_REQUEST),
            (LeaveError::InvalidDateRange, StatusCode::BAD_REQUEST),
            (LeaveError::OverlappingLeave, StatusCode::CONFLICT),
            (LeaveError::RequestNotPending, StatusCode::CONFLICT),
            (LeaveError::AlreadyProcessed, StatusCode::CONFLICT),
            (
                LeaveError::InsufficientBalance,
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (LeaveError::RequestNotFound, StatusCode::NOT_FOUND),
            (LeaveError::BalanceNotFound, StatusCode::NOT_FOUND),
            (LeaveError::SelfApproval, StatusCode::FORBIDDEN),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn reconciliation_error_keeps_both_failures() {
        let err = LeaveError::ReconciliationRequired {
            operation: "persist leave request",
            source: Box::new(LeaveError::Database(sqlx::Error::PoolClosed)),
            rollback: Box::new(LeaveError::BalanceNotFound),
        };

        assert!(err.needs_reconciliation());
        let message = err.to_string();
        assert!(message.contains("manual reconciliation required"));
        assert!(message.contains("rollback"));
        assert_eq!(
            AppError::from(err).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
