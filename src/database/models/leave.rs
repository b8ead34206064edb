use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::macros::string_enum;
use crate::error::LeaveError;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum LeaveType {
        #[serde(rename = "sick_leave")]
        Sick => "sick_leave",
        #[serde(rename = "annual_leave")]
        Annual => "annual_leave",
        #[serde(rename = "personal_leave")]
        Personal => "personal_leave",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum LeaveStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// Review outcome of a request. A request is either untouched or carries the
/// full reviewer record; there is no state where only part of it is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Review {
    Unreviewed,
    Reviewed {
        reviewer_id: Uuid,
        note: Option<String>,
        reviewed_at: DateTime<Utc>,
    },
}

impl Review {
    pub fn reviewer_id(&self) -> Option<Uuid> {
        match self {
            Review::Reviewed { reviewer_id, .. } => Some(*reviewer_id),
            Review::Unreviewed => None,
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            Review::Reviewed { note, .. } => note.as_deref(),
            Review::Unreviewed => None,
        }
    }

    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Review::Reviewed { reviewed_at, .. } => Some(*reviewed_at),
            Review::Unreviewed => None,
        }
    }
}

/// Inclusive day count between two calendar dates; both endpoints count, so a
/// single-day leave is 1.
pub fn leave_days(start_date: NaiveDate, end_date: NaiveDate) -> BigDecimal {
    BigDecimal::from((end_date - start_date).num_days() + 1)
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: BigDecimal,
    pub reason: String,
    pub status: LeaveStatus,
    pub review: Review,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Builds a pending request. `total_days` is fixed here and never
    /// recomputed, even if the stored dates are edited later.
    pub fn new(
        user_id: Uuid,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            leave_type,
            start_date,
            end_date,
            total_days: leave_days(start_date, end_date),
            reason: reason.into(),
            status: LeaveStatus::Pending,
            review: Review::Unreviewed,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }

    /// Pending → approved. Fails on terminal requests; approved and rejected
    /// requests never change again through this path.
    pub fn approve(&mut self, reviewer_id: Uuid, note: Option<String>) -> Result<(), LeaveError> {
        self.transition(LeaveStatus::Approved, reviewer_id, note)
    }

    /// Pending → rejected, same guard as [`LeaveRequest::approve`].
    pub fn reject(&mut self, reviewer_id: Uuid, note: Option<String>) -> Result<(), LeaveError> {
        self.transition(LeaveStatus::Rejected, reviewer_id, note)
    }

    fn transition(
        &mut self,
        to: LeaveStatus,
        reviewer_id: Uuid,
        note: Option<String>,
    ) -> Result<(), LeaveError> {
        if self.status != LeaveStatus::Pending {
            return Err(LeaveError::RequestNotPending);
        }
        let now = Utc::now();
        self.status = to;
        self.review = Review::Reviewed {
            reviewer_id,
            note,
            reviewed_at: now,
        };
        self.updated_at = now;
        Ok(())
    }
}

// Review state lives in nullable columns; reassemble the sum type from
// whether reviewer_id is present.
impl<'r> sqlx::FromRow<'r, PgRow> for LeaveRequest {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let review = match row.try_get::<Option<Uuid>, _>("reviewer_id")? {
            Some(reviewer_id) => Review::Reviewed {
                reviewer_id,
                note: row.try_get("review_note")?,
                reviewed_at: row.try_get("reviewed_at")?,
            },
            None => Review::Unreviewed,
        };

        Ok(LeaveRequest {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            leave_type: row.try_get("leave_type")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            total_days: row.try_get("total_days")?,
            reason: row.try_get("reason")?,
            status: row.try_get("status")?,
            review,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Yearly quota for one (user, leave type) pair. Mutated only through the
/// repository's guarded updates; the arithmetic here backs those guards and
/// the read-side views.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaveBalance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub leave_type: LeaveType,
    pub year: i32,
    pub total_days: BigDecimal,
    pub used_days: BigDecimal,
    pub pending_days: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveBalance {
    pub fn new(user_id: Uuid, leave_type: LeaveType, total_days: BigDecimal, year: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            leave_type,
            year,
            total_days,
            used_days: BigDecimal::zero(),
            pending_days: BigDecimal::zero(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Days still open for new requests: reserved (pending) days are already
    /// spoken for and count against availability.
    pub fn available_days(&self) -> BigDecimal {
        &self.total_days - &self.used_days - &self.pending_days
    }

    pub fn has_sufficient(&self, days: &BigDecimal) -> bool {
        self.available_days() >= *days
    }

    pub fn deduct(&mut self, days: &BigDecimal) -> Result<(), LeaveError> {
        if !self.has_sufficient(days) {
            return Err(LeaveError::InsufficientBalance);
        }
        self.used_days = &self.used_days + days;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Returns consumed days to availability, clamping at zero so an
    /// over-credit can never drive `used_days` negative.
    pub fn restore(&mut self, days: &BigDecimal) {
        self.used_days = &self.used_days - days;
        if self.used_days < BigDecimal::zero() {
            self.used_days = BigDecimal::zero();
        }
        self.updated_at = Utc::now();
    }
}
