//! Shift lifecycle: `none → open → closed` per branch.
//!
//! The "at most one open shift per branch" invariant is enforced twice: an
//! application-level pre-check produces the friendly conflict message, and
//! the partial unique index on `shifts (branch_id) WHERE status = 'open'`
//! wins the race two concurrent opens would otherwise create. Closing an
//! already-closed shift fails with a conflict rather than silently
//! re-closing.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::shift;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::ShiftStatus;

/// Filters for listing shifts.
#[derive(Debug, Clone, Default)]
pub struct ShiftFilter {
    pub status: Option<ShiftStatus>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct ShiftService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ShiftService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Opens a shift with a starting cash float. Fails with a conflict if
    /// the branch already has an open shift.
    #[instrument(skip(self))]
    pub async fn open_shift(
        &self,
        branch_id: Uuid,
        user_id: Uuid,
        initial_cash: Decimal,
    ) -> Result<shift::Model, ServiceError> {
        if initial_cash < Decimal::ZERO {
            return Err(ServiceError::Validation(
                "initial cash cannot be negative".to_string(),
            ));
        }

        if self.get_open_shift(branch_id).await?.is_some() {
            return Err(ServiceError::Conflict(
                "a shift is already open for this branch".to_string(),
            ));
        }

        let now = Utc::now();
        let model = shift::ActiveModel {
            id: Set(Uuid::new_v4()),
            branch_id: Set(branch_id),
            user_id: Set(user_id),
            date: Set(now.date_naive()),
            start_time: Set(now.time()),
            end_time: Set(None),
            initial_cash: Set(initial_cash),
            final_cash: Set(None),
            status: Set(ShiftStatus::Open.to_string()),
            created_at: Set(now),
        };

        // The partial unique index turns the remaining check-then-insert
        // window into a unique violation.
        let opened = model.insert(&*self.db).await.map_err(|e| {
            ServiceError::on_unique_violation(e, "a shift is already open for this branch")
        })?;

        self.event_sender
            .send(Event::ShiftOpened {
                shift_id: opened.id,
                branch_id,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(opened)
    }

    /// Closes a shift with the counted drawer amount.
    #[instrument(skip(self))]
    pub async fn close_shift(
        &self,
        shift_id: Uuid,
        branch_id: Uuid,
        final_cash: Decimal,
    ) -> Result<shift::Model, ServiceError> {
        let existing = self.get_shift(shift_id, branch_id).await?;

        let status: ShiftStatus = existing
            .status
            .parse()
            .map_err(|_| ServiceError::InvalidState(format!("unknown shift status {}", existing.status)))?;
        if status == ShiftStatus::Closed {
            return Err(ServiceError::Conflict("shift is already closed".to_string()));
        }

        let mut active: shift::ActiveModel = existing.into();
        active.end_time = Set(Some(Utc::now().time()));
        active.final_cash = Set(Some(final_cash));
        active.status = Set(ShiftStatus::Closed.to_string());
        let closed = active.update(&*self.db).await?;

        self.event_sender
            .send(Event::ShiftClosed {
                shift_id: closed.id,
                branch_id,
                final_cash,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(closed)
    }

    /// The branch's open shift, if any. At most one exists.
    #[instrument(skip(self))]
    pub async fn get_open_shift(
        &self,
        branch_id: Uuid,
    ) -> Result<Option<shift::Model>, ServiceError> {
        let open = shift::Entity::find()
            .filter(shift::Column::BranchId.eq(branch_id))
            .filter(shift::Column::Status.eq(ShiftStatus::Open.to_string()))
            .one(&*self.db)
            .await?;
        Ok(open)
    }

    #[instrument(skip(self))]
    pub async fn get_shift(
        &self,
        shift_id: Uuid,
        branch_id: Uuid,
    ) -> Result<shift::Model, ServiceError> {
        shift::Entity::find_by_id(shift_id)
            .filter(shift::Column::BranchId.eq(branch_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("shift", shift_id))
    }

    /// Lists a branch's shifts, newest first.
    #[instrument(skip(self))]
    pub async fn list_shifts(
        &self,
        branch_id: Uuid,
        filter: ShiftFilter,
    ) -> Result<Vec<shift::Model>, ServiceError> {
        let mut query = shift::Entity::find().filter(shift::Column::BranchId.eq(branch_id));

        if let Some(status) = filter.status {
            query = query.filter(shift::Column::Status.eq(status.to_string()));
        }
        if let Some(date) = filter.date {
            query = query.filter(shift::Column::Date.eq(date));
        }
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            query = query.filter(shift::Column::Date.between(start, end));
        }

        let shifts = query
            .order_by_desc(shift::Column::Date)
            .order_by_desc(shift::Column::StartTime)
            .all(&*self.db)
            .await?;
        Ok(shifts)
    }
}
