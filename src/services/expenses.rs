//! Branch expenses.
//!
//! Expenses are single-method: the whole amount leaves through one payment
//! method, which is how the cash-cut engine buckets them.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::expense;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::PaymentMethod;

#[derive(Debug, Clone)]
pub struct CreateExpense {
    pub date: NaiveDate,
    pub category: Option<String>,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateExpense {
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

/// Filters for listing expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
}

/// Per-category totals over a date range.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Decimal,
    pub count: u64,
}

#[derive(Clone)]
pub struct ExpenseService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ExpenseService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create_expense(
        &self,
        branch_id: Uuid,
        user_id: Uuid,
        input: CreateExpense,
    ) -> Result<expense::Model, ServiceError> {
        if input.description.trim().is_empty() {
            return Err(ServiceError::Validation(
                "description is required".to_string(),
            ));
        }
        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::Validation(
                "amount must be positive".to_string(),
            ));
        }

        let created = expense::ActiveModel {
            id: Set(Uuid::new_v4()),
            branch_id: Set(branch_id),
            date: Set(input.date),
            category: Set(input.category),
            description: Set(input.description),
            amount: Set(input.amount),
            payment_method: Set(input.payment_method.to_string()),
            supplier: Set(input.supplier),
            notes: Set(input.notes),
            created_by: Set(user_id),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send(Event::ExpenseCreated(created.id))
            .await
            .map_err(ServiceError::Event)?;

        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        branch_id: Uuid,
        input: UpdateExpense,
    ) -> Result<expense::Model, ServiceError> {
        let existing = self.get_expense(expense_id, branch_id).await?;

        let mut active: expense::ActiveModel = existing.into();
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        if let Some(category) = input.category {
            active.category = Set(Some(category));
        }
        if let Some(description) = input.description {
            if description.trim().is_empty() {
                return Err(ServiceError::Validation(
                    "description is required".to_string(),
                ));
            }
            active.description = Set(description);
        }
        if let Some(amount) = input.amount {
            if amount <= Decimal::ZERO {
                return Err(ServiceError::Validation(
                    "amount must be positive".to_string(),
                ));
            }
            active.amount = Set(amount);
        }
        if let Some(payment_method) = input.payment_method {
            active.payment_method = Set(payment_method.to_string());
        }
        if let Some(supplier) = input.supplier {
            active.supplier = Set(Some(supplier));
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }

        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_expense(
        &self,
        expense_id: Uuid,
        branch_id: Uuid,
    ) -> Result<(), ServiceError> {
        let existing = self.get_expense(expense_id, branch_id).await?;
        existing.delete(&*self.db).await?;

        self.event_sender
            .send(Event::ExpenseDeleted(expense_id))
            .await
            .map_err(ServiceError::Event)?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_expense(
        &self,
        expense_id: Uuid,
        branch_id: Uuid,
    ) -> Result<expense::Model, ServiceError> {
        expense::Entity::find_by_id(expense_id)
            .filter(expense::Column::BranchId.eq(branch_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("expense", expense_id))
    }

    #[instrument(skip(self))]
    pub async fn list_expenses(
        &self,
        branch_id: Uuid,
        filter: ExpenseFilter,
    ) -> Result<Vec<expense::Model>, ServiceError> {
        let mut query = expense::Entity::find().filter(expense::Column::BranchId.eq(branch_id));

        if let Some(date) = filter.date {
            query = query.filter(expense::Column::Date.eq(date));
        }
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            query = query.filter(expense::Column::Date.between(start, end));
        }
        if let Some(category) = filter.category {
            query = query.filter(expense::Column::Category.eq(category));
        }

        Ok(query
            .order_by_desc(expense::Column::Date)
            .order_by_desc(expense::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Totals per category over a date range. Uncategorized expenses group
    /// under "uncategorized".
    #[instrument(skip(self))]
    pub async fn summary_by_category(
        &self,
        branch_id: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<CategorySummary>, ServiceError> {
        let expenses = self
            .list_expenses(
                branch_id,
                ExpenseFilter {
                    start_date,
                    end_date,
                    ..Default::default()
                },
            )
            .await?;

        let mut buckets: BTreeMap<String, (Decimal, u64)> = BTreeMap::new();
        for e in expenses {
            let category = e
                .category
                .unwrap_or_else(|| "uncategorized".to_string());
            let entry = buckets.entry(category).or_insert((Decimal::ZERO, 0));
            entry.0 += e.amount;
            entry.1 += 1;
        }

        Ok(buckets
            .into_iter()
            .map(|(category, (total, count))| CategorySummary {
                category,
                total,
                count,
            })
            .collect())
    }
}
