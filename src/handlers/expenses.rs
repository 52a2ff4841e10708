use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    models::PaymentMethod,
    services::expenses::{CreateExpense, ExpenseFilter, UpdateExpense},
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseRequest {
    pub date: NaiveDate,
    pub category: Option<String>,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub amount: Decimal,
    pub payment_method: String,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub payment_method: Option<String>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpenseQuery {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn create_expense(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let created = state
        .services
        .expenses
        .create_expense(
            user.branch_id,
            user.user_id,
            CreateExpense {
                date: payload.date,
                category: payload.category,
                description: payload.description,
                amount: payload.amount,
                payment_method: PaymentMethod::new(&payload.payment_method),
                supplier: payload.supplier,
                notes: payload.notes,
            },
        )
        .await?;

    info!("Expense created: {}", created.id);
    Ok(created_response(created))
}

pub async fn update_expense(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .services
        .expenses
        .update_expense(
            expense_id,
            user.branch_id,
            UpdateExpense {
                date: payload.date,
                category: payload.category,
                description: payload.description,
                amount: payload.amount,
                payment_method: payload.payment_method.map(PaymentMethod::new),
                supplier: payload.supplier,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(success_response(updated))
}

pub async fn get_expense(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(expense_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let expense = state
        .services
        .expenses
        .get_expense(expense_id, user.branch_id)
        .await?;
    Ok(success_response(expense))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ExpenseQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let expenses = state
        .services
        .expenses
        .list_expenses(
            user.branch_id,
            ExpenseFilter {
                date: query.date,
                start_date: query.start_date,
                end_date: query.end_date,
                category: query.category,
            },
        )
        .await?;
    Ok(success_response(expenses))
}

pub async fn expense_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .services
        .expenses
        .summary_by_category(user.branch_id, query.start_date, query.end_date)
        .await?;
    Ok(success_response(summary))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(expense_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .expenses
        .delete_expense(expense_id, user.branch_id)
        .await?;

    info!("Expense deleted: {}", expense_id);
    Ok(success_response(serde_json::json!({
        "message": "expense deleted"
    })))
}

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/summary", get(expense_summary))
        .route(
            "/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}
