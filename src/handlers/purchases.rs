use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    models::{PaymentMethod, PurchasePaymentType, PurchaseStatus},
    services::purchases::{
        CreatePurchase, NewPurchaseLine, NewPurchasePayment, PurchaseFilter,
    },
    AppState,
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PurchaseLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchasePaymentRequest {
    pub amount: Decimal,
    pub method: String,
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseRequest {
    pub date: NaiveDate,
    pub supplier_id: Option<Uuid>,
    #[validate(length(min = 1, message = "at least one line is required"))]
    pub lines: Vec<PurchaseLineRequest>,
    #[serde(default)]
    pub payments: Vec<PurchasePaymentRequest>,
    pub payment_type: PurchasePaymentType,
    pub due_date: Option<NaiveDate>,
    pub total: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddPaymentRequest {
    pub amount: Decimal,
    pub payment_method: String,
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseQuery {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<PurchaseStatus>,
    pub supplier_id: Option<Uuid>,
}

/// Record a purchase with lines and up-front payments
#[utoipa::path(
    post,
    path = "/api/v1/purchases",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 201, description = "Purchase created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier or product not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_purchase(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePurchaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreatePurchase {
        date: payload.date,
        supplier_id: payload.supplier_id,
        lines: payload
            .lines
            .into_iter()
            .map(|line| NewPurchaseLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                subtotal: line.subtotal,
            })
            .collect(),
        payments: payload
            .payments
            .into_iter()
            .map(|p| NewPurchasePayment {
                amount: p.amount,
                method: PaymentMethod::new(&p.method),
                reference: p.reference,
            })
            .collect(),
        payment_type: payload.payment_type,
        due_date: payload.due_date,
        total: payload.total,
        notes: payload.notes,
    };

    let created = state
        .services
        .purchases
        .create_purchase(user.branch_id, user.account_id, user.user_id, input)
        .await?;

    info!("Purchase created: {}", created.id);
    Ok(created_response(serde_json::json!({
        "id": created.id,
        "status": created.status,
        "balance": created.balance,
        "message": "purchase created successfully",
    })))
}

/// Add a partial payment to a purchase
#[utoipa::path(
    post,
    path = "/api/v1/purchases/{id}/payments",
    params(("id" = Uuid, Path, description = "Purchase id")),
    request_body = AddPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded"),
        (status = 400, description = "Purchase is paid or cancelled", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(purchase_id): Path<Uuid>,
    Json(payload): Json<AddPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .services
        .purchases
        .add_payment(
            purchase_id,
            user.branch_id,
            user.user_id,
            payload.amount,
            PaymentMethod::new(&payload.payment_method),
            payload.reference,
        )
        .await?;

    info!("Payment added to purchase {}", purchase_id);
    Ok(created_response(serde_json::json!({
        "id": updated.id,
        "paid_amount": updated.paid_amount,
        "balance": updated.balance,
        "status": updated.status,
    })))
}

/// Cancel a purchase, reversing stock and supplier balance
#[utoipa::path(
    patch,
    path = "/api/v1/purchases/{id}/cancel",
    params(("id" = Uuid, Path, description = "Purchase id")),
    responses(
        (status = 200, description = "Purchase cancelled"),
        (status = 400, description = "Purchase is already cancelled", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_purchase(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(purchase_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let cancelled = state
        .services
        .purchases
        .cancel_purchase(purchase_id, user.branch_id, user.user_id)
        .await?;

    info!("Purchase cancelled: {}", purchase_id);
    Ok(success_response(serde_json::json!({
        "message": "purchase cancelled",
        "status": cancelled.status,
    })))
}

/// Delete a purchase with full reversal
#[utoipa::path(
    delete,
    path = "/api/v1/purchases/{id}",
    params(("id" = Uuid, Path, description = "Purchase id")),
    responses(
        (status = 200, description = "Purchase deleted"),
        (status = 404, description = "Purchase not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_purchase(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(purchase_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .purchases
        .delete_purchase(purchase_id, user.branch_id, user.user_id)
        .await?;

    info!("Purchase deleted: {}", purchase_id);
    Ok(success_response(serde_json::json!({
        "message": "purchase deleted"
    })))
}

pub async fn get_purchase(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(purchase_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .purchases
        .get_purchase(purchase_id, user.branch_id)
        .await?;
    Ok(success_response(detail))
}

pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PurchaseQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let purchases = state
        .services
        .purchases
        .list_purchases(
            user.branch_id,
            PurchaseFilter {
                date: query.date,
                start_date: query.start_date,
                end_date: query.end_date,
                status: query.status,
                supplier_id: query.supplier_id,
            },
        )
        .await?;
    Ok(success_response(purchases))
}

pub fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchases).post(create_purchase))
        .route("/:id", get(get_purchase).delete(delete_purchase))
        .route("/:id/payments", post(add_payment))
        .route("/:id/cancel", patch(cancel_purchase))
}
