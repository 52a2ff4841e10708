use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    models::{PaymentMethod, SaleItemKind},
    services::sales::{CreateSale, NewSaleItem, NewTicketPayment},
    AppState,
};

#[derive(Debug, Deserialize, Serialize)]
pub struct SaleItemRequest {
    pub item_type: SaleItemKind,
    pub item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct TicketPaymentRequest {
    pub amount: Decimal,
    pub method: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSaleRequest {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub stylist_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    #[validate(length(min = 1, message = "at least one item is required"))]
    pub items: Vec<SaleItemRequest>,
    #[serde(default)]
    pub payments: Vec<TicketPaymentRequest>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaleQuery {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn create_sale(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateSaleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateSale {
        date: payload.date,
        time: payload.time,
        stylist_id: payload.stylist_id,
        client_name: payload.client_name,
        client_phone: payload.client_phone,
        items: payload
            .items
            .into_iter()
            .map(|item| NewSaleItem {
                item_type: item.item_type,
                item_id: item.item_id,
                name: item.name,
                quantity: item.quantity,
                price: item.price,
                discount: item.discount,
                subtotal: item.subtotal,
            })
            .collect(),
        payments: payload
            .payments
            .into_iter()
            .map(|p| NewTicketPayment {
                amount: p.amount,
                method: PaymentMethod::new(&p.method),
            })
            .collect(),
        subtotal: payload.subtotal,
        discount: payload.discount,
        total: payload.total,
        notes: payload.notes,
    };

    let created = state
        .services
        .sales
        .create_sale(user.branch_id, user.user_id, input)
        .await?;

    info!("Sale created: {}", created.id);
    Ok(created_response(serde_json::json!({
        "id": created.id,
        "message": "sale created successfully",
    })))
}

pub async fn get_sale(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .sales
        .get_sale(sale_id, user.branch_id)
        .await?;
    Ok(success_response(detail))
}

pub async fn list_sales(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<SaleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sales = state
        .services
        .sales
        .list_sales(user.branch_id, query.date, query.start_date, query.end_date)
        .await?;
    Ok(success_response(sales))
}

pub async fn delete_sale(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .sales
        .delete_sale(sale_id, user.branch_id, user.user_id)
        .await?;

    info!("Sale deleted: {}", sale_id);
    Ok(success_response(serde_json::json!({
        "message": "sale deleted"
    })))
}

pub fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/:id", get(get_sale).delete(delete_sale))
}
