use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    models::MovementType,
    services::inventory::MovementFilter,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct StockMovementRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StockAdjustmentRequest {
    pub product_id: Uuid,
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub new_stock: i32,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub product_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    #[serde(default)]
    pub below_min: bool,
}

pub async fn stock_in(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<StockMovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .inventory
        .stock_in(
            user.branch_id,
            user.user_id,
            payload.product_id,
            payload.quantity,
            payload.reason,
        )
        .await?;

    info!("Stock in: {} x{}", payload.product_id, payload.quantity);
    Ok(created_response(serde_json::json!({
        "message": "stock updated"
    })))
}

pub async fn stock_out(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<StockMovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .inventory
        .stock_out(
            user.branch_id,
            user.user_id,
            payload.product_id,
            payload.quantity,
            payload.reason,
        )
        .await?;

    info!("Stock out: {} x{}", payload.product_id, payload.quantity);
    Ok(created_response(serde_json::json!({
        "message": "stock updated"
    })))
}

pub async fn stock_adjustment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<StockAdjustmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let difference = state
        .services
        .inventory
        .adjust_stock(
            user.account_id,
            user.branch_id,
            user.user_id,
            payload.product_id,
            payload.new_stock,
            payload.reason,
        )
        .await?;

    info!(
        "Stock adjusted: {} to {} ({:+})",
        payload.product_id, payload.new_stock, difference
    );
    Ok(created_response(serde_json::json!({
        "message": "stock adjusted",
        "difference": difference,
    })))
}

pub async fn list_movements(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<MovementQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let movements = state
        .services
        .inventory
        .list_movements(
            user.branch_id,
            MovementFilter {
                product_id: query.product_id,
                movement_type: query.movement_type,
                start_date: query.start_date,
                end_date: query.end_date,
            },
        )
        .await?;
    Ok(success_response(movements))
}

pub async fn stock_levels(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<StockQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .inventory
        .stock_levels(user.account_id, query.below_min)
        .await?;
    Ok(success_response(products))
}

pub async fn inventory_value(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let value = state
        .services
        .inventory
        .inventory_value(user.account_id)
        .await?;
    Ok(success_response(value))
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/in", post(stock_in))
        .route("/out", post(stock_out))
        .route("/adjustment", post(stock_adjustment))
        .route("/movements", get(list_movements))
        .route("/stock", get(stock_levels))
        .route("/value", get(inventory_value))
}
