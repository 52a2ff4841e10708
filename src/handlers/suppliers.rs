use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    services::suppliers::{CreateSupplier, UpdateSupplier},
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub credit_days: i32,
    #[serde(default)]
    pub credit_limit: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub credit_days: Option<i32>,
    pub credit_limit: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SupplierQuery {
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReconcileQuery {
    /// Correct the stored balance to the recomputed value
    #[serde(default)]
    pub repair: bool,
}

pub async fn create_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let created = state
        .services
        .suppliers
        .create_supplier(
            user.account_id,
            CreateSupplier {
                name: payload.name,
                contact_name: payload.contact_name,
                phone: payload.phone,
                email: payload.email,
                credit_days: payload.credit_days,
                credit_limit: payload.credit_limit,
                notes: payload.notes,
            },
        )
        .await?;

    info!("Supplier created: {}", created.id);
    Ok(created_response(created))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .services
        .suppliers
        .update_supplier(
            supplier_id,
            user.account_id,
            UpdateSupplier {
                name: payload.name,
                contact_name: payload.contact_name,
                phone: payload.phone,
                email: payload.email,
                credit_days: payload.credit_days,
                credit_limit: payload.credit_limit,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(success_response(updated))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let supplier = state
        .services
        .suppliers
        .get_supplier(supplier_id, user.account_id)
        .await?;
    Ok(success_response(supplier))
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<SupplierQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let suppliers = state
        .services
        .suppliers
        .list_suppliers(user.account_id, query.active_only)
        .await?;
    Ok(success_response(suppliers))
}

/// Deactivation; refused while purchases are pending payment.
pub async fn deactivate_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .suppliers
        .deactivate_supplier(supplier_id, user.account_id)
        .await?;

    info!("Supplier deactivated: {}", supplier_id);
    Ok(success_response(serde_json::json!({
        "message": "supplier deactivated"
    })))
}

pub async fn supplier_statement(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let statement = state
        .services
        .suppliers
        .statement(supplier_id, user.account_id)
        .await?;
    Ok(success_response(statement))
}

pub async fn pending_purchases(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pending = state
        .services
        .suppliers
        .pending_purchases(supplier_id, user.account_id)
        .await?;
    Ok(success_response(pending))
}

/// Recompute the running balance from purchase history and report drift.
pub async fn reconcile_balance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(supplier_id): Path<Uuid>,
    Query(query): Query<ReconcileQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let reconciliation = state
        .services
        .suppliers
        .reconcile_balance(supplier_id, user.account_id, query.repair)
        .await?;
    Ok(success_response(reconciliation))
}

pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier)
                .put(update_supplier)
                .delete(deactivate_supplier),
        )
        .route("/:id/statement", get(supplier_statement))
        .route("/:id/pending", get(pending_purchases))
        .route("/:id/reconcile", post(reconcile_balance))
}
