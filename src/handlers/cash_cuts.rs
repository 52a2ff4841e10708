use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{created_response, success_response};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    models::MethodTotals,
    services::cash_cuts::CreateCashCut,
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCashCutRequest {
    /// Shift to cut; its date and float define the window
    pub shift_id: Option<Uuid>,
    /// Ad-hoc window date when no shift is given; defaults to today
    pub date: Option<NaiveDate>,
    /// Physically counted amount per method; uncounted methods default to
    /// their expected value
    #[serde(default)]
    pub real_by_method: BTreeMap<String, Decimal>,
    pub final_cash: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct CashCutQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Compute and persist a cash cut snapshot
#[utoipa::path(
    post,
    path = "/api/v1/cash-cuts",
    request_body = CreateCashCutRequest,
    responses(
        (status = 201, description = "Cash cut created"),
        (status = 404, description = "Shift not found", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_cash_cut(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCashCutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let real_by_method = MethodTotals::from_rows(payload.real_by_method.into_iter());

    let created = state
        .services
        .cash_cuts
        .create_cut(
            user.branch_id,
            user.user_id,
            CreateCashCut {
                shift_id: payload.shift_id,
                date: payload.date,
                real_by_method,
                final_cash: payload.final_cash,
            },
        )
        .await?;

    info!("Cash cut created: {}", created.id);
    Ok(created_response(created))
}

pub async fn get_cash_cut(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(cash_cut_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let cut = state
        .services
        .cash_cuts
        .get_cut(cash_cut_id, user.branch_id)
        .await?;
    Ok(success_response(cut))
}

pub async fn list_cash_cuts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<CashCutQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let cuts = state
        .services
        .cash_cuts
        .list_cuts(user.branch_id, query.start_date, query.end_date)
        .await?;
    Ok(success_response(cuts))
}

pub async fn delete_cash_cut(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(cash_cut_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cash_cuts
        .delete_cut(cash_cut_id, user.branch_id)
        .await?;

    info!("Cash cut deleted: {}", cash_cut_id);
    Ok(success_response(serde_json::json!({
        "message": "cash cut deleted"
    })))
}

pub fn cash_cut_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cash_cuts).post(create_cash_cut))
        .route("/:id", get(get_cash_cut).delete(delete_cash_cut))
}
