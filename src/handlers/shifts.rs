use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{created_response, success_response};
use crate::{
    auth::AuthenticatedUser,
    entities::shift,
    errors::ApiError,
    models::{MethodTotals, ShiftStatus},
    services::shifts::ShiftFilter,
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenShiftRequest {
    /// Starting cash float counted into the drawer
    pub initial_cash: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CloseShiftRequest {
    /// Cash physically counted at close
    pub final_cash: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ShiftQuery {
    pub status: Option<ShiftStatus>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Scalar aggregates for a shift's window.
#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryTotals {
    pub total_sales: Decimal,
    pub total_expenses: Decimal,
    pub total_purchases: Decimal,
    pub completed_appointments: i64,
}

/// Live expected-per-method view of a shift, computed on request and not
/// persisted.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSummaryResponse {
    #[schema(value_type = Object)]
    pub shift: shift::Model,
    pub totals: SummaryTotals,
    #[schema(value_type = Object)]
    pub sales_by_method: MethodTotals,
    #[schema(value_type = Object)]
    pub expenses_by_method: MethodTotals,
    #[schema(value_type = Object)]
    pub purchases_by_method: MethodTotals,
    #[schema(value_type = Object)]
    pub expected_by_method: MethodTotals,
}

/// Open a shift with a starting cash float
#[utoipa::path(
    post,
    path = "/api/v1/shifts/open",
    request_body = OpenShiftRequest,
    responses(
        (status = 201, description = "Shift opened"),
        (status = 400, description = "A shift is already open for this branch", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn open_shift(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<OpenShiftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let opened = state
        .services
        .shifts
        .open_shift(user.branch_id, user.user_id, payload.initial_cash)
        .await?;

    info!("Shift opened: {}", opened.id);
    Ok(created_response(opened))
}

/// Close a shift with the counted drawer amount
#[utoipa::path(
    post,
    path = "/api/v1/shifts/{id}/close",
    params(("id" = Uuid, Path, description = "Shift id")),
    request_body = CloseShiftRequest,
    responses(
        (status = 200, description = "Shift closed"),
        (status = 400, description = "Shift is already closed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Shift not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn close_shift(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(shift_id): Path<Uuid>,
    Json(payload): Json<CloseShiftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let closed = state
        .services
        .shifts
        .close_shift(shift_id, user.branch_id, payload.final_cash)
        .await?;

    info!("Shift closed: {}", closed.id);
    Ok(success_response(serde_json::json!({
        "message": "shift closed successfully",
        "shift": closed,
    })))
}

/// The branch's open shift, or null when none is open.
pub async fn get_open_shift(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let open = state.services.shifts.get_open_shift(user.branch_id).await?;
    Ok(Json(open))
}

pub async fn get_shift(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = state
        .services
        .shifts
        .get_shift(shift_id, user.branch_id)
        .await?;
    Ok(success_response(shift))
}

pub async fn list_shifts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ShiftQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let shifts = state
        .services
        .shifts
        .list_shifts(
            user.branch_id,
            ShiftFilter {
                status: query.status,
                date: query.date,
                start_date: query.start_date,
                end_date: query.end_date,
            },
        )
        .await?;
    Ok(success_response(shifts))
}

/// Live reconciliation summary for a shift's date window
#[utoipa::path(
    get,
    path = "/api/v1/shifts/{id}/summary",
    params(("id" = Uuid, Path, description = "Shift id")),
    responses(
        (status = 200, description = "Summary computed", body = ShiftSummaryResponse),
        (status = 404, description = "Shift not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn shift_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .services
        .cash_cuts
        .shift_summary(shift_id, user.branch_id)
        .await?;

    Ok(success_response(ShiftSummaryResponse {
        shift: summary.shift,
        totals: SummaryTotals {
            total_sales: summary.window.total_sales,
            total_expenses: summary.window.total_expenses,
            total_purchases: summary.window.total_purchases,
            completed_appointments: summary.window.completed_appointments,
        },
        sales_by_method: summary.window.sales_by_method,
        expenses_by_method: summary.window.expenses_by_method,
        purchases_by_method: summary.window.purchases_by_method,
        expected_by_method: summary.expected_by_method,
    }))
}

pub fn shift_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shifts))
        .route("/open", get(get_open_shift).post(open_shift))
        .route("/:id", get(get_shift))
        .route("/:id/close", post(close_shift))
        .route("/:id/summary", get(shift_summary))
}
