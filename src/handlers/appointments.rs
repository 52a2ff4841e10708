use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::common::{created_response, success_response};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    models::{AppointmentStatus, PaymentMethod, SaleItemKind},
    services::appointments::{CreateAppointment, NewAppointmentItem},
    services::sales::NewTicketPayment,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct AppointmentItemRequest {
    pub item_type: SaleItemKind,
    pub item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub stylist_id: Option<Uuid>,
    #[serde(default)]
    pub items: Vec<AppointmentItemRequest>,
    #[serde(default)]
    pub payments: Vec<super::sales::TicketPaymentRequest>,
    #[serde(default)]
    pub total: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentQuery {
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

pub async fn create_appointment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = CreateAppointment {
        date: payload.date,
        start_time: payload.start_time,
        client_id: payload.client_id,
        client_name: payload.client_name,
        stylist_id: payload.stylist_id,
        items: payload
            .items
            .into_iter()
            .map(|item| NewAppointmentItem {
                item_type: item.item_type,
                item_id: item.item_id,
                name: item.name,
                quantity: item.quantity,
                price: item.price,
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
        total: payload.total,
        notes: payload.notes,
    };

    let created = state
        .services
        .appointments
        .create_appointment(user.branch_id, user.user_id, input)
        .await?;

    info!("Appointment created: {}", created.id);
    Ok(created_response(serde_json::json!({
        "id": created.id,
        "message": "appointment created successfully",
    })))
}

/// Status transition; moving to `completed` consumes product items from
/// stock exactly once.
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .services
        .appointments
        .update_status(appointment_id, user.branch_id, user.user_id, payload.status)
        .await?;

    info!(
        "Appointment {} status changed to {}",
        appointment_id, updated.status
    );
    Ok(success_response(serde_json::json!({
        "message": "appointment updated",
        "status": updated.status,
    })))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(appointment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .appointments
        .get_appointment(appointment_id, user.branch_id)
        .await?;
    Ok(success_response(detail))
}

pub async fn list_appointments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<AppointmentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let appointments = state
        .services
        .appointments
        .list_appointments(user.branch_id, query.date, query.status)
        .await?;
    Ok(success_response(appointments))
}

pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route("/:id", get(get_appointment))
        .route("/:id/status", patch(update_status))
}
