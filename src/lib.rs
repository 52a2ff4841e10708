//! Salonkit API Library
//!
//! Multi-tenant salon and retail backend: shift lifecycle and cash-cut
//! reconciliation, purchase payment/balance ledger, inventory movements,
//! sales, appointments and expenses, all scoped per branch and account.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::errors::ApiError;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

/// The versioned API surface.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .nest("/shifts", handlers::shifts::shift_routes())
        .nest("/cash-cuts", handlers::cash_cuts::cash_cut_routes())
        .nest("/purchases", handlers::purchases::purchase_routes())
        .nest("/suppliers", handlers::suppliers::supplier_routes())
        .nest("/inventory", handlers::inventory::inventory_routes())
        .nest("/sales", handlers::sales::sale_routes())
        .nest("/appointments", handlers::appointments::appointment_routes())
        .nest("/expenses", handlers::expenses::expense_routes())
}

/// Full application router: root banner, versioned API, swagger UI and the
/// shared middleware stack. CORS is layered on by the binary, which owns
/// the origin configuration.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "salonkit-api up" }))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

async fn api_status() -> Result<Json<Value>, ApiError> {
    let status = json!({
        "status": "ok",
        "service": "salonkit-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    Ok(Json(status))
}

async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Ok(Json(json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
