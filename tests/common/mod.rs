#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use salonkit_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db::{self, DbConfig},
    entities::{product, supplier},
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};

/// Test harness: the full application router over a fresh in-memory SQLite
/// database with migrations applied, plus a signed session token.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub token: String,
    pub user_id: Uuid,
    pub branch_id: Uuid,
    pub account_id: Uuid,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        // In-memory SQLite: a single connection so every query sees the
        // same database.
        let db_cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_cfg)
            .await
            .expect("db connect");
        db::run_migrations(&pool).await.expect("migrations");
        let db_arc = Arc::new(pool);

        let cfg = AppConfig {
            database_url: db_cfg.url.clone(),
            jwt_secret: "test-secret-long-enough-for-hs256".to_string(),
            jwt_expiration: 3600,
            auth_issuer: "salonkit-api".to_string(),
            host: "127.0.0.1".to_string(),
            port: 18080,
            environment: "test".to_string(),
            log_level: "warn".to_string(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            db_max_connections: 1,
            db_min_connections: 1,
        };

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_service = Arc::new(AuthService::new(AuthConfig {
            secret: cfg.jwt_secret.clone(),
            issuer: cfg.auth_issuer.clone(),
            expiration_secs: cfg.jwt_expiration,
        }));

        let services = AppServices::new(db_arc.clone(), event_sender.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            auth: auth_service.clone(),
            services,
        };

        let user_id = Uuid::new_v4();
        let branch_id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let token = auth_service
            .issue_token(user_id, branch_id, account_id, "manager")
            .expect("token");

        let router = salonkit_api::app_router(state.clone());

        Self {
            router,
            state,
            token,
            user_id,
            branch_id,
            account_id,
            _event_task: event_task,
        }
    }

    /// Token for a session on a different branch of the same account.
    pub fn token_for_branch(&self, branch_id: Uuid) -> String {
        self.state
            .auth
            .issue_token(Uuid::new_v4(), branch_id, self.account_id, "manager")
            .expect("token")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let token = self.token.clone();
        self.request_with_token(method, uri, body, Some(&token))
            .await
    }

    pub async fn request_with_token(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, body).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Seeds a product owned by the harness account.
    pub async fn seed_product(&self, name: &str, stock: i32) -> Uuid {
        let id = Uuid::new_v4();
        product::ActiveModel {
            id: Set(id),
            account_id: Set(self.account_id),
            name: Set(name.to_string()),
            sku: Set(None),
            category: Set(None),
            stock: Set(stock),
            min_stock: Set(0),
            price: Set(Decimal::ZERO),
            cost: Set(Decimal::ZERO),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product");
        id
    }

    pub async fn seed_supplier(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        supplier::ActiveModel {
            id: Set(id),
            account_id: Set(self.account_id),
            name: Set(name.to_string()),
            contact_name: Set(None),
            phone: Set(None),
            email: Set(None),
            balance: Set(Decimal::ZERO),
            credit_days: Set(30),
            credit_limit: Set(Decimal::ZERO),
            notes: Set(None),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed supplier");
        id
    }

    pub async fn product_stock(&self, product_id: Uuid) -> i32 {
        product::Entity::find_by_id(product_id)
            .one(&*self.state.db)
            .await
            .expect("product query")
            .expect("product exists")
            .stock
    }

    pub async fn supplier_balance(&self, supplier_id: Uuid) -> Decimal {
        supplier::Entity::find_by_id(supplier_id)
            .one(&*self.state.db)
            .await
            .expect("supplier query")
            .expect("supplier exists")
            .balance
    }
}

/// Reads a decimal field from a JSON body regardless of whether it was
/// serialized as a string or a number.
pub fn dec(value: &Value, key: &str) -> Decimal {
    serde_json::from_value(value[key].clone())
        .unwrap_or_else(|_| panic!("field {} is not a decimal: {:?}", key, value[key]))
}
