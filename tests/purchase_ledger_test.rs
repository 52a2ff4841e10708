mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::{dec, TestApp};

async fn create_credit_purchase(
    app: &TestApp,
    supplier_id: uuid::Uuid,
    product_id: uuid::Uuid,
    total: &str,
    first_payment: Option<&str>,
) -> Value {
    let payments = match first_payment {
        Some(amount) => json!([{"amount": amount, "method": "transfer"}]),
        None => json!([]),
    };
    let (status, body) = app
        .post(
            "/api/v1/purchases",
            json!({
                "date": "2024-03-05",
                "supplier_id": supplier_id,
                "lines": [{
                    "product_id": product_id,
                    "quantity": 5,
                    "unit_cost": "40",
                    "subtotal": "200"
                }],
                "payments": payments,
                "payment_type": "credit",
                "total": total,
                "due_date": "2024-04-05"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create purchase: {:?}", body);
    body
}

/// A credit purchase of 1000 with a 400 payment at creation lands as
/// partial: paid 400, balance 600, and the supplier owes 600 more.
#[tokio::test]
async fn partial_payment_at_creation() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme Beauty Supply").await;
    let product_id = app.seed_product("Shampoo", 10).await;

    let created =
        create_credit_purchase(&app, supplier_id, product_id, "1000", Some("400")).await;
    let purchase_id = created["id"].as_str().unwrap().to_string();

    let (status, purchase) = app.get(&format!("/api/v1/purchases/{}", purchase_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&purchase, "paid_amount"), dec!(400));
    assert_eq!(dec(&purchase, "balance"), dec!(600));
    assert_eq!(purchase["status"], "partial");
    assert_eq!(
        dec(&purchase, "paid_amount") + dec(&purchase, "balance"),
        dec(&purchase, "total")
    );

    assert_eq!(app.supplier_balance(supplier_id).await, dec!(600));
    assert_eq!(app.product_stock(product_id).await, 15);
}

/// Settling the remaining 600 flips the purchase to paid and returns the
/// supplier balance to its pre-purchase value.
#[tokio::test]
async fn settling_the_balance() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme Beauty Supply").await;
    let product_id = app.seed_product("Shampoo", 10).await;

    let created =
        create_credit_purchase(&app, supplier_id, product_id, "1000", Some("400")).await;
    let purchase_id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = app
        .post(
            &format!("/api/v1/purchases/{}/payments", purchase_id),
            json!({"amount": "600", "payment_method": "cash"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&updated, "paid_amount"), dec!(1000));
    assert_eq!(dec(&updated, "balance"), dec!(0));
    assert_eq!(updated["status"], "paid");

    assert_eq!(app.supplier_balance(supplier_id).await, dec!(0));

    // A paid purchase takes no further payments.
    let (status, _) = app
        .post(
            &format!("/api/v1/purchases/{}/payments", purchase_id),
            json!({"amount": "1", "payment_method": "cash"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Cancelling an unpaid purchase pulls the stock back out, logs an `out`
/// movement, reverses the supplier's outstanding balance, and blocks
/// further payments.
#[tokio::test]
async fn cancellation_reverses_everything() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme Beauty Supply").await;
    let product_id = app.seed_product("Shampoo", 10).await;

    let created =
        create_credit_purchase(&app, supplier_id, product_id, "1000", Some("400")).await;
    let purchase_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(app.product_stock(product_id).await, 15);

    let (status, cancelled) = app
        .patch(&format!("/api/v1/purchases/{}/cancel", purchase_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    assert_eq!(app.product_stock(product_id).await, 10);
    assert_eq!(app.supplier_balance(supplier_id).await, dec!(0));

    let (_, movements) = app
        .get(&format!(
            "/api/v1/inventory/movements?product_id={}&movement_type=out",
            product_id
        ))
        .await;
    let movements = movements.as_array().unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0]["quantity"].as_i64().unwrap(), -5);
    assert_eq!(movements[0]["reason"], "Purchase reversal");

    // Terminal: no payments, no second cancel.
    let (status, _) = app
        .post(
            &format!("/api/v1/purchases/{}/payments", purchase_id),
            json!({"amount": "100", "payment_method": "cash"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .patch(&format!("/api/v1/purchases/{}/cancel", purchase_id), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Deleting applies the same reversal as cancelling, then removes the
/// rows; deleting an already-cancelled purchase must not reverse twice.
#[tokio::test]
async fn delete_reverses_once() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme Beauty Supply").await;
    let product_id = app.seed_product("Shampoo", 10).await;

    // Delete an active purchase: stock and supplier revert.
    let created =
        create_credit_purchase(&app, supplier_id, product_id, "1000", None).await;
    let purchase_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(app.product_stock(product_id).await, 15);
    assert_eq!(app.supplier_balance(supplier_id).await, dec!(1000));

    let (status, _) = app
        .delete(&format!("/api/v1/purchases/{}", purchase_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.product_stock(product_id).await, 10);
    assert_eq!(app.supplier_balance(supplier_id).await, dec!(0));

    let (status, _) = app.get(&format!("/api/v1/purchases/{}", purchase_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Cancel then delete: the reversal ran at cancel time only.
    let created =
        create_credit_purchase(&app, supplier_id, product_id, "500", None).await;
    let purchase_id = created["id"].as_str().unwrap().to_string();
    app.patch(&format!("/api/v1/purchases/{}/cancel", purchase_id), None)
        .await;
    assert_eq!(app.product_stock(product_id).await, 10);

    let (status, _) = app
        .delete(&format!("/api/v1/purchases/{}", purchase_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.product_stock(product_id).await, 10);
    assert_eq!(app.supplier_balance(supplier_id).await, dec!(0));
}

/// Over-payment floors the balance at zero; the supplier balance comes
/// down by the purchase's remaining balance, not the raw amount.
#[tokio::test]
async fn over_payment_floors_at_zero() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme Beauty Supply").await;
    let product_id = app.seed_product("Shampoo", 10).await;

    let created = create_credit_purchase(&app, supplier_id, product_id, "500", None).await;
    let purchase_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(app.supplier_balance(supplier_id).await, dec!(500));

    let (status, updated) = app
        .post(
            &format!("/api/v1/purchases/{}/payments", purchase_id),
            json!({"amount": "600", "payment_method": "cash"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&updated, "paid_amount"), dec!(600));
    assert_eq!(dec(&updated, "balance"), dec!(0));
    assert_eq!(updated["status"], "paid");
    assert_eq!(app.supplier_balance(supplier_id).await, dec!(0));
}

/// A cash purchase is settled on the spot and rejects later payments.
#[tokio::test]
async fn cash_purchases_are_settled_immediately() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Conditioner", 0).await;

    let (status, created) = app
        .post(
            "/api/v1/purchases",
            json!({
                "date": "2024-03-05",
                "lines": [{
                    "product_id": product_id,
                    "quantity": 3,
                    "unit_cost": "50",
                    "subtotal": "150"
                }],
                "payments": [{"amount": "150", "method": "cash"}],
                "payment_type": "cash",
                "total": "150"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "paid");

    let purchase_id = created["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .post(
            &format!("/api/v1/purchases/{}/payments", purchase_id),
            json!({"amount": "10", "payment_method": "cash"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Purchases without a single line are rejected.
#[tokio::test]
async fn empty_purchases_are_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/purchases",
            json!({
                "date": "2024-03-05",
                "lines": [],
                "payment_type": "cash",
                "total": "0"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// The supplier statement and pending listing follow the ledger, and the
/// reconciliation op confirms the incremental balance matches history.
#[tokio::test]
async fn supplier_statement_and_reconciliation() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme Beauty Supply").await;
    let product_id = app.seed_product("Shampoo", 0).await;

    create_credit_purchase(&app, supplier_id, product_id, "1000", Some("400")).await;
    create_credit_purchase(&app, supplier_id, product_id, "200", None).await;

    let (status, statement) = app
        .get(&format!("/api/v1/suppliers/{}/statement", supplier_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&statement, "total_purchased"), dec!(1200));
    assert_eq!(dec(&statement, "total_paid"), dec!(400));
    assert_eq!(dec(&statement, "total_balance"), dec!(800));
    assert_eq!(statement["purchases"].as_array().unwrap().len(), 2);

    let (status, pending) = app
        .get(&format!("/api/v1/suppliers/{}/pending", supplier_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 2);

    let (status, reconciliation) = app
        .request(
            axum::http::Method::POST,
            &format!("/api/v1/suppliers/{}/reconcile", supplier_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&reconciliation, "recorded"), dec!(800));
    assert_eq!(dec(&reconciliation, "computed"), dec!(800));
    assert_eq!(dec(&reconciliation, "drift"), dec!(0));

    // A supplier with pending purchases cannot be deactivated.
    let (status, _) = app
        .delete(&format!("/api/v1/suppliers/{}", supplier_id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
