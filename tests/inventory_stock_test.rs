mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

/// After any mix of purchases, sales, manual movements and adjustments,
/// the product's stock equals the starting stock plus the signed sum of
/// its movement trail.
#[tokio::test]
async fn stock_equals_signed_movement_sum() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Hair spray", 10).await;

    // Purchase intake +5.
    let (status, _) = app
        .post(
            "/api/v1/purchases",
            json!({
                "date": "2024-03-05",
                "lines": [{
                    "product_id": product_id, "quantity": 5,
                    "unit_cost": "30", "subtotal": "150"
                }],
                "payments": [{"amount": "150", "method": "cash"}],
                "payment_type": "cash",
                "total": "150"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Sale of 2.
    let (status, _) = app
        .post(
            "/api/v1/sales",
            json!({
                "items": [{
                    "item_type": "product", "item_id": product_id,
                    "name": "Hair spray", "quantity": 2,
                    "price": "60", "subtotal": "120"
                }],
                "payments": [{"amount": "120", "method": "cash"}],
                "subtotal": "120", "total": "120"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Manual in +3, manual out -1.
    let (status, _) = app
        .post(
            "/api/v1/inventory/in",
            json!({"product_id": product_id, "quantity": 3}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post(
            "/api/v1/inventory/out",
            json!({"product_id": product_id, "quantity": 1}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Counted adjustment down to 12.
    let (status, body) = app
        .post(
            "/api/v1/inventory/adjustment",
            json!({"product_id": product_id, "new_stock": 12}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["difference"].as_i64().unwrap(), -3);

    assert_eq!(app.product_stock(product_id).await, 12);

    let (_, movements) = app
        .get(&format!(
            "/api/v1/inventory/movements?product_id={}",
            product_id
        ))
        .await;
    let signed_sum: i64 = movements
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["quantity"].as_i64().unwrap())
        .sum();
    assert_eq!(10 + signed_sum, 12);
}

/// Deleting a sale restocks its product items through reversal movements.
#[tokio::test]
async fn sale_deletion_restocks() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Gel", 8).await;

    let (_, created) = app
        .post(
            "/api/v1/sales",
            json!({
                "items": [{
                    "item_type": "product", "item_id": product_id,
                    "name": "Gel", "quantity": 3,
                    "price": "45", "subtotal": "135"
                }],
                "payments": [{"amount": "135", "method": "cash"}],
                "subtotal": "135", "total": "135"
            }),
        )
        .await;
    let sale_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(app.product_stock(product_id).await, 5);

    let (status, _) = app.delete(&format!("/api/v1/sales/{}", sale_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.product_stock(product_id).await, 8);

    let (_, movements) = app
        .get(&format!(
            "/api/v1/inventory/movements?product_id={}",
            product_id
        ))
        .await;
    let reasons: Vec<&str> = movements
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["reason"].as_str().unwrap())
        .collect();
    assert!(reasons.contains(&"Sale"));
    assert!(reasons.contains(&"Sale reversal"));
}

/// Purchase cost follows the latest intake line.
#[tokio::test]
async fn product_cost_follows_last_purchase() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Wax", 0).await;

    for cost in ["25", "28"] {
        let (status, _) = app
            .post(
                "/api/v1/purchases",
                json!({
                    "date": "2024-03-05",
                    "lines": [{
                        "product_id": product_id, "quantity": 1,
                        "unit_cost": cost, "subtotal": cost
                    }],
                    "payments": [],
                    "payment_type": "cash",
                    "total": cost
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, products) = app.get("/api/v1/inventory/stock").await;
    let product = products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"].as_str() == Some(&product_id.to_string()))
        .unwrap();
    assert_eq!(common::dec(product, "cost"), rust_decimal_macros::dec!(28));
}

/// Movements against an unknown product roll the whole operation back.
#[tokio::test]
async fn unknown_product_is_not_found() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/inventory/in",
            json!({"product_id": uuid::Uuid::new_v4(), "quantity": 5}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A purchase with one bad line leaves no partial state behind.
    let good = app.seed_product("Good", 0).await;
    let (status, _) = app
        .post(
            "/api/v1/purchases",
            json!({
                "date": "2024-03-05",
                "lines": [
                    {"product_id": good, "quantity": 2, "unit_cost": "10", "subtotal": "20"},
                    {"product_id": uuid::Uuid::new_v4(), "quantity": 1, "unit_cost": "10", "subtotal": "10"}
                ],
                "payments": [],
                "payment_type": "cash",
                "total": "30"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.product_stock(good).await, 0);

    let (_, movements) = app
        .get(&format!("/api/v1/inventory/movements?product_id={}", good))
        .await;
    assert!(movements.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn inventory_value_totals_cost_times_stock() {
    let app = TestApp::new().await;
    let a = app.seed_product("A", 0).await;
    let b = app.seed_product("B", 0).await;

    for (product, quantity, cost, subtotal) in
        [(a, 4, "12.50", "50"), (b, 2, "30", "60")]
    {
        app.post(
            "/api/v1/purchases",
            json!({
                "date": "2024-03-05",
                "lines": [{
                    "product_id": product, "quantity": quantity,
                    "unit_cost": cost, "subtotal": subtotal
                }],
                "payments": [],
                "payment_type": "cash",
                "total": subtotal
            }),
        )
        .await;
    }

    let (status, value) = app.get("/api/v1/inventory/value").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["total_units"].as_i64().unwrap(), 6);
    assert_eq!(common::dec(&value, "total_value"), rust_decimal_macros::dec!(110));
}
