mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

use common::{dec, TestApp};

/// Open with a 500 float, take a 200 cash sale, a 150 card sale and a 50
/// cash expense: expected cash is 650, card 150; counting 640 in the
/// drawer leaves a -10 difference.
#[tokio::test]
async fn cash_cut_reconciles_a_day_of_trading() {
    let app = TestApp::new().await;

    let (status, shift) = app
        .post("/api/v1/shifts/open", json!({"initial_cash": "500"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let shift_id = shift["id"].as_str().unwrap().to_string();
    let date = shift["date"].as_str().unwrap().to_string();

    let service_id = uuid::Uuid::new_v4();
    let (status, _) = app
        .post(
            "/api/v1/sales",
            json!({
                "date": date,
                "items": [{
                    "item_type": "service", "item_id": service_id,
                    "name": "Haircut", "quantity": 1,
                    "price": "200", "subtotal": "200"
                }],
                "payments": [{"amount": "200", "method": "cash"}],
                "subtotal": "200", "total": "200"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post(
            "/api/v1/sales",
            json!({
                "date": date,
                "items": [{
                    "item_type": "service", "item_id": service_id,
                    "name": "Coloring", "quantity": 1,
                    "price": "150", "subtotal": "150"
                }],
                "payments": [{"amount": "150", "method": "card"}],
                "subtotal": "150", "total": "150"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post(
            "/api/v1/expenses",
            json!({
                "date": date,
                "description": "Cleaning supplies",
                "amount": "50",
                "payment_method": "cash"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Live summary before cutting.
    let (status, summary) = app
        .get(&format!("/api/v1/shifts/{}/summary", shift_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&summary["expectedByMethod"], "cash"), dec!(650));
    assert_eq!(dec(&summary["expectedByMethod"], "card"), dec!(150));
    assert_eq!(dec(&summary["salesByMethod"], "cash"), dec!(200));
    assert_eq!(dec(&summary["expensesByMethod"], "cash"), dec!(50));
    assert_eq!(dec(&summary["totals"], "total_sales"), dec!(350));
    assert_eq!(dec(&summary["totals"], "total_expenses"), dec!(50));

    // Cut against the counted drawer.
    let (status, cut) = app
        .post(
            "/api/v1/cash-cuts",
            json!({
                "shift_id": shift_id,
                "real_by_method": {"cash": "640"},
                "final_cash": "640"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&cut, "expected"), dec!(650));
    assert_eq!(dec(&cut, "real_amount"), dec!(640));
    assert_eq!(dec(&cut, "difference"), dec!(-10));
    assert_eq!(dec(&cut["difference_by_method"], "cash"), dec!(-10));
    // Card was not counted; it defaults to expected with zero difference.
    assert_eq!(dec(&cut["real_by_method"], "card"), dec!(150));
    assert_eq!(dec(&cut["difference_by_method"], "card"), dec!(0));
    assert_eq!(dec(&cut, "initial_cash"), dec!(500));

    // The stored snapshot reads back identically.
    let cut_id = cut["id"].as_str().unwrap();
    let (status, stored) = app.get(&format!("/api/v1/cash-cuts/{}", cut_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored, cut);
}

/// Completed appointments are a sales channel: their payments merge into
/// the sales map, and scheduled ones stay out of it.
#[tokio::test]
async fn completed_appointments_merge_into_sales() {
    let app = TestApp::new().await;

    let (_, shift) = app
        .post("/api/v1/shifts/open", json!({"initial_cash": "0"}))
        .await;
    let shift_id = shift["id"].as_str().unwrap().to_string();
    let date = shift["date"].as_str().unwrap().to_string();

    let service_id = uuid::Uuid::new_v4();
    let make_appointment = |name: &str| {
        json!({
            "date": date,
            "start_time": "10:00:00",
            "client_name": name,
            "items": [{
                "item_type": "service", "item_id": service_id,
                "name": "Manicure", "quantity": 1,
                "price": "100", "subtotal": "100"
            }],
            "payments": [{"amount": "100", "method": "cash"}],
            "total": "100"
        })
    };

    let (status, completed) = app
        .post("/api/v1/appointments", make_appointment("Ana"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let completed_id = completed["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post("/api/v1/appointments", make_appointment("Luz"))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .patch(
            &format!("/api/v1/appointments/{}/status", completed_id),
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, summary) = app
        .get(&format!("/api/v1/shifts/{}/summary", shift_id))
        .await;
    // Only the completed appointment counts.
    assert_eq!(dec(&summary["salesByMethod"], "cash"), dec!(100));
    assert_eq!(dec(&summary["totals"], "total_sales"), dec!(100));
    assert_eq!(
        summary["totals"]["completed_appointments"].as_i64().unwrap(),
        1
    );
}

#[tokio::test]
async fn ad_hoc_cut_over_a_quiet_day_is_all_zeros() {
    let app = TestApp::new().await;

    let (status, cut) = app
        .post(
            "/api/v1/cash-cuts",
            json!({"date": "2024-03-01", "real_by_method": {}}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&cut, "expected"), dec!(0));
    assert_eq!(dec(&cut, "real_amount"), dec!(0));
    assert_eq!(dec(&cut, "difference"), dec!(0));
    assert_eq!(dec(&cut, "total_sales"), dec!(0));
    assert_eq!(cut["completed_appointments"].as_i64().unwrap(), 0);
}

#[tokio::test]
async fn cut_against_unknown_shift_is_not_found() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/cash-cuts",
            json!({
                "shift_id": uuid::Uuid::new_v4(),
                "real_by_method": {"cash": "0"}
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// The per-method maps survive the JSON columns without losing cents.
#[tokio::test]
async fn method_maps_round_trip_exact_cents() {
    let app = TestApp::new().await;

    let (_, shift) = app
        .post("/api/v1/shifts/open", json!({"initial_cash": "100.10"}))
        .await;
    let shift_id = shift["id"].as_str().unwrap().to_string();
    let date = shift["date"].as_str().unwrap().to_string();

    let service_id = uuid::Uuid::new_v4();
    app.post(
        "/api/v1/sales",
        json!({
            "date": date,
            "items": [{
                "item_type": "service", "item_id": service_id,
                "name": "Trim", "quantity": 1,
                "price": "33.33", "subtotal": "33.33"
            }],
            "payments": [{"amount": "33.33", "method": "cash"}],
            "subtotal": "33.33", "total": "33.33"
        }),
    )
    .await;

    let (_, cut) = app
        .post(
            "/api/v1/cash-cuts",
            json!({"shift_id": shift_id, "real_by_method": {"cash": "133.43"}}),
        )
        .await;
    assert_eq!(dec(&cut["sales_by_method"], "cash"), dec!(33.33));
    assert_eq!(dec(&cut, "expected"), dec!(133.43));
    assert_eq!(dec(&cut, "difference"), dec!(0));

    let cut_id = cut["id"].as_str().unwrap();
    let (_, stored) = app.get(&format!("/api/v1/cash-cuts/{}", cut_id)).await;
    assert_eq!(dec(&stored["sales_by_method"], "cash"), dec!(33.33));
}
