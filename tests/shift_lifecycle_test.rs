mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn open_and_close_shift() {
    let app = TestApp::new().await;

    let (status, shift) = app
        .post("/api/v1/shifts/open", json!({"initial_cash": "500"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(shift["status"], "open");
    let shift_id = shift["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            &format!("/api/v1/shifts/{}/close", shift_id),
            json!({"final_cash": "640"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shift"]["status"], "closed");
    assert!(body["shift"]["end_time"].is_string());
}

#[tokio::test]
async fn second_open_on_same_branch_conflicts() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post("/api/v1/shifts/open", json!({"initial_cash": "100"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post("/api/v1/shifts/open", json!({"initial_cash": "200"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("already open"));
}

#[tokio::test]
async fn concurrent_opens_admit_exactly_one() {
    let app = TestApp::new().await;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let router = app.router.clone();
        let token = app.token.clone();
        tasks.push(tokio::spawn(async move {
            use axum::{body::Body, http::Request};
            use tower::ServiceExt;

            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/v1/shifts/open")
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(json!({"initial_cash": "100"}).to_string()))
                .unwrap();
            let response = router.oneshot(request).await.unwrap();
            response.status() == StatusCode::CREATED
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "exactly one open should win");

    // And the branch ends up with a single open shift.
    let (status, open) = app.get("/api/v1/shifts/open").await;
    assert_eq!(status, StatusCode::OK);
    assert!(open.is_object());
}

#[tokio::test]
async fn closing_twice_conflicts() {
    let app = TestApp::new().await;

    let (_, shift) = app
        .post("/api/v1/shifts/open", json!({"initial_cash": "100"}))
        .await;
    let shift_id = shift["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            &format!("/api/v1/shifts/{}/close", shift_id),
            json!({"final_cash": "100"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            &format!("/api/v1/shifts/{}/close", shift_id),
            json!({"final_cash": "100"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("already closed"));
}

#[tokio::test]
async fn closing_from_another_branch_is_not_found() {
    let app = TestApp::new().await;

    let (_, shift) = app
        .post("/api/v1/shifts/open", json!({"initial_cash": "100"}))
        .await;
    let shift_id = shift["id"].as_str().unwrap().to_string();

    let other_branch_token = app.token_for_branch(Uuid::new_v4());
    let (status, _) = app
        .request_with_token(
            Method::POST,
            &format!("/api/v1/shifts/{}/close", shift_id),
            Some(json!({"final_cash": "100"})),
            Some(&other_branch_token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_open_shift_is_idempotent_and_null_when_none() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/shifts/open").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());

    app.post("/api/v1/shifts/open", json!({"initial_cash": "250"}))
        .await;

    let (_, first) = app.get("/api/v1/shifts/open").await;
    let (_, second) = app.get("/api/v1/shifts/open").await;
    assert_eq!(first, second);
    assert_eq!(first["status"], "open");
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_with_token(Method::GET, "/api/v1/shifts", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request_with_token(
            Method::POST,
            "/api/v1/shifts/open",
            Some(json!({"initial_cash": "1"})),
            Some("not-a-valid-token"),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn negative_float_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post("/api/v1/shifts/open", json!({"initial_cash": "-5"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
