use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use optimizer_service::{
    api::{handler::schedule, state::OptimizerAppState},
    domain::{engine::ShiftEngine, settings::EngineSettings},
};

fn build_test_app() -> Router {
    let engine = Arc::new(ShiftEngine::new(EngineSettings::default()));
    let state = Arc::new(OptimizerAppState { engine });

    Router::new()
        .route(
            "/headpat",
            get(|| async {
                axum::Json(shared::responses::HeadpatResponse {
                    message: "nyaa~! optimizer standing by, senpai! (=^-w-^=)",
                })
            }),
        )
        .route("/api/v1/shifts/generate", post(schedule::generate_shifts))
        .route("/api/v1/shifts/precheck", post(schedule::precheck_shifts))
        .with_state(state)
}

fn solve_body() -> Value {
    json!({
        "staff_list": [
            {
                "id": "s1",
                "name": "Aoi",
                "role": "staff",
                "salary_type": "hourly",
                "hourly_wage": 1200,
                "evaluation": "B",
                "max_hours_day": 8,
                "max_days_week": 5
            }
        ],
        "config": {
            "custom_shifts": [
                {"name": "day", "start": "09:00", "end": "17:00"}
            ],
            "opening_time": "09:00",
            "closing_time": "17:00",
            "staff_req": {"min_weekday": 1, "min_manager": 0}
        },
        "dates": ["2025-01-06"],
        "requests": [],
        "mode": "auto"
    })
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn headpat_responds() {
    let app = build_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/headpat")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn generate_returns_a_schedule() {
    let app = build_test_app();

    let (status, body) = post_json(app, "/api/v1/shifts/generate", solve_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let data = &body["data"];
    assert_eq!(data["status"], json!("success"));
    assert_eq!(data["mode"], json!("math_tier3"));
    let shifts = data["shifts"].as_array().unwrap();
    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0]["staff_id"], json!("s1"));
    assert_eq!(shifts[0]["start_time"], json!("09:00"));
    assert_eq!(shifts[0]["end_time"], json!("17:00"));
}

#[tokio::test]
async fn generate_rejects_overnight_patterns() {
    let app = build_test_app();
    let mut body = solve_body();
    body["config"]["custom_shifts"] = json!([
        {"name": "overnight", "start": "22:00", "end": "06:00"}
    ]);

    let (status, body) = post_json(app, "/api/v1/shifts/generate", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["kind"], json!("invalid_input"));
}

#[tokio::test]
async fn generate_rejects_malformed_payloads() {
    let app = build_test_app();
    let mut body = solve_body();
    body["staff_list"][0]["evaluation"] = json!("Z");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/shifts/generate")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn precheck_reports_shortage_for_empty_roster() {
    let app = build_test_app();
    let mut body = solve_body();
    body["staff_list"] = json!([]);

    let (status, body) = post_json(app, "/api/v1/shifts/precheck", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let data = &body["data"];
    assert_eq!(data["feasible"], json!(false));
    assert!(
        data["summary"]["total_shortage_person_hours"]
            .as_f64()
            .unwrap()
            > 0.0
    );
}
