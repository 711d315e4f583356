// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error responses: store failures, panics and not-found handling.

use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
use serde_json::json;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use workout_tracker::error::handle_panic;

mod common;
use common::{authed, body_json, create_offline_app, create_test_app};

#[tokio::test]
async fn test_offline_store_returns_database_error() {
    let (app, _) = create_offline_app();

    let response = app
        .oneshot(authed("GET", "/api/workouts", "owner-1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "database_error");
    // Backend details stay in the logs
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_failed_write_is_reported_and_not_applied() {
    let (app, _, store) = create_test_app();
    store.set_unavailable(true);

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/glucose",
            "owner-1",
            Some(json!({ "meter": 120, "cgm": 110 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    store.set_unavailable(false);
    let response = app
        .oneshot(authed("GET", "/api/glucose", "owner-1", None))
        .await
        .unwrap();
    assert!(body_json(response).await["readings"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_unknown_workout_is_not_found() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(authed("POST", "/api/workouts/missing/toggle", "owner-1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn test_panic_returns_reload_message() {
    async fn boom() -> &'static str {
        panic!("render failed")
    }

    let app = Router::new()
        .route("/boom", get(boom))
        .layer(CatchPanicLayer::custom(handle_panic));

    let response = app
        .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "internal_error");
    assert!(body["details"].as_str().unwrap().contains("reload"));
}
