// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-sent dashboard feed tests.

use axum::body::BodyDataStream;
use axum::http::{header, StatusCode};
use futures_util::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

mod common;
use common::{authed, create_test_app};

/// Read SSE frames until `n` `dashboard` events have arrived.
async fn next_dashboards(stream: &mut BodyDataStream, n: usize) -> Vec<Value> {
    let mut buffer = String::new();
    let mut events = Vec::new();

    while events.len() < n {
        let chunk = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .unwrap();
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());

        while let Some(end) = buffer.find("\n\n") {
            let frame: String = buffer.drain(..end + 2).collect();
            if !frame.contains("event: dashboard") {
                continue;
            }
            let data = frame
                .lines()
                .find_map(|line| line.strip_prefix("data: "))
                .unwrap();
            events.push(serde_json::from_str(data).unwrap());
        }
    }
    events
}

#[tokio::test]
async fn test_live_feed_pushes_dashboard_on_write() {
    // The state owns the store's live hub; keep it alive for the whole test.
    let (app, _state, _store) = create_test_app();

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/live?view=glucose", "owner-1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let mut stream = response.into_body().into_data_stream();

    // Initial push for workouts and for readings
    let initial = next_dashboards(&mut stream, 2).await;
    assert_eq!(initial[1]["signedIn"], true);
    assert_eq!(initial[1]["view"], "glucose");
    assert_eq!(initial[1]["glucose"]["stats"]["count"], 0);

    let response = app
        .oneshot(authed(
            "POST",
            "/api/glucose",
            "owner-1",
            Some(json!({ "meter": 120, "cgm": 110 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let update = next_dashboards(&mut stream, 1).await;
    assert_eq!(update[0]["glucose"]["stats"]["count"], 1);
    assert_eq!(update[0]["glucose"]["stats"]["avgDiff"], 10.0);
}

#[tokio::test]
async fn test_live_feed_ignores_other_owners() {
    let (app, _state, _store) = create_test_app();

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/live", "owner-1", None))
        .await
        .unwrap();
    let mut stream = response.into_body().into_data_stream();
    next_dashboards(&mut stream, 2).await;

    let response = app
        .oneshot(authed(
            "POST",
            "/api/glucose",
            "owner-2",
            Some(json!({ "meter": 120, "cgm": 110 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The stream stays open but carries no frame for another owner's write.
    let waited = tokio::time::timeout(Duration::from_millis(200), stream.next()).await;
    assert!(waited.is_err(), "no event expected for another owner's write");
}

#[tokio::test]
async fn test_reconnect_sees_writes_made_while_disconnected() {
    let (app, _state, _store) = create_test_app();

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/live?view=glucose", "owner-1", None))
        .await
        .unwrap();
    let mut stream = response.into_body().into_data_stream();
    next_dashboards(&mut stream, 2).await;
    drop(stream);
    tokio::time::sleep(Duration::from_millis(20)).await;

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
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(authed("GET", "/api/live?view=glucose", "owner-1", None))
        .await
        .unwrap();
    let mut stream = response.into_body().into_data_stream();
    let initial = next_dashboards(&mut stream, 2).await;
    assert_eq!(initial[1]["glucose"]["stats"]["count"], 1);
}

#[tokio::test]
async fn test_dropping_connection_releases_feed() {
    let (app, state, _) = create_test_app();

    let response = app
        .oneshot(authed("GET", "/api/live", "owner-1", None))
        .await
        .unwrap();
    let mut stream = response.into_body().into_data_stream();
    next_dashboards(&mut stream, 2).await;
    drop(stream);
    tokio::time::sleep(Duration::from_millis(20)).await;

    // A write after disconnect neither fails nor reaches anyone.
    state
        .services
        .glucose
        .add_reading(
            "owner-1",
            workout_tracker::models::NewReading {
                meter: Some(100.0),
                cgm: Some(90.0),
                recorded_at: None,
            },
            chrono::Utc::now(),
        )
        .await
        .unwrap();
}
