// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use workout_tracker::config::Config;
use workout_tracker::db::{FirestoreStore, MemoryStore, RecordStore};
use workout_tracker::middleware::create_jwt;
use workout_tracker::routes::create_router;
use workout_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test store connection against the emulator.
#[allow(dead_code)]
pub async fn test_store() -> FirestoreStore {
    FirestoreStore::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by a fresh in-memory store.
/// Returns the router, the shared state and the store handle.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, MemoryStore) {
    let memory = MemoryStore::new();
    let store: Arc<dyn RecordStore> = Arc::new(memory.clone());
    let state = Arc::new(AppState::new(Config::test_default(), store));
    (create_router(state.clone()), state, memory)
}

/// Create a test app whose store is permanently offline.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    let store: Arc<dyn RecordStore> = Arc::new(FirestoreStore::new_mock());
    let state = Arc::new(AppState::new(Config::test_default(), store));
    (create_router(state.clone()), state)
}

/// Session token for `owner` signed with the test key.
#[allow(dead_code)]
pub fn test_token(owner: &str) -> String {
    create_jwt(owner, &Config::test_default().jwt_signing_key).unwrap()
}

/// Authenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn authed(method: &str, uri: &str, owner: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", test_token(owner)));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
