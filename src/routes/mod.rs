// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod glucose;
pub mod live;
pub mod workouts;

use crate::error::{AppError, Result};
use crate::middleware::auth::require_auth;
use crate::time_utils::{parse_ymd, LocalClock};
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new().route("/health", get(health_check));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .merge(workouts::routes())
        .merge(glucose::routes())
        .merge(live::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(CatchPanicLayer::custom(crate::error::handle_panic))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

// ─── Shared Query Parsing ────────────────────────────────────

/// Clock for a request: `tzOffset` (minutes east of UTC) or the configured default.
pub(crate) fn request_clock(state: &AppState, tz_offset: Option<&str>) -> Result<LocalClock> {
    match tz_offset.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<i32>()
            .ok()
            .and_then(LocalClock::from_offset_minutes)
            .ok_or_else(|| {
                AppError::BadRequest(
                    "Invalid 'tzOffset' parameter: must be minutes east of UTC".to_string(),
                )
            }),
        None => Ok(state.config.default_clock()),
    }
}

pub(crate) fn parse_date_param(date: Option<&str>) -> Result<Option<NaiveDate>> {
    date.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| {
            parse_ymd(raw).ok_or_else(|| {
                AppError::BadRequest("Invalid 'date' parameter: must be YYYY-MM-DD".to_string())
            })
        })
        .transpose()
}
