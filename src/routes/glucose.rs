// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Glucose reading routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{GlucoseReading, GlucoseStats, NewReading};
use crate::routes::{parse_date_param, request_clock};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/glucose", get(list_readings).post(create_reading))
        .route("/api/glucose/{id}", delete(delete_reading))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadingsQuery {
    /// Local calendar day, YYYY-MM-DD
    date: Option<String>,
    tz_offset: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReadingsResponse {
    /// Newest first; limited to `date` when given
    pub readings: Vec<GlucoseReading>,
    /// Over all readings
    pub stats: GlucoseStats,
}

async fn list_readings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ReadingsQuery>,
) -> Result<Json<ReadingsResponse>> {
    let date = parse_date_param(params.date.as_deref())?;
    let clock = request_clock(&state, params.tz_offset.as_deref())?;

    let (readings, stats) = state
        .services
        .glucose
        .list_on(&user.owner_id, date, &clock)
        .await?;

    Ok(Json(ReadingsResponse { readings, stats }))
}

async fn create_reading(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(reading): Json<NewReading>,
) -> Result<(StatusCode, Json<GlucoseReading>)> {
    let stored = state
        .services
        .glucose
        .add_reading(&user.owner_id, reading, chrono::Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn delete_reading(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state
        .services
        .glucose
        .delete_reading(&user.owner_id, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
