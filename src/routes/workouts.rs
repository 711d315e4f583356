// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout, stats, report and template routes.

use crate::domain::{
    build_report, exercise_progress, glucose_stats, visible_workouts, workout_stats, ViewFilter,
};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    GlucoseStats, NewWorkout, Report, Workout, WorkoutEdit, WorkoutStats, WorkoutTemplate,
};
use crate::routes::{parse_date_param, request_clock};
use crate::session::WorkoutCard;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workouts", get(list_workouts).post(create_workout))
        .route(
            "/api/workouts/{id}",
            get(get_workout).put(save_workout).delete(delete_workout),
        )
        .route("/api/workouts/{id}/toggle", post(toggle_workout))
        .route(
            "/api/workouts/{id}/exercises/{index}/toggle",
            post(toggle_exercise),
        )
        .route("/api/stats", get(get_stats))
        .route("/api/report", get(get_report))
        .route("/api/templates", get(list_templates))
}

// ─── Workouts ────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutsQuery {
    filter: Option<String>,
    /// YYYY-MM-DD
    date: Option<String>,
    tz_offset: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutListResponse {
    /// Filtered, most recent first
    pub workouts: Vec<WorkoutCard>,
    /// Over all workouts, ignoring the filter
    pub stats: WorkoutStats,
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<WorkoutsQuery>,
) -> Result<Json<WorkoutListResponse>> {
    let filter = match params.filter.as_deref() {
        Some(raw) => raw
            .parse::<ViewFilter>()
            .map_err(|e| AppError::BadRequest(format!("Invalid 'filter' parameter: {}", e)))?,
        None => ViewFilter::All,
    };
    let date = parse_date_param(params.date.as_deref())?;
    let clock = request_clock(&state, params.tz_offset.as_deref())?;
    let today = clock.today();

    tracing::debug!(owner = %user.owner_id, ?filter, ?date, %today, "Listing workouts");

    let all = state.services.workouts.list(&user.owner_id).await?;
    let workouts = visible_workouts(&all, filter, date, today)
        .into_iter()
        .map(card)
        .collect();

    Ok(Json(WorkoutListResponse {
        workouts,
        stats: workout_stats(&all, today),
    }))
}

async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(new): Json<NewWorkout>,
) -> Result<(StatusCode, Json<Workout>)> {
    let workout = state
        .services
        .workouts
        .add_workout(&user.owner_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutCard>> {
    let workout = state.services.workouts.get(&user.owner_id, &id).await?;
    Ok(Json(card(workout)))
}

async fn save_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(edit): Json<WorkoutEdit>,
) -> Result<Json<Workout>> {
    let workout = state
        .services
        .workouts
        .save_workout(&user.owner_id, &id, edit)
        .await?;
    Ok(Json(workout))
}

async fn toggle_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Workout>> {
    let workout = state
        .services
        .workouts
        .toggle_complete(&user.owner_id, &id)
        .await?;
    Ok(Json(workout))
}

async fn toggle_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<WorkoutCard>> {
    let workout = state
        .services
        .workouts
        .toggle_exercise(&user.owner_id, &id, index)
        .await?;
    Ok(Json(card(workout)))
}

#[derive(Deserialize)]
struct DeleteQuery {
    #[serde(default)]
    confirm: bool,
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(params): Query<DeleteQuery>,
) -> Result<StatusCode> {
    state
        .services
        .workouts
        .delete_workout(&user.owner_id, &id, params.confirm)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn card(workout: Workout) -> WorkoutCard {
    WorkoutCard {
        progress: exercise_progress(&workout),
        workout,
    }
}

// ─── Stats & Report ──────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClockQuery {
    tz_offset: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsResponse {
    pub workouts: WorkoutStats,
    pub glucose: GlucoseStats,
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ClockQuery>,
) -> Result<Json<StatsResponse>> {
    let clock = request_clock(&state, params.tz_offset.as_deref())?;
    let (workouts, readings) = tokio::try_join!(
        state.services.workouts.list(&user.owner_id),
        state.services.glucose.list(&user.owner_id),
    )?;

    Ok(Json(StatsResponse {
        workouts: workout_stats(&workouts, clock.today()),
        glucose: glucose_stats(&readings),
    }))
}

async fn get_report(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ClockQuery>,
) -> Result<Json<Report>> {
    let clock = request_clock(&state, params.tz_offset.as_deref())?;
    let workouts = state.services.workouts.list(&user.owner_id).await?;
    Ok(Json(build_report(&workouts, clock.today())))
}

// ─── Templates ───────────────────────────────────────────────

async fn list_templates(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<WorkoutTemplate>>> {
    let templates = state.services.templates.list(&user.owner_id).await?;
    Ok(Json(templates))
}
