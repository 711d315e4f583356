// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View identifiers and the dashboard view model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::domain::ViewFilter;
use crate::models::{ExerciseProgress, GlucoseReading, GlucoseStats, Report, Workout, WorkoutStats};

/// Active screen. Routing lives outside the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum View {
    #[default]
    List,
    Details,
    Help,
    Report,
    Glucose,
}

/// Request for the host to show a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationRequest {
    pub view: View,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_id: Option<String>,
}

/// Token proving the user confirmed a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub workout_id: String,
    /// Shown in the confirmation prompt
    pub workout_name: String,
    pub(crate) generation: u64,
}

/// One row of the workout list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutCard {
    #[serde(flatten)]
    pub workout: Workout,
    pub progress: ExerciseProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GlucosePanel {
    pub stats: GlucoseStats,
    /// Readings of the selected (or current) day, newest first
    pub readings: Vec<GlucoseReading>,
    pub day: NaiveDate,
}

/// Everything the active view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Dashboard {
    pub signed_in: bool,
    pub view: View,
    pub filter: ViewFilter,
    pub date_filter: Option<NaiveDate>,
    pub today: NaiveDate,
    pub stats: WorkoutStats,
    pub workouts: Vec<WorkoutCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<WorkoutCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glucose: Option<GlucosePanel>,
    /// Local changes still waiting on the store
    pub pending: usize,
}
