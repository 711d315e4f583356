//! Derived statistics and report view models.
//!
//! These are computed on demand from the owner's normalized records; nothing
//! here is persisted.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::GlucoseReading;

/// Dashboard counters and blood-sugar averages over workouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutStats {
    pub total: usize,
    pub completed: usize,
    /// Workouts planned for the local today
    pub today: usize,
    /// Mean pre-workout blood sugar, nearest integer
    pub avg_before: Option<f64>,
    /// Mean post-workout blood sugar, nearest integer
    pub avg_after: Option<f64>,
}

/// Meter vs CGM comparison over glucose readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GlucoseStats {
    /// All readings, including incomplete pairs
    pub count: usize,
    pub avg_meter: Option<f64>,
    pub avg_cgm: Option<f64>,
    /// Mean signed `meter - cgm` over complete pairs
    pub avg_diff: Option<f64>,
    /// Mean absolute `meter - cgm` over complete pairs
    pub avg_diff_abs: Option<f64>,
    pub latest: Option<GlucoseReading>,
}

/// Exercise completion within one workout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExerciseProgress {
    pub completed: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent
    pub percent: u8,
}

/// Occurrences of one workout name in a report bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

/// Summary of one report window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReportSummary {
    pub total: usize,
    pub completed: usize,
    pub incomplete: usize,
    /// Distinct dates with at least one workout
    pub days_active: usize,
    /// Sorted by count, most frequent first
    pub names: Vec<NameCount>,
}

/// Weekly and monthly report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Report {
    /// Last 7 days including today
    pub weekly: ReportSummary,
    /// Current calendar month
    pub monthly: ReportSummary,
}
