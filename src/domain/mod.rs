// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pure domain logic: normalization, aggregation, filtering and reports.
//!
//! Nothing in this module touches storage or the clock directly; callers pass
//! records and the local "today" explicitly.

pub mod aggregate;
pub mod filter;
pub mod normalize;
pub mod report;

pub use aggregate::{exercise_progress, glucose_stats, latest_reading, workout_stats};
pub use filter::{
    filter_workouts, readings_on, sort_most_recent_first, sort_readings_newest_first,
    visible_workouts, ViewFilter,
};
pub use normalize::{normalize_reading, normalize_template, normalize_workout};
pub use report::{build_report, summarize, ReportWindow};
