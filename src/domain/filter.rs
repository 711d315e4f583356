// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! List filters and deterministic ordering.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{GlucoseReading, Workout};
use crate::time_utils::LocalClock;

/// Which workouts the list view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ViewFilter {
    #[default]
    All,
    Today,
    Completed,
}

impl FromStr for ViewFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown filter '{}'", other)),
        }
    }
}

fn matches_date(workout: &Workout, date_filter: Option<NaiveDate>) -> bool {
    match date_filter {
        Some(date) => workout.date == Some(date),
        None => true,
    }
}

/// Apply a list filter. The date filter is ignored for [`ViewFilter::Today`].
pub fn filter_workouts(
    workouts: &[Workout],
    filter: ViewFilter,
    date_filter: Option<NaiveDate>,
    today: NaiveDate,
) -> Vec<Workout> {
    workouts
        .iter()
        .filter(|w| match filter {
            ViewFilter::All => matches_date(w, date_filter),
            ViewFilter::Today => w.date == Some(today),
            ViewFilter::Completed => w.completed && matches_date(w, date_filter),
        })
        .cloned()
        .collect()
}

/// Most recent date first. Stable, so equal dates keep their input order;
/// undated workouts go last.
pub fn sort_most_recent_first(workouts: &mut [Workout]) {
    workouts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Filter then sort: the list exactly as the view renders it.
pub fn visible_workouts(
    workouts: &[Workout],
    filter: ViewFilter,
    date_filter: Option<NaiveDate>,
    today: NaiveDate,
) -> Vec<Workout> {
    let mut visible = filter_workouts(workouts, filter, date_filter, today);
    sort_most_recent_first(&mut visible);
    visible
}

/// Readings recorded on `day` in the clock's local offset.
pub fn readings_on(
    readings: &[GlucoseReading],
    day: NaiveDate,
    clock: &LocalClock,
) -> Vec<GlucoseReading> {
    readings
        .iter()
        .filter(|r| r.recorded_at.map(|ts| clock.local_date(ts)) == Some(day))
        .cloned()
        .collect()
}

/// Newest reading first (stable, unrecorded readings last).
pub fn sort_readings_newest_first(readings: &mut [GlucoseReading]) {
    readings.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
}
