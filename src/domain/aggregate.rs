// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard statistics over normalized records.

use chrono::NaiveDate;

use crate::models::{ExerciseProgress, GlucoseReading, GlucoseStats, Workout, WorkoutStats};

/// Arithmetic mean of the finite values; `None` for an empty set.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Round half up to `digits` decimal places (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale + 0.5).floor() / scale
}

/// Workout counters for the dashboard header.
pub fn workout_stats(workouts: &[Workout], today: NaiveDate) -> WorkoutStats {
    WorkoutStats {
        total: workouts.len(),
        completed: workouts.iter().filter(|w| w.completed).count(),
        today: workouts.iter().filter(|w| w.date == Some(today)).count(),
        avg_before: mean(workouts.iter().filter_map(|w| w.blood_sugar.before))
            .map(|v| round_half_up(v, 0)),
        avg_after: mean(workouts.iter().filter_map(|w| w.blood_sugar.after))
            .map(|v| round_half_up(v, 0)),
    }
}

/// Meter vs CGM averages.
///
/// Only readings with both values feed the averages and `latest`; a reading
/// with one value still counts in `count`.
pub fn glucose_stats(readings: &[GlucoseReading]) -> GlucoseStats {
    let complete: Vec<GlucoseReading> = readings
        .iter()
        .filter(|r| r.pair().is_some())
        .cloned()
        .collect();
    let pairs: Vec<(f64, f64)> = complete.iter().filter_map(GlucoseReading::pair).collect();
    let one_decimal = |v: f64| round_half_up(v, 1);

    GlucoseStats {
        count: readings.len(),
        avg_meter: mean(pairs.iter().map(|(meter, _)| *meter)).map(one_decimal),
        avg_cgm: mean(pairs.iter().map(|(_, cgm)| *cgm)).map(one_decimal),
        avg_diff: mean(pairs.iter().map(|(meter, cgm)| meter - cgm)).map(one_decimal),
        avg_diff_abs: mean(pairs.iter().map(|(meter, cgm)| (meter - cgm).abs())).map(one_decimal),
        latest: latest_reading(&complete).cloned(),
    }
}

/// Most recently recorded reading; the first one wins on ties.
pub fn latest_reading(readings: &[GlucoseReading]) -> Option<&GlucoseReading> {
    readings
        .iter()
        .filter(|r| r.recorded_at.is_some())
        .fold(None, |best: Option<&GlucoseReading>, r| match best {
            Some(b) if b.recorded_at >= r.recorded_at => Some(b),
            _ => Some(r),
        })
}

/// Completed/total exercises and the rounded percentage.
pub fn exercise_progress(workout: &Workout) -> ExerciseProgress {
    let total = workout.exercises.len();
    let completed = workout.exercises.iter().filter(|ex| ex.completed).count();
    let percent = if total == 0 {
        0
    } else {
        round_half_up(completed as f64 * 100.0 / total as f64, 0) as u8
    };
    ExerciseProgress {
        completed,
        total,
        percent,
    }
}
