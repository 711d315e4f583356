// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod glucose;
pub mod record;
pub mod stats;
pub mod template;
pub mod workout;

pub use glucose::{GlucoseReading, NewReading, ReadingDocument};
pub use record::{Fields, StoredRecord};
pub use stats::{ExerciseProgress, GlucoseStats, NameCount, Report, ReportSummary, WorkoutStats};
pub use template::{builtin_templates, TemplateExercise, WorkoutTemplate};
pub use workout::{BloodSugar, Exercise, ExerciseEdit, NewExercise, NewWorkout, Workout, WorkoutEdit};
