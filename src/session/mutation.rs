// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local mutations applied ahead of store confirmation.

use serde::Serialize;

use crate::models::{GlucoseReading, Workout};

/// Mutation handle returned by `begin`.
pub type MutationId = u64;

/// A user action applied to the locally held lists.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddWorkout(Workout),
    /// Full replacement from the details view
    SaveWorkout(Workout),
    /// Target value, resolved when the toggle began
    SetCompleted { workout_id: String, completed: bool },
    SetExercise {
        workout_id: String,
        index: usize,
        completed: bool,
    },
    DeleteWorkout { workout_id: String },
    AddReading(GlucoseReading),
    DeleteReading { reading_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationState {
    /// Applied locally, store write in flight
    Pending,
    /// Store write succeeded; dropped on the next live push
    Confirmed,
    /// Store write failed; no longer applied
    RolledBack,
}

#[derive(Debug, Clone)]
pub struct PendingMutation {
    pub id: MutationId,
    pub mutation: Mutation,
    pub state: MutationState,
}

impl Mutation {
    /// Apply to the workout list. A mutation naming a missing record is a no-op.
    pub fn apply_to_workouts(&self, workouts: &mut Vec<Workout>) {
        match self {
            Mutation::AddWorkout(workout) => {
                if !workouts.iter().any(|w| w.id == workout.id) {
                    workouts.push(workout.clone());
                }
            }
            Mutation::SaveWorkout(workout) => {
                if let Some(existing) = workouts.iter_mut().find(|w| w.id == workout.id) {
                    *existing = workout.clone();
                }
            }
            Mutation::SetCompleted {
                workout_id,
                completed,
            } => {
                if let Some(w) = workouts.iter_mut().find(|w| &w.id == workout_id) {
                    w.completed = *completed;
                }
            }
            Mutation::SetExercise {
                workout_id,
                index,
                completed,
            } => {
                if let Some(ex) = workouts
                    .iter_mut()
                    .find(|w| &w.id == workout_id)
                    .and_then(|w| w.exercises.get_mut(*index))
                {
                    ex.completed = *completed;
                }
            }
            Mutation::DeleteWorkout { workout_id } => workouts.retain(|w| &w.id != workout_id),
            Mutation::AddReading(_) | Mutation::DeleteReading { .. } => {}
        }
    }

    pub fn apply_to_readings(&self, readings: &mut Vec<GlucoseReading>) {
        match self {
            Mutation::AddReading(reading) => {
                if !readings.iter().any(|r| r.id == reading.id) {
                    readings.push(reading.clone());
                }
            }
            Mutation::DeleteReading { reading_id } => readings.retain(|r| &r.id != reading_id),
            _ => {}
        }
    }

    pub fn touches_workouts(&self) -> bool {
        !matches!(self, Mutation::AddReading(_) | Mutation::DeleteReading { .. })
    }

    pub fn touches_readings(&self) -> bool {
        !self.touches_workouts()
    }
}
