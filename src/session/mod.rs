// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-owner view state.
//!
//! A [`TrackerSession`] holds what one signed-in user is looking at: the
//! latest pushed record lists, local mutations layered on top of them, and the
//! active view. Live pushes are authoritative. Every push replaces the base
//! lists, drops settled mutations and re-applies the ones still pending.

pub mod feed;
pub mod mutation;
pub mod view;

use chrono::NaiveDate;

use crate::domain::{
    build_report, exercise_progress, glucose_stats, normalize_reading, normalize_workout,
    readings_on, sort_readings_newest_first, visible_workouts, workout_stats, ViewFilter,
};
use crate::models::{GlucoseReading, StoredRecord, Workout};
use crate::time_utils::LocalClock;

pub use feed::{switch_owner, FeedEvent, FeedPayload, LiveFeed};
pub use mutation::{Mutation, MutationId, MutationState, PendingMutation};
pub use view::{DeleteConfirmation, Dashboard, GlucosePanel, NavigationRequest, View, WorkoutCard};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No user is signed in")]
    SignedOut,

    #[error("Unknown mutation {0}")]
    UnknownMutation(MutationId),

    #[error("Mutation {0} is already settled")]
    AlreadySettled(MutationId),

    #[error("Workout not found: {0}")]
    WorkoutNotFound(String),

    /// The confirmation was issued before the owner changed.
    #[error("Delete confirmation is no longer valid")]
    StaleConfirmation,
}

#[derive(Debug, Default)]
pub struct TrackerSession {
    owner: Option<String>,
    /// Bumped on every owner change; feeds tag their pushes with it
    generation: u64,
    base_workouts: Vec<Workout>,
    base_readings: Vec<GlucoseReading>,
    workouts: Vec<Workout>,
    readings: Vec<GlucoseReading>,
    mutations: Vec<PendingMutation>,
    next_mutation: MutationId,
    view: View,
    selected: Option<String>,
    filter: ViewFilter,
    date_filter: Option<NaiveDate>,
}

impl TrackerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switch identity. Any change clears all held records and mutations and
    /// returns the new generation; live feeds for the old owner must be
    /// torn down by the caller.
    pub fn set_owner(&mut self, owner: Option<String>) -> u64 {
        if owner == self.owner {
            return self.generation;
        }

        tracing::info!(
            previous = self.owner.as_deref().unwrap_or("-"),
            owner = owner.as_deref().unwrap_or("-"),
            "Session owner changed"
        );

        self.owner = owner;
        self.generation += 1;
        self.base_workouts.clear();
        self.base_readings.clear();
        self.workouts.clear();
        self.readings.clear();
        self.mutations.clear();
        self.selected = None;
        self.view = View::List;
        self.generation
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn readings(&self) -> &[GlucoseReading] {
        &self.readings
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn selected(&self) -> Option<&Workout> {
        let id = self.selected.as_deref()?;
        self.workouts.iter().find(|w| w.id == id)
    }

    pub fn set_filter(&mut self, filter: ViewFilter) {
        self.filter = filter;
    }

    pub fn set_date_filter(&mut self, date: Option<NaiveDate>) {
        self.date_filter = date;
    }

    // ─── Live Pushes ─────────────────────────────────────────────

    /// Replace the workout list from a live push. Returns `false` if the push
    /// belongs to an earlier owner and was ignored.
    pub fn apply_workouts_push(&mut self, generation: u64, records: &[StoredRecord]) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.base_workouts = records.iter().map(normalize_workout).collect();
        self.settle(Mutation::touches_workouts);
        self.rebuild();
        true
    }

    pub fn apply_readings_push(&mut self, generation: u64, records: &[StoredRecord]) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.base_readings = records.iter().map(normalize_reading).collect();
        self.settle(Mutation::touches_readings);
        self.rebuild();
        true
    }

    fn accepts(&self, generation: u64) -> bool {
        if generation != self.generation || self.owner.is_none() {
            tracing::debug!(
                generation,
                current = self.generation,
                "Ignoring stale live push"
            );
            return false;
        }
        true
    }

    /// Drop settled mutations of the kind a push just replaced.
    fn settle(&mut self, replaced: fn(&Mutation) -> bool) {
        self.mutations
            .retain(|m| m.state == MutationState::Pending || !replaced(&m.mutation));
    }

    fn rebuild(&mut self) {
        let mut workouts = self.base_workouts.clone();
        let mut readings = self.base_readings.clone();
        for m in &self.mutations {
            if m.state != MutationState::RolledBack {
                m.mutation.apply_to_workouts(&mut workouts);
                m.mutation.apply_to_readings(&mut readings);
            }
        }
        self.workouts = workouts;
        self.readings = readings;
    }

    // ─── Mutations ───────────────────────────────────────────────

    /// Apply a mutation locally and track it as pending.
    pub fn begin(&mut self, mutation: Mutation) -> Result<MutationId, SessionError> {
        if self.owner.is_none() {
            return Err(SessionError::SignedOut);
        }

        self.next_mutation += 1;
        let id = self.next_mutation;
        mutation.apply_to_workouts(&mut self.workouts);
        mutation.apply_to_readings(&mut self.readings);
        self.mutations.push(PendingMutation {
            id,
            mutation,
            state: MutationState::Pending,
        });
        Ok(id)
    }

    /// Begin flipping a workout's completed flag from its currently shown value.
    pub fn toggle_complete(&mut self, workout_id: &str) -> Result<MutationId, SessionError> {
        let completed = !self.shown_workout(workout_id)?.completed;
        self.begin(Mutation::SetCompleted {
            workout_id: workout_id.to_string(),
            completed,
        })
    }

    /// Begin flipping one exercise. An out-of-range index is a no-op mutation.
    pub fn toggle_exercise(
        &mut self,
        workout_id: &str,
        index: usize,
    ) -> Result<MutationId, SessionError> {
        let completed = self
            .shown_workout(workout_id)?
            .exercises
            .get(index)
            .map(|ex| !ex.completed)
            .unwrap_or(false);
        self.begin(Mutation::SetExercise {
            workout_id: workout_id.to_string(),
            index,
            completed,
        })
    }

    fn shown_workout(&self, workout_id: &str) -> Result<&Workout, SessionError> {
        if self.owner.is_none() {
            return Err(SessionError::SignedOut);
        }
        self.workouts
            .iter()
            .find(|w| w.id == workout_id)
            .ok_or_else(|| SessionError::WorkoutNotFound(workout_id.to_string()))
    }

    /// The store accepted the write.
    pub fn confirm(&mut self, id: MutationId) -> Result<(), SessionError> {
        self.settle_one(id, MutationState::Confirmed)
    }

    /// The store write failed: undo the local change.
    pub fn roll_back(&mut self, id: MutationId) -> Result<(), SessionError> {
        self.settle_one(id, MutationState::RolledBack)?;
        tracing::warn!(mutation_id = id, "Rolled back local change");
        self.rebuild();
        Ok(())
    }

    fn settle_one(&mut self, id: MutationId, state: MutationState) -> Result<(), SessionError> {
        let entry = self
            .mutations
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(SessionError::UnknownMutation(id))?;
        if entry.state != MutationState::Pending {
            return Err(SessionError::AlreadySettled(id));
        }
        entry.state = state;
        Ok(())
    }

    pub fn mutation_state(&self, id: MutationId) -> Option<MutationState> {
        self.mutations.iter().find(|m| m.id == id).map(|m| m.state)
    }

    pub fn pending_count(&self) -> usize {
        self.mutations
            .iter()
            .filter(|m| m.state == MutationState::Pending)
            .count()
    }

    /// First step of a delete: the caller shows the returned prompt.
    pub fn request_delete(&self, workout_id: &str) -> Result<DeleteConfirmation, SessionError> {
        if self.owner.is_none() {
            return Err(SessionError::SignedOut);
        }
        let workout = self
            .workouts
            .iter()
            .find(|w| w.id == workout_id)
            .ok_or_else(|| SessionError::WorkoutNotFound(workout_id.to_string()))?;

        Ok(DeleteConfirmation {
            workout_id: workout.id.clone(),
            workout_name: workout.name.clone(),
            generation: self.generation,
        })
    }

    /// Second step of a delete: begins the delete mutation. The caller then
    /// removes the record from the store and confirms or rolls back.
    pub fn confirm_delete(
        &mut self,
        confirmation: DeleteConfirmation,
    ) -> Result<MutationId, SessionError> {
        if confirmation.generation != self.generation {
            return Err(SessionError::StaleConfirmation);
        }
        if self.selected.as_deref() == Some(confirmation.workout_id.as_str()) {
            self.selected = None;
            if self.view == View::Details {
                self.view = View::List;
            }
        }
        self.begin(Mutation::DeleteWorkout {
            workout_id: confirmation.workout_id,
        })
    }

    // ─── Navigation ──────────────────────────────────────────────

    pub fn select_workout(&mut self, workout_id: Option<String>) {
        self.selected = workout_id;
    }

    /// Switch views. Details without a selection falls back to the list.
    pub fn navigate(&mut self, view: View) -> NavigationRequest {
        let view = if view == View::Details && self.selected().is_none() {
            View::List
        } else {
            view
        };
        self.view = view;

        NavigationRequest {
            view,
            workout_id: match view {
                View::Details => self.selected.clone(),
                _ => None,
            },
        }
    }

    // ─── Rendering ───────────────────────────────────────────────

    pub fn dashboard(&self, clock: &LocalClock) -> Dashboard {
        let today = clock.today();
        let card = |w: &Workout| WorkoutCard {
            progress: exercise_progress(w),
            workout: w.clone(),
        };

        let workouts = visible_workouts(&self.workouts, self.filter, self.date_filter, today)
            .iter()
            .map(card)
            .collect();

        let report = (self.view == View::Report).then(|| build_report(&self.workouts, today));

        let glucose = (self.view == View::Glucose).then(|| {
            let day = self.date_filter.unwrap_or(today);
            let mut readings = readings_on(&self.readings, day, clock);
            sort_readings_newest_first(&mut readings);
            GlucosePanel {
                stats: glucose_stats(&self.readings),
                readings,
                day,
            }
        });

        Dashboard {
            signed_in: self.owner.is_some(),
            view: self.view,
            filter: self.filter,
            date_filter: self.date_filter,
            today,
            stats: workout_stats(&self.workouts, today),
            workouts,
            selected: match self.view {
                View::Details => self.selected().map(card),
                _ => None,
            },
            report,
            glucose,
            pending: self.pending_count(),
        }
    }
}
