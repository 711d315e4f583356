// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout planning and completion tracking.
//!
//! All reads go through the normalizer, so handlers only ever see canonical
//! [`Workout`] values regardless of how a document was originally written.

use std::sync::Arc;

use serde_json::Value;
use validator::Validate;

use crate::db::{Collection, RecordStore};
use crate::domain::normalize_workout;
use crate::error::{AppError, Result};
use crate::models::record::to_fields;
use crate::models::{Fields, NewWorkout, Workout, WorkoutEdit};
use crate::services::TemplateService;
use crate::time_utils::format_utc_rfc3339;

#[derive(Clone)]
pub struct WorkoutService {
    store: Arc<dyn RecordStore>,
    templates: TemplateService,
}

impl WorkoutService {
    pub fn new(store: Arc<dyn RecordStore>, templates: TemplateService) -> Self {
        Self { store, templates }
    }

    /// All of the owner's workouts in store order.
    pub async fn list(&self, owner: &str) -> Result<Vec<Workout>> {
        let records = self.store.list(Collection::Workouts, owner).await?;
        Ok(records.iter().map(normalize_workout).collect())
    }

    pub async fn get(&self, owner: &str, id: &str) -> Result<Workout> {
        let record = self.store.get(Collection::Workouts, owner, id).await?;
        Ok(normalize_workout(&record))
    }

    /// Create a workout, then save its plan as a personal template.
    ///
    /// The template write is best effort: its failure is logged and the
    /// created workout is still returned.
    pub async fn add_workout(&self, owner: &str, new: NewWorkout) -> Result<Workout> {
        new.validate()?;

        let workout = new.into_workout();
        let mut fields = to_fields(&workout)?;
        fields.insert(
            "createdAt".to_string(),
            format_utc_rfc3339(chrono::Utc::now()).into(),
        );

        let record = self.store.create(Collection::Workouts, owner, fields).await?;
        let created = normalize_workout(&record);
        tracing::info!(owner, workout_id = %created.id, "Created workout");

        if let Err(e) = self.templates.save_from_workout(owner, &created).await {
            tracing::warn!(
                owner,
                workout_id = %created.id,
                error = %e,
                "Failed to save workout template"
            );
        }

        Ok(created)
    }

    /// Replace name, date, exercises and blood sugar from the details view.
    ///
    /// `completed` is recomputed: true iff every exercise is completed.
    pub async fn save_workout(&self, owner: &str, id: &str, edit: WorkoutEdit) -> Result<Workout> {
        edit.validate()?;

        let workout = edit.into_workout(id);
        let mut fields = to_fields(&workout)?;
        if workout.date.is_none() {
            fields.remove("date");
        }

        self.store
            .update(Collection::Workouts, owner, id, fields)
            .await?;
        tracing::info!(owner, workout_id = id, completed = workout.completed, "Saved workout");
        Ok(workout)
    }

    /// Flip the workout's `completed` flag. Exercise flags are left alone.
    pub async fn toggle_complete(&self, owner: &str, id: &str) -> Result<Workout> {
        let mut workout = self.get(owner, id).await?;
        workout.completed = !workout.completed;

        let mut patch = Fields::new();
        patch.insert("completed".to_string(), Value::Bool(workout.completed));
        self.store
            .update(Collection::Workouts, owner, id, patch)
            .await?;

        tracing::debug!(owner, workout_id = id, completed = workout.completed, "Toggled workout");
        Ok(workout)
    }

    /// Flip one exercise's `completed` flag by position.
    pub async fn toggle_exercise(&self, owner: &str, id: &str, index: usize) -> Result<Workout> {
        let mut workout = self.get(owner, id).await?;
        let exercise = workout.exercises.get_mut(index).ok_or_else(|| {
            AppError::BadRequest(format!("Workout {} has no exercise {}", id, index))
        })?;
        exercise.completed = !exercise.completed;

        let mut patch = Fields::new();
        patch.insert(
            "exercises".to_string(),
            serde_json::to_value(&workout.exercises).map_err(anyhow::Error::from)?,
        );
        self.store
            .update(Collection::Workouts, owner, id, patch)
            .await?;

        tracing::debug!(owner, workout_id = id, index, "Toggled exercise");
        Ok(workout)
    }

    /// Permanently delete a workout. Refused unless `confirmed`.
    pub async fn delete_workout(&self, owner: &str, id: &str, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(AppError::ConfirmationRequired(format!(
                "Deleting workout {} cannot be undone",
                id
            )));
        }

        self.store.remove(Collection::Workouts, owner, id).await?;
        tracing::info!(owner, workout_id = id, "Deleted workout");
        Ok(())
    }
}
