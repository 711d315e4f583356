// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Template catalogue: built-ins plus the owner's saved templates.

use std::sync::Arc;

use crate::db::{Collection, RecordStore};
use crate::domain::normalize_template;
use crate::error::Result;
use crate::models::record::to_fields;
use crate::models::{builtin_templates, Workout, WorkoutTemplate};
use crate::time_utils::format_utc_rfc3339;

#[derive(Clone)]
pub struct TemplateService {
    store: Arc<dyn RecordStore>,
}

impl TemplateService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Built-in templates first, then the owner's in store order.
    pub async fn list(&self, owner: &str) -> Result<Vec<WorkoutTemplate>> {
        let saved = self.store.list(Collection::WorkoutTemplates, owner).await?;
        let mut templates = builtin_templates();
        templates.extend(saved.iter().map(normalize_template));
        Ok(templates)
    }

    /// Save a workout's plan as a reusable template.
    pub async fn save_from_workout(&self, owner: &str, workout: &Workout) -> Result<WorkoutTemplate> {
        let template = WorkoutTemplate::from_workout(workout);
        let mut fields = to_fields(&template)?;
        fields.insert(
            "createdAt".to_string(),
            format_utc_rfc3339(chrono::Utc::now()).into(),
        );

        let record = self
            .store
            .create(Collection::WorkoutTemplates, owner, fields)
            .await?;
        tracing::debug!(owner, template_id = %record.id, "Saved workout template");
        Ok(normalize_template(&record))
    }
}
