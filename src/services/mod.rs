// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod glucose;
pub mod templates;
pub mod workouts;

use std::sync::Arc;

use crate::db::RecordStore;

pub use glucose::GlucoseService;
pub use templates::TemplateService;
pub use workouts::WorkoutService;

/// All services over one record store.
#[derive(Clone)]
pub struct Services {
    pub workouts: WorkoutService,
    pub glucose: GlucoseService,
    pub templates: TemplateService,
}

impl Services {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let templates = TemplateService::new(store.clone());
        Self {
            workouts: WorkoutService::new(store.clone(), templates.clone()),
            glucose: GlucoseService::new(store),
            templates,
        }
    }
}
