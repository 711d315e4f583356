// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout-Tracker: plan workouts and compare glucose meter and CGM readings
//!
//! This crate provides the backend API: owner-scoped workout and glucose
//! records, dashboard statistics, weekly/monthly reports and live updates.

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::RecordStore;
use services::Services;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub services: Services,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn RecordStore>) -> Self {
        Self {
            config,
            services: Services::new(store.clone()),
            store,
        }
    }
}
