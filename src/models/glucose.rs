// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paired meter / CGM glucose readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// A logged reading (canonical, normalized shape). Values are mg/dL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GlucoseReading {
    pub id: String,
    pub meter: Option<f64>,
    pub cgm: Option<f64>,
    /// `meter - cgm` whenever both are present
    pub difference: Option<f64>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl GlucoseReading {
    /// Both device values, if the reading is a complete pair.
    pub fn pair(&self) -> Option<(f64, f64)> {
        match (self.meter, self.cgm) {
            (Some(meter), Some(cgm)) => Some((meter, cgm)),
            _ => None,
        }
    }
}

/// Request to log a reading.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReading {
    #[validate(required(message = "Enter both meter and CGM readings."))]
    pub meter: Option<f64>,
    #[validate(required(message = "Enter both meter and CGM readings."))]
    pub cgm: Option<f64>,
    /// Defaults to the time the reading is stored
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Stored document shape of a reading.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingDocument {
    pub meter: Option<f64>,
    pub cgm: Option<f64>,
    pub difference: Option<f64>,
    pub recorded_at: String,
    pub created_at: String,
}
