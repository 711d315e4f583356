// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Glucose reading log.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use validator::Validate;

use crate::db::{Collection, RecordStore};
use crate::domain::{glucose_stats, normalize_reading, readings_on, sort_readings_newest_first};
use crate::error::Result;
use crate::models::record::to_fields;
use crate::models::{GlucoseReading, GlucoseStats, NewReading, ReadingDocument};
use crate::time_utils::{format_utc_rfc3339, LocalClock};

#[derive(Clone)]
pub struct GlucoseService {
    store: Arc<dyn RecordStore>,
}

impl GlucoseService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All of the owner's readings, newest first.
    pub async fn list(&self, owner: &str) -> Result<Vec<GlucoseReading>> {
        let records = self
            .store
            .list(Collection::BloodSugarReadings, owner)
            .await?;
        let mut readings: Vec<_> = records.iter().map(normalize_reading).collect();
        sort_readings_newest_first(&mut readings);
        Ok(readings)
    }

    /// Readings newest first, limited to one local calendar day when `day` is
    /// set, plus stats over all of the owner's readings.
    pub async fn list_on(
        &self,
        owner: &str,
        day: Option<NaiveDate>,
        clock: &LocalClock,
    ) -> Result<(Vec<GlucoseReading>, GlucoseStats)> {
        let all = self.list(owner).await?;
        let stats = glucose_stats(&all);
        let readings = match day {
            Some(day) => readings_on(&all, day, clock),
            None => all,
        };
        Ok((readings, stats))
    }

    /// Log a meter/CGM pair. `recorded_at` defaults to `now`.
    pub async fn add_reading(
        &self,
        owner: &str,
        reading: NewReading,
        now: DateTime<Utc>,
    ) -> Result<GlucoseReading> {
        reading.validate()?;

        let difference = match (reading.meter, reading.cgm) {
            (Some(meter), Some(cgm)) => Some(meter - cgm),
            _ => None,
        };
        let document = ReadingDocument {
            meter: reading.meter,
            cgm: reading.cgm,
            difference,
            recorded_at: format_utc_rfc3339(reading.recorded_at.unwrap_or(now)),
            created_at: format_utc_rfc3339(now),
        };

        let record = self
            .store
            .create(Collection::BloodSugarReadings, owner, to_fields(&document)?)
            .await?;
        tracing::info!(owner, reading_id = %record.id, "Logged glucose reading");
        Ok(normalize_reading(&record))
    }

    pub async fn delete_reading(&self, owner: &str, id: &str) -> Result<()> {
        self.store
            .remove(Collection::BloodSugarReadings, owner, id)
            .await?;
        tracing::info!(owner, reading_id = id, "Deleted glucose reading");
        Ok(())
    }
}
