// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coercion of loosely typed stored documents into canonical records.
//!
//! Stored documents were written by several versions of the front end, so any
//! field may be missing, `null`, a string where a number is expected, or a
//! vendor timestamp object. Nothing here fails: anything that cannot be
//! coerced becomes `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::models::{
    BloodSugar, Exercise, GlucoseReading, StoredRecord, TemplateExercise, Workout, WorkoutTemplate,
};
use crate::time_utils::parse_ymd;

/// Coerce a JSON value to a finite number.
///
/// Numbers pass through if finite; strings are trimmed and parsed. Empty strings,
/// booleans, arrays and objects are absent.
pub fn finite_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Coerce a stored timestamp to a UTC instant.
///
/// Accepts timestamp maps (`{seconds, nanos}` and the `_seconds` variants),
/// epoch milliseconds, RFC 3339 strings, and bare `YYYY-MM-DD` dates (taken as
/// UTC midnight).
pub fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Object(map) => {
            let seconds = ["seconds", "_seconds"]
                .iter()
                .find_map(|key| map.get(*key).and_then(finite_number))?;
            let nanos = ["nanos", "nanoseconds", "_nanoseconds"]
                .iter()
                .find_map(|key| map.get(*key).and_then(finite_number))
                .unwrap_or(0.0);
            if !(0.0..1e9).contains(&nanos) {
                return None;
            }
            DateTime::from_timestamp(seconds.trunc() as i64, nanos as u32)
        }
        Value::Number(_) => {
            let millis = finite_number(value)?;
            DateTime::from_timestamp_millis(millis.trunc() as i64)
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(naive.and_utc());
            }
            parse_ymd(s).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|n| n.and_utc())
        }
        _ => None,
    }
}

/// Coerce a stored workout date to a calendar date.
///
/// `YYYY-MM-DD` strings are the canonical form; a full RFC 3339 timestamp keeps
/// the calendar date it was written with.
pub fn coerce_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_ymd(s).or_else(|| {
            DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.date_naive())
        }),
        Value::Object(_) => coerce_timestamp(value).map(|dt| dt.date_naive()),
        _ => None,
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

/// Render a number the way a person typed it: `15`, not `15.0`.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

fn sets(value: &Value) -> u32 {
    match finite_number(value) {
        Some(n) if n >= 1.0 => n.trunc().min(u32::MAX as f64) as u32,
        _ => 1,
    }
}

fn flag(value: &Value) -> bool {
    value.as_bool().unwrap_or(false)
}

fn normalize_exercise(value: &Value) -> Option<Exercise> {
    let map = value.as_object()?;
    let field = |key: &str| map.get(key).unwrap_or(&Value::Null);

    Some(Exercise {
        name: text(field("name")).unwrap_or_default(),
        sets: sets(field("sets")),
        reps: text(field("reps")).unwrap_or_default(),
        details: text(field("details")).filter(|d| !d.trim().is_empty()),
        completed: flag(field("completed")),
    })
}

/// Normalize a stored workout document.
pub fn normalize_workout(record: &StoredRecord) -> Workout {
    let exercises = record
        .get("exercises")
        .as_array()
        .map(|items| items.iter().filter_map(normalize_exercise).collect())
        .unwrap_or_default();

    let blood_sugar = match record.get("bloodSugar") {
        Value::Object(map) => BloodSugar {
            before: map.get("before").and_then(finite_number),
            after: map.get("after").and_then(finite_number),
        },
        _ => BloodSugar::default(),
    };

    Workout {
        id: record.id.clone(),
        date: coerce_date(record.get("date")),
        name: text(record.get("name")).unwrap_or_default(),
        exercises,
        blood_sugar,
        completed: flag(record.get("completed")),
    }
}

/// Normalize a stored glucose reading document.
///
/// `difference` is recomputed whenever both values are present so that it
/// always equals `meter - cgm`; otherwise a stored difference is kept.
pub fn normalize_reading(record: &StoredRecord) -> GlucoseReading {
    let meter = finite_number(record.get("meter"));
    let cgm = finite_number(record.get("cgm"));
    let difference = match (meter, cgm) {
        (Some(meter), Some(cgm)) => Some(meter - cgm),
        _ => finite_number(record.get("difference")),
    };
    let recorded_at = coerce_timestamp(record.get("recordedAt"))
        .or_else(|| coerce_timestamp(record.get("createdAt")));

    GlucoseReading {
        id: record.id.clone(),
        meter,
        cgm,
        difference,
        recorded_at,
    }
}

/// Normalize a stored user template document.
pub fn normalize_template(record: &StoredRecord) -> WorkoutTemplate {
    let exercises = record
        .get("exercises")
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let map = item.as_object()?;
                    Some(TemplateExercise {
                        name: map.get("name").and_then(text).unwrap_or_default(),
                        sets: sets(map.get("sets").unwrap_or(&Value::Null)),
                        reps: map.get("reps").and_then(text).unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let name = text(record.get("name")).unwrap_or_default();
    WorkoutTemplate {
        id: Some(record.id.clone()),
        name: if name.trim().is_empty() {
            "Untitled".to_string()
        } else {
            name
        },
        exercises,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::to_fields;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(id: &str, value: Value) -> StoredRecord {
        let Value::Object(fields) = value else {
            panic!("test record must be an object");
        };
        StoredRecord::new(id, fields)
    }

    #[test]
    fn test_finite_number_coercion() {
        assert_eq!(finite_number(&json!(110)), Some(110.0));
        assert_eq!(finite_number(&json!(" 95.5 ")), Some(95.5));
        assert_eq!(finite_number(&json!("")), None);
        assert_eq!(finite_number(&json!("abc")), None);
        assert_eq!(finite_number(&json!("NaN")), None);
        assert_eq!(finite_number(&json!("inf")), None);
        assert_eq!(finite_number(&json!(true)), None);
        assert_eq!(finite_number(&Value::Null), None);
    }

    #[test]
    fn test_timestamp_coercion_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 9, 10, 12, 0, 0).unwrap();

        assert_eq!(
            coerce_timestamp(&json!({ "seconds": expected.timestamp(), "nanos": 0 })),
            Some(expected)
        );
        assert_eq!(
            coerce_timestamp(&json!({ "_seconds": expected.timestamp(), "_nanoseconds": 0 })),
            Some(expected)
        );
        assert_eq!(
            coerce_timestamp(&json!(expected.timestamp_millis())),
            Some(expected)
        );
        assert_eq!(
            coerce_timestamp(&json!("2024-09-10T14:00:00+02:00")),
            Some(expected)
        );
        assert_eq!(
            coerce_timestamp(&json!("2024-09-10")),
            Some(Utc.with_ymd_and_hms(2024, 9, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(coerce_timestamp(&json!("not a date")), None);
        assert_eq!(coerce_timestamp(&json!({ "nanos": 5 })), None);
        assert_eq!(coerce_timestamp(&json!([1, 2])), None);
    }

    #[test]
    fn test_workout_from_sparse_document() {
        let workout = normalize_workout(&record(
            "w1",
            json!({
                "date": "2024-09-09",
                "name": "Upper Body",
                "exercises": [
                    { "name": "Push-ups", "sets": "3", "reps": 15, "completed": true },
                    { "name": "Rows", "sets": 0 },
                    "garbage"
                ],
                "bloodSugar": { "before": "120", "after": "n/a" }
            }),
        ));

        assert_eq!(workout.id, "w1");
        assert_eq!(workout.date, NaiveDate::from_ymd_opt(2024, 9, 9));
        assert_eq!(workout.exercises.len(), 2);
        assert_eq!(workout.exercises[0].sets, 3);
        assert_eq!(workout.exercises[0].reps, "15");
        assert!(workout.exercises[0].completed);
        assert_eq!(workout.exercises[1].sets, 1);
        assert_eq!(workout.exercises[1].reps, "");
        assert_eq!(workout.blood_sugar.before, Some(120.0));
        assert_eq!(workout.blood_sugar.after, None);
        assert!(!workout.completed);
    }

    #[test]
    fn test_workout_with_unparsable_date() {
        let workout = normalize_workout(&record("w1", json!({ "date": "someday" })));
        assert_eq!(workout.date, None);
        assert!(workout.exercises.is_empty());
    }

    #[test]
    fn test_reading_recomputes_difference() {
        let reading = normalize_reading(&record(
            "r1",
            json!({ "meter": 110, "cgm": "104", "difference": 99 }),
        ));
        assert_eq!(reading.difference, Some(6.0));

        let partial = normalize_reading(&record("r2", json!({ "meter": 110, "difference": 3 })));
        assert_eq!(partial.cgm, None);
        assert_eq!(partial.difference, Some(3.0));
    }

    #[test]
    fn test_reading_falls_back_to_created_at() {
        let reading = normalize_reading(&record(
            "r1",
            json!({ "meter": 100, "cgm": 98, "createdAt": "2024-09-10T08:00:00Z" }),
        ));
        assert_eq!(
            reading.recorded_at,
            Some(Utc.with_ymd_and_hms(2024, 9, 10, 8, 0, 0).unwrap())
        );

        let reading = normalize_reading(&record(
            "r2",
            json!({ "recordedAt": "garbage", "createdAt": null }),
        ));
        assert_eq!(reading.recorded_at, None);
    }

    #[test]
    fn test_normalizing_normalized_workout_is_fixed_point() {
        let first = normalize_workout(&record(
            "w1",
            json!({
                "date": "2024-09-10",
                "name": "Cardio & Core",
                "exercises": [
                    { "name": "Running", "sets": 1, "reps": "30 minutes", "details": "easy pace" },
                    { "name": "Planks", "sets": 3.7, "reps": 60, "completed": true }
                ],
                "bloodSugar": { "before": 140, "after": null },
                "completed": false
            }),
        ));
        let second = normalize_workout(&StoredRecord::new(
            first.id.clone(),
            to_fields(&first).unwrap(),
        ));
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalizing_normalized_reading_is_fixed_point() {
        let first = normalize_reading(&record(
            "r1",
            json!({
                "meter": "101.5",
                "cgm": 99,
                "recordedAt": { "seconds": 1_725_960_000, "nanos": 123_000_000 }
            }),
        ));
        let second = normalize_reading(&StoredRecord::new(
            first.id.clone(),
            to_fields(&first).unwrap(),
        ));
        assert_eq!(first, second);
    }

    #[test]
    fn test_template_defaults() {
        let template = normalize_template(&record(
            "t1",
            json!({ "name": "", "exercises": [{ "name": "Squats", "reps": 15 }] }),
        ));
        assert_eq!(template.id.as_deref(), Some("t1"));
        assert_eq!(template.name, "Untitled");
        assert_eq!(template.exercises[0].sets, 1);
        assert_eq!(template.exercises[0].reps, "15");
    }
}
