// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout model for storage and API.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// A planned workout (canonical, normalized shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Workout {
    /// Store-assigned document ID
    pub id: String,
    /// Local calendar date; `None` when the stored value was unparsable
    pub date: Option<NaiveDate>,
    pub name: String,
    /// Display order is user-significant
    pub exercises: Vec<Exercise>,
    pub blood_sugar: BloodSugar,
    pub completed: bool,
}

impl Workout {
    /// Whether every exercise is completed (vacuously true with no exercises).
    pub fn all_exercises_completed(&self) -> bool {
        self.exercises.iter().all(|ex| ex.completed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    /// Numeric reps or a duration phrase ("30 sec")
    pub reps: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub completed: bool,
}

/// Blood sugar taken around a workout (mg/dL).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BloodSugar {
    pub before: Option<f64>,
    pub after: Option<f64>,
}

// ─── Write Payloads ──────────────────────────────────────────

/// Request to create a workout.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkout {
    #[validate(custom(function = "not_blank", message = "Workout name is required"))]
    pub name: String,
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "At least one exercise is required"), nested)]
    pub exercises: Vec<NewExercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    #[validate(custom(function = "not_blank", message = "Exercise name is required"))]
    pub name: String,
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(deserialize_with = "string_or_number")]
    #[validate(custom(function = "not_blank", message = "Exercise reps are required"))]
    pub reps: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl NewWorkout {
    /// Build the workout as it is first stored: nothing completed, no readings.
    pub fn into_workout(self) -> Workout {
        Workout {
            id: String::new(),
            date: Some(self.date),
            name: self.name.trim().to_string(),
            exercises: self
                .exercises
                .into_iter()
                .map(|ex| Exercise {
                    name: ex.name.trim().to_string(),
                    sets: ex.sets.max(1),
                    reps: ex.reps.trim().to_string(),
                    details: ex.details.filter(|d| !d.trim().is_empty()),
                    completed: false,
                })
                .collect(),
            blood_sugar: BloodSugar::default(),
            completed: false,
        }
    }
}

/// Full edit of a workout from the details view ("save").
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEdit {
    #[validate(custom(function = "not_blank", message = "Workout name is required"))]
    pub name: String,
    pub date: NaiveDate,
    #[validate(nested)]
    pub exercises: Vec<ExerciseEdit>,
    #[serde(default)]
    pub blood_sugar: BloodSugar,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEdit {
    pub name: String,
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(deserialize_with = "string_or_number")]
    #[validate(custom(function = "not_blank", message = "Exercise reps are required"))]
    pub reps: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl WorkoutEdit {
    /// Apply the edit; `completed` is recomputed from the exercises.
    pub fn into_workout(self, id: &str) -> Workout {
        let exercises: Vec<Exercise> = self
            .exercises
            .into_iter()
            .enumerate()
            .map(|(index, ex)| {
                let name = ex.name.trim();
                Exercise {
                    name: if name.is_empty() {
                        format!("Exercise {}", index + 1)
                    } else {
                        name.to_string()
                    },
                    sets: ex.sets.max(1),
                    reps: ex.reps.trim().to_string(),
                    details: ex.details.filter(|d| !d.trim().is_empty()),
                    completed: ex.completed,
                }
            })
            .collect();

        let mut workout = Workout {
            id: id.to_string(),
            date: Some(self.date),
            name: self.name.trim().to_string(),
            exercises,
            blood_sugar: BloodSugar {
                before: self.blood_sugar.before.filter(|v| v.is_finite()),
                after: self.blood_sugar.after.filter(|v| v.is_finite()),
            },
            completed: false,
        };
        workout.completed = workout.all_exercises_completed();
        workout
    }
}

fn default_sets() -> u32 {
    1
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Accept reps as either `"30 sec"` or `15`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reps {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Reps::deserialize(deserializer)? {
        Reps::Text(s) => s,
        Reps::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_workout(value: serde_json::Value) -> NewWorkout {
        serde_json::from_value(value).expect("valid payload shape")
    }

    #[test]
    fn test_new_workout_accepts_numeric_reps() {
        let workout = new_workout(json!({
            "name": "Quick HIIT",
            "date": "2024-09-09",
            "exercises": [{ "name": "Burpees", "sets": 3, "reps": 10 }]
        }));
        assert!(workout.validate().is_ok());
        assert_eq!(workout.exercises[0].reps, "10");
    }

    #[test]
    fn test_new_workout_rejects_blank_name() {
        let workout = new_workout(json!({
            "name": "   ",
            "date": "2024-09-09",
            "exercises": [{ "name": "Squats", "reps": "15" }]
        }));
        let errors = workout.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_new_workout_rejects_missing_reps() {
        let workout = new_workout(json!({
            "name": "Legs",
            "date": "2024-09-09",
            "exercises": [
                { "name": "Squats", "reps": "15" },
                { "name": "Lunges", "reps": "" }
            ]
        }));
        assert!(workout.validate().is_err());
    }

    #[test]
    fn test_new_workout_requires_an_exercise() {
        let workout = new_workout(json!({
            "name": "Legs",
            "date": "2024-09-09",
            "exercises": []
        }));
        assert!(workout.validate().is_err());
    }

    #[test]
    fn test_into_workout_starts_incomplete() {
        let workout = new_workout(json!({
            "name": " Legs ",
            "date": "2024-09-09",
            "exercises": [{ "name": "Squats", "sets": 0, "reps": "15" }]
        }))
        .into_workout();

        assert_eq!(workout.name, "Legs");
        assert_eq!(workout.exercises[0].sets, 1);
        assert!(!workout.completed);
        assert!(!workout.exercises[0].completed);
        assert_eq!(workout.blood_sugar, BloodSugar::default());
    }

    #[test]
    fn test_edit_recomputes_completed() {
        let edit: WorkoutEdit = serde_json::from_value(json!({
            "name": "Legs",
            "date": "2024-09-09",
            "exercises": [
                { "name": "Squats", "reps": "15", "completed": true },
                { "name": "", "reps": "12", "completed": true }
            ],
            "bloodSugar": { "before": 120, "after": null }
        }))
        .unwrap();

        let workout = edit.into_workout("w1");
        assert!(workout.completed);
        assert_eq!(workout.exercises[1].name, "Exercise 2");
        assert_eq!(workout.blood_sugar.before, Some(120.0));
    }
}
