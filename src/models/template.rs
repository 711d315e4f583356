// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout templates: built-in quick starts and user-saved plans.

use serde::{Deserialize, Serialize};

use crate::models::Workout;

/// A reusable workout plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    /// Store ID for user templates, `None` for built-ins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub exercises: Vec<TemplateExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    pub name: String,
    pub sets: u32,
    pub reps: String,
}

impl WorkoutTemplate {
    /// Template derived from a saved workout (completion state dropped).
    pub fn from_workout(workout: &Workout) -> Self {
        let name = workout.name.trim();
        Self {
            id: None,
            name: if name.is_empty() {
                "Untitled".to_string()
            } else {
                name.to_string()
            },
            exercises: workout
                .exercises
                .iter()
                .map(|ex| TemplateExercise {
                    name: ex.name.clone(),
                    sets: ex.sets.max(1),
                    reps: ex.reps.clone(),
                })
                .collect(),
        }
    }
}

fn builtin(name: &str, exercises: &[(&str, u32, &str)]) -> WorkoutTemplate {
    WorkoutTemplate {
        id: None,
        name: name.to_string(),
        exercises: exercises
            .iter()
            .map(|&(name, sets, reps)| TemplateExercise {
                name: name.to_string(),
                sets,
                reps: reps.to_string(),
            })
            .collect(),
    }
}

/// Templates offered to every user.
pub fn builtin_templates() -> Vec<WorkoutTemplate> {
    vec![
        builtin(
            "Quick HIIT",
            &[
                ("Burpees", 3, "10"),
                ("Jumping Jacks", 3, "30"),
                ("High Knees", 3, "20"),
            ],
        ),
        builtin(
            "Strength Training",
            &[
                ("Push-ups", 3, "15"),
                ("Squats", 3, "15"),
                ("Planks", 3, "60 seconds"),
            ],
        ),
        builtin(
            "Flexibility & Stretching",
            &[
                ("Forward Fold", 1, "2 minutes"),
                ("Shoulder Stretch", 1, "1 minute each arm"),
                ("Hip Circles", 1, "10 each direction"),
            ],
        ),
    ]
}
