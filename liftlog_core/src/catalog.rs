//! Reference data: exercises, equipment, categories and muscles.
//!
//! The built-in catalog seeds the local backend and is what the reference
//! cache is refetched from when its stored version is outdated.

use crate::Exercise;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lists the app needs to pick and describe exercises
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ReferenceData {
    pub exercises: Vec<Exercise>,
    pub equipment: Vec<String>,
    pub categories: Vec<String>,
    pub muscles: Vec<String>,
}

impl ReferenceData {
    pub fn find_exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Case-insensitive substring match on exercise names
    pub fn search(&self, query: &str) -> Vec<&Exercise> {
        let needle = query.to_lowercase();
        self.exercises
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Check the catalog for consistency. Returns one message per problem.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            if !seen.insert(exercise.id.as_str()) {
                errors.push(format!("Duplicate exercise id '{}'", exercise.id));
            }
            if !self.categories.contains(&exercise.category) {
                errors.push(format!(
                    "Exercise '{}' has unknown category '{}'",
                    exercise.id, exercise.category
                ));
            }
            if !self.equipment.contains(&exercise.equipment) {
                errors.push(format!(
                    "Exercise '{}' has unknown equipment '{}'",
                    exercise.id, exercise.equipment
                ));
            }
            for muscle in &exercise.muscles {
                if !self.muscles.contains(muscle) {
                    errors.push(format!(
                        "Exercise '{}' targets unknown muscle '{}'",
                        exercise.id, muscle
                    ));
                }
            }
        }

        errors
    }
}

static DEFAULT_CATALOG: Lazy<ReferenceData> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static ReferenceData {
    &DEFAULT_CATALOG
}

fn exercise(id: &str, name: &str, category: &str, equipment: &str, muscles: &[&str]) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        category: category.into(),
        equipment: equipment.into(),
        muscles: muscles.iter().map(|m| m.to_string()).collect(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Builds the built-in catalog
pub fn build_default_catalog() -> ReferenceData {
    ReferenceData {
        exercises: vec![
            exercise("bench_press", "Bench Press", "chest", "barbell", &["chest", "triceps", "shoulders"]),
            exercise("incline_db_press", "Incline Dumbbell Press", "chest", "dumbbell", &["chest", "shoulders"]),
            exercise("dip", "Dip", "chest", "bodyweight", &["chest", "triceps"]),
            exercise("squat", "Back Squat", "legs", "barbell", &["quadriceps", "glutes"]),
            exercise("front_squat", "Front Squat", "legs", "barbell", &["quadriceps"]),
            exercise("leg_press", "Leg Press", "legs", "machine", &["quadriceps", "glutes"]),
            exercise("romanian_deadlift", "Romanian Deadlift", "legs", "barbell", &["hamstrings", "glutes"]),
            exercise("deadlift", "Deadlift", "back", "barbell", &["hamstrings", "glutes", "lower_back"]),
            exercise("barbell_row", "Barbell Row", "back", "barbell", &["lats", "upper_back"]),
            exercise("pullup", "Pull-up", "back", "bodyweight", &["lats", "biceps"]),
            exercise("lat_pulldown", "Lat Pulldown", "back", "cable", &["lats", "biceps"]),
            exercise("overhead_press", "Overhead Press", "shoulders", "barbell", &["shoulders", "triceps"]),
            exercise("lateral_raise", "Lateral Raise", "shoulders", "dumbbell", &["shoulders"]),
            exercise("barbell_curl", "Barbell Curl", "arms", "barbell", &["biceps"]),
            exercise("triceps_pushdown", "Triceps Pushdown", "arms", "cable", &["triceps"]),
            exercise("plank", "Plank", "core", "bodyweight", &["abs"]),
        ],
        equipment: strings(&["barbell", "dumbbell", "machine", "cable", "bodyweight"]),
        categories: strings(&["chest", "legs", "back", "shoulders", "arms", "core"]),
        muscles: strings(&[
            "chest",
            "triceps",
            "shoulders",
            "quadriceps",
            "glutes",
            "hamstrings",
            "lower_back",
            "lats",
            "upper_back",
            "biceps",
            "abs",
        ]),
    }
}
