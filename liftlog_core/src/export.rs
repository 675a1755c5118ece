//! CSV export of workout history.
//!
//! One row per set, so the file can be pivoted in a spreadsheet.

use crate::{Result, Workout};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    workout_id: String,
    date: String,
    title: &'a str,
    exercise: &'a str,
    set_id: u32,
    set_type: &'static str,
    number: Option<u32>,
    weight: String,
    unit: String,
    reps: String,
    completed: bool,
    intensity: Option<String>,
}

/// Write every set of `workouts` to `path`, replacing any existing file.
/// Returns the number of rows written.
pub fn workouts_to_csv(workouts: &[Workout], path: &Path) -> Result<usize> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0;

    for workout in workouts {
        let workout_id = workout.id.map(|id| id.to_string()).unwrap_or_default();
        let date = workout.date.to_rfc3339();

        for exercise in &workout.workout_exercises {
            for set in &exercise.sets {
                writer.serialize(CsvRow {
                    workout_id: workout_id.clone(),
                    date: date.clone(),
                    title: &workout.title,
                    exercise: &exercise.exercise.name,
                    set_id: set.id,
                    set_type: set.set_type.label(),
                    number: set.number,
                    weight: set.weight.value.to_string(),
                    unit: set.weight.unit.to_string(),
                    reps: set.reps.to_string(),
                    completed: set.completed,
                    intensity: set.intensity.map(|i| format!("{} {}", i.scale, i.value)),
                })?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    tracing::info!("Exported {} set rows to {:?}", rows, path);
    Ok(rows)
}
