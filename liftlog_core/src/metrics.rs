//! Derived workout metrics: set totals, volume, completion ratio and
//! duration formatting.

use crate::{Aggregate, WorkoutExercise};
use serde::{Deserialize, Serialize};

/// Completed and total set counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTotals {
    pub done: u32,
    pub total: u32,
}

/// Count all sets of an aggregate, and how many are completed.
///
/// A missing aggregate counts as `{0, 0}`.
pub fn total_sets(aggregate: Option<&dyn Aggregate>) -> SetTotals {
    aggregate
        .map(|a| count_sets(a.exercises()))
        .unwrap_or_default()
}

pub fn count_sets(exercises: &[WorkoutExercise]) -> SetTotals {
    exercises
        .iter()
        .flat_map(|e| e.sets.iter())
        .fold(SetTotals::default(), |mut totals, set| {
            totals.total += 1;
            if set.completed {
                totals.done += 1;
            }
            totals
        })
}

/// Sum of weight x reps.
///
/// Live workouts count completed sets only; routine previews pass
/// `include_incomplete = true` to count every planned set. Blank fields
/// read as zero.
pub fn total_volume(aggregate: &dyn Aggregate, include_incomplete: bool) -> f64 {
    exercise_volume(aggregate.exercises(), include_incomplete)
}

pub fn exercise_volume(exercises: &[WorkoutExercise], include_incomplete: bool) -> f64 {
    exercises
        .iter()
        .flat_map(|e| e.sets.iter())
        .filter(|set| include_incomplete || set.completed)
        .map(|set| set.weight.value.or_zero() * set.reps.or_zero())
        .sum()
}

/// Fraction of completed sets in `[0, 1]`, rounded to two decimals
pub fn workout_percentage(totals: SetTotals) -> f64 {
    if totals.total == 0 {
        return 0.0;
    }
    let ratio = f64::from(totals.done) / f64::from(totals.total);
    (ratio * 100.0).round() / 100.0
}

/// Render seconds as `1h 2m 3s`, dropping leading zero units
pub fn format_time(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
