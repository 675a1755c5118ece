//! Workout history queries.

use crate::{ExerciseSet, Workout};
use chrono::{DateTime, Duration, Utc};

/// Workouts from the last `days` days, newest first
pub fn recent_workouts(workouts: &[Workout], days: i64, now: DateTime<Utc>) -> Vec<&Workout> {
    let cutoff = now - Duration::days(days);
    let mut recent: Vec<&Workout> = workouts.iter().filter(|w| w.date >= cutoff).collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent
}

/// Sets performed for `exercise_id` in the most recent workout that
/// included it (the "previous" column while logging).
pub fn previous_sets<'a>(workouts: &'a [Workout], exercise_id: &str) -> Option<&'a [ExerciseSet]> {
    let mut candidates: Vec<&Workout> = workouts.iter().collect();
    candidates.sort_by(|a, b| b.date.cmp(&a.date));

    candidates.into_iter().find_map(|workout| {
        workout
            .workout_exercises
            .iter()
            .find(|e| e.exercise.id == exercise_id && e.sets.iter().any(|s| s.completed))
            .map(|e| e.sets.as_slice())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::{NumericInput, Preferences, SessionStore};

    fn workout(days_ago: i64, exercise_id: &str, reps: f64, complete: bool) -> Workout {
        let mut store = SessionStore::new();
        store.new_workout("u1", &Preferences::default());
        let exercise = get_default_catalog().find_exercise(exercise_id).cloned().unwrap();
        store.add_exercises(&[exercise], None);
        let id = store.workout().unwrap().workout_exercises[0].id;
        store.change_reps(id, 0, NumericInput::Value(reps));
        if complete {
            store.toggle_set_completion(id, 0);
        }
        let mut w = store.workout().cloned().unwrap();
        w.date = Utc::now() - Duration::days(days_ago);
        w
    }

    #[test]
    fn test_recent_workouts_window() {
        let workouts = vec![
            workout(10, "squat", 5.0, true),
            workout(1, "squat", 5.0, true),
            workout(3, "bench_press", 5.0, true),
        ];
        let recent = recent_workouts(&workouts, 7, Utc::now());
        assert_eq!(recent.len(), 2);
        assert!(recent[0].date > recent[1].date);
    }

    #[test]
    fn test_previous_sets_uses_latest_completed() {
        let workouts = vec![
            workout(5, "squat", 3.0, true),
            workout(2, "squat", 8.0, true),
            workout(1, "squat", 12.0, false),
            workout(1, "bench_press", 10.0, true),
        ];
        let previous = previous_sets(&workouts, "squat").unwrap();
        assert_eq!(previous[0].reps, NumericInput::Value(8.0));
        assert!(previous_sets(&workouts, "deadlift").is_none());
    }
}
