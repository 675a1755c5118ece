//! Remote-backend collaborator: workout and routine CRUD.
//!
//! The session engine only sees the [`Backend`] trait. Any failure comes
//! back as [`Error::Backend`] carrying a fixed message for the operation,
//! suitable for showing to the user; the underlying cause is logged.
//! Nothing here retries.

use crate::catalog::{self, ReferenceData};
use crate::persist::KeyValueStore;
use crate::units::{convert_set_weight, convert_weight, round2};
use crate::{Error, Result, Routine, WeightUnit, Workout, WorkoutExercise};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

const WORKOUTS_KEY: &str = "workouts";
const ROUTINES_KEY: &str = "routines";

pub trait Backend {
    fn fetch_reference_data(&self) -> Result<ReferenceData>;

    /// All workouts of a user, newest first, with weights shown in `unit_pref`
    fn fetch_workouts_with_exercises(
        &self,
        user_id: &str,
        unit_pref: WeightUnit,
    ) -> Result<Vec<Workout>>;
    fn fetch_workout_by_id(&self, id: Uuid) -> Result<Workout>;
    fn fetch_routines_with_exercises(&self, user_id: &str) -> Result<Vec<Routine>>;
    fn fetch_routine_by_id(&self, id: Uuid) -> Result<Routine>;

    fn create_workout(&mut self, workout: &Workout) -> Result<Workout>;
    fn edit_workout(&mut self, workout: &Workout) -> Result<Workout>;
    fn delete_workout(&mut self, id: Uuid) -> Result<()>;

    fn create_routine(&mut self, routine: &Routine) -> Result<Routine>;
    fn edit_routine(&mut self, routine: &Routine) -> Result<Routine>;
    fn delete_routine(&mut self, id: Uuid) -> Result<()>;
}

/// Ids of exercises present in `old` but missing from `new`; these child
/// rows must be deleted when the aggregate is saved to a row-per-exercise
/// store. [`LocalBackend`] overwrites the whole aggregate, so it only logs
/// them.
pub fn deleted_exercise_ids(old: &[WorkoutExercise], new: &[WorkoutExercise]) -> Vec<Uuid> {
    let kept: HashSet<Uuid> = new.iter().map(|e| e.id).collect();
    old.iter()
        .map(|e| e.id)
        .filter(|id| !kept.contains(id))
        .collect()
}

fn backend_error(message: &str, cause: impl std::fmt::Display) -> Error {
    tracing::error!("{}: {}", message, cause);
    Error::Backend(message.to_string())
}

/// Backend that keeps workouts and routines as JSON collections in a
/// [`KeyValueStore`]
pub struct LocalBackend<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> LocalBackend<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    fn load_rows<T: DeserializeOwned>(&self, key: &str, message: &str) -> Result<Vec<T>> {
        match self.kv.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).map_err(|e| backend_error(message, e)),
            Ok(None) => Ok(Vec::new()),
            Err(e) => Err(backend_error(message, e)),
        }
    }

    fn store_rows<T: Serialize>(&mut self, key: &str, rows: &[T], message: &str) -> Result<()> {
        let raw = serde_json::to_string(rows).map_err(|e| backend_error(message, e))?;
        self.kv
            .set(key, &raw)
            .map_err(|e| backend_error(message, e))
    }
}

impl<S: KeyValueStore> Backend for LocalBackend<S> {
    fn fetch_reference_data(&self) -> Result<ReferenceData> {
        Ok(catalog::get_default_catalog().clone())
    }

    fn fetch_workouts_with_exercises(
        &self,
        user_id: &str,
        unit_pref: WeightUnit,
    ) -> Result<Vec<Workout>> {
        let mut workouts: Vec<Workout> = self
            .load_rows::<Workout>(WORKOUTS_KEY, "Failed to load workouts")?
            .into_iter()
            .filter(|w| w.user_id == user_id)
            .collect();

        for workout in workouts.iter_mut() {
            for exercise in workout.workout_exercises.iter_mut() {
                for set in exercise.sets.iter_mut() {
                    convert_set_weight(set, unit_pref);
                }
            }
            workout.volume = round2(convert_weight(workout.volume, workout.units, unit_pref));
            workout.units = unit_pref;
        }

        workouts.sort_by(|a, b| b.date.cmp(&a.date));
        tracing::debug!("Fetched {} workouts for {}", workouts.len(), user_id);
        Ok(workouts)
    }

    fn fetch_workout_by_id(&self, id: Uuid) -> Result<Workout> {
        const MESSAGE: &str = "Failed to load workout";
        self.load_rows::<Workout>(WORKOUTS_KEY, MESSAGE)?
            .into_iter()
            .find(|w| w.id == Some(id))
            .ok_or_else(|| backend_error(MESSAGE, format!("no workout {}", id)))
    }

    fn fetch_routines_with_exercises(&self, user_id: &str) -> Result<Vec<Routine>> {
        let mut routines: Vec<Routine> = self
            .load_rows::<Routine>(ROUTINES_KEY, "Failed to load routines")?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        routines.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(routines)
    }

    fn fetch_routine_by_id(&self, id: Uuid) -> Result<Routine> {
        const MESSAGE: &str = "Failed to load routine";
        self.load_rows::<Routine>(ROUTINES_KEY, MESSAGE)?
            .into_iter()
            .find(|r| r.id == Some(id))
            .ok_or_else(|| backend_error(MESSAGE, format!("no routine {}", id)))
    }

    fn create_workout(&mut self, workout: &Workout) -> Result<Workout> {
        const MESSAGE: &str = "Failed to save workout";
        let mut rows: Vec<Workout> = self.load_rows(WORKOUTS_KEY, MESSAGE)?;
        let mut created = workout.clone();
        created.id = Some(Uuid::new_v4());
        rows.push(created.clone());
        self.store_rows(WORKOUTS_KEY, &rows, MESSAGE)?;
        tracing::info!("Created workout {:?}", created.id);
        Ok(created)
    }

    fn edit_workout(&mut self, workout: &Workout) -> Result<Workout> {
        const MESSAGE: &str = "Failed to update workout";
        let mut rows: Vec<Workout> = self.load_rows(WORKOUTS_KEY, MESSAGE)?;
        let Some(existing) = rows.iter_mut().find(|w| w.id.is_some() && w.id == workout.id) else {
            return Err(backend_error(MESSAGE, format!("no workout {:?}", workout.id)));
        };

        let deleted = deleted_exercise_ids(&existing.workout_exercises, &workout.workout_exercises);
        if !deleted.is_empty() {
            tracing::debug!("Dropping {} exercises: {:?}", deleted.len(), deleted);
        }
        *existing = workout.clone();
        self.store_rows(WORKOUTS_KEY, &rows, MESSAGE)?;
        Ok(workout.clone())
    }

    fn delete_workout(&mut self, id: Uuid) -> Result<()> {
        const MESSAGE: &str = "Failed to delete workout";
        let mut rows: Vec<Workout> = self.load_rows(WORKOUTS_KEY, MESSAGE)?;
        let before = rows.len();
        rows.retain(|w| w.id != Some(id));
        if rows.len() == before {
            return Err(backend_error(MESSAGE, format!("no workout {}", id)));
        }
        self.store_rows(WORKOUTS_KEY, &rows, MESSAGE)
    }

    fn create_routine(&mut self, routine: &Routine) -> Result<Routine> {
        const MESSAGE: &str = "Failed to create routine";
        let mut rows: Vec<Routine> = self.load_rows(ROUTINES_KEY, MESSAGE)?;
        let mut created = routine.clone();
        created.id = Some(Uuid::new_v4());
        rows.push(created.clone());
        self.store_rows(ROUTINES_KEY, &rows, MESSAGE)?;
        tracing::info!("Created routine {:?}", created.id);
        Ok(created)
    }

    fn edit_routine(&mut self, routine: &Routine) -> Result<Routine> {
        const MESSAGE: &str = "Failed to update routine";
        let mut rows: Vec<Routine> = self.load_rows(ROUTINES_KEY, MESSAGE)?;
        let Some(existing) = rows.iter_mut().find(|r| r.id.is_some() && r.id == routine.id) else {
            return Err(backend_error(MESSAGE, format!("no routine {:?}", routine.id)));
        };

        let deleted = deleted_exercise_ids(&existing.workout_exercises, &routine.workout_exercises);
        if !deleted.is_empty() {
            tracing::debug!("Dropping {} exercises: {:?}", deleted.len(), deleted);
        }
        *existing = routine.clone();
        self.store_rows(ROUTINES_KEY, &rows, MESSAGE)?;
        Ok(routine.clone())
    }

    fn delete_routine(&mut self, id: Uuid) -> Result<()> {
        const MESSAGE: &str = "Failed to delete routine";
        let mut rows: Vec<Routine> = self.load_rows(ROUTINES_KEY, MESSAGE)?;
        let before = rows.len();
        rows.retain(|r| r.id != Some(id));
        if rows.len() == before {
            return Err(backend_error(MESSAGE, format!("no routine {}", id)));
        }
        self.store_rows(ROUTINES_KEY, &rows, MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use crate::{NumericInput, Preferences, SessionStore, StoreMode};
    use chrono::{Duration, Utc};

    fn backend() -> LocalBackend<MemoryStore> {
        LocalBackend::new(MemoryStore::new())
    }

    fn workout(user: &str, exercise_ids: &[&str]) -> Workout {
        let catalog = catalog::get_default_catalog();
        let mut store = SessionStore::new();
        store.new_workout(user, &Preferences::default());
        let exercises: Vec<_> = exercise_ids
            .iter()
            .filter_map(|id| catalog.find_exercise(id).cloned())
            .collect();
        store.add_exercises(&exercises, None);
        store.workout().cloned().unwrap()
    }

    #[test]
    fn test_deleted_exercise_ids() {
        let w = workout("u1", &["squat", "deadlift", "pullup"]);
        let mut edited = w.workout_exercises.clone();
        edited.remove(1);
        assert_eq!(
            deleted_exercise_ids(&w.workout_exercises, &edited),
            vec![w.workout_exercises[1].id]
        );
        assert!(deleted_exercise_ids(&edited, &w.workout_exercises).is_empty());
    }

    #[test]
    fn test_create_and_fetch_workouts() {
        let mut backend = backend();
        let mut older = workout("u1", &["squat"]);
        older.date = Utc::now() - Duration::days(2);
        let older = backend.create_workout(&older).unwrap();
        let newer = backend.create_workout(&workout("u1", &["bench_press"])).unwrap();
        backend.create_workout(&workout("u2", &["plank"])).unwrap();

        let fetched = backend
            .fetch_workouts_with_exercises("u1", WeightUnit::Kg)
            .unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].id, newer.id);
        assert_eq!(fetched[1].id, older.id);

        let by_id = backend.fetch_workout_by_id(older.id.unwrap()).unwrap();
        assert_eq!(by_id.workout_exercises[0].exercise.id, "squat");
    }

    #[test]
    fn test_fetch_converts_to_unit_preference() {
        let mut backend = backend();
        let mut w = workout("u1", &["squat"]);
        w.workout_exercises[0].sets[0].weight.value = NumericInput::Value(100.0);
        backend.create_workout(&w).unwrap();

        let fetched = backend
            .fetch_workouts_with_exercises("u1", WeightUnit::Lb)
            .unwrap();
        let set = &fetched[0].workout_exercises[0].sets[0];
        assert_eq!(set.weight.unit, WeightUnit::Lb);
        assert_eq!(set.weight.value, NumericInput::Value(220.46));
        assert_eq!(fetched[0].units, WeightUnit::Lb);
    }

    #[test]
    fn test_fetch_converts_stored_volume() {
        let mut backend = backend();
        let mut w = workout("u1", &["squat"]);
        w.workout_exercises[0].sets[0].weight.value = NumericInput::Value(100.0);
        w.workout_exercises[0].sets[0].reps = NumericInput::Value(5.0);
        w.volume = 500.0;
        backend.create_workout(&w).unwrap();

        let fetched = backend
            .fetch_workouts_with_exercises("u1", WeightUnit::Lb)
            .unwrap();
        assert_eq!(fetched[0].volume, 1102.31);

        let same = backend
            .fetch_workouts_with_exercises("u1", WeightUnit::Kg)
            .unwrap();
        assert_eq!(same[0].volume, 500.0);
    }

    #[test]
    fn test_edit_and_delete_workout() {
        let mut backend = backend();
        let created = backend
            .create_workout(&workout("u1", &["squat", "deadlift"]))
            .unwrap();

        let mut edited = created.clone();
        edited.title = "Leg Day".into();
        edited.workout_exercises.remove(0);
        backend.edit_workout(&edited).unwrap();

        let fetched = backend.fetch_workout_by_id(created.id.unwrap()).unwrap();
        assert_eq!(fetched.title, "Leg Day");
        assert_eq!(fetched.workout_exercises.len(), 1);

        backend.delete_workout(created.id.unwrap()).unwrap();
        assert!(backend.fetch_workout_by_id(created.id.unwrap()).is_err());
    }

    #[test]
    fn test_missing_rows_surface_backend_errors() {
        let mut backend = backend();
        let err = backend.fetch_workout_by_id(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::Backend(ref m) if m == "Failed to load workout"));

        let err = backend.delete_routine(Uuid::new_v4()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete routine");

        let unsaved = workout("u1", &["squat"]);
        let err = backend.edit_workout(&unsaved).unwrap_err();
        assert_eq!(err.to_string(), "Failed to update workout");
    }

    #[test]
    fn test_corrupted_collection_is_backend_error() {
        let mut kv = MemoryStore::new();
        kv.set("routines", "not json").unwrap();
        let backend = LocalBackend::new(kv);
        let err = backend.fetch_routines_with_exercises("u1").unwrap_err();
        assert_eq!(err.to_string(), "Failed to load routines");
    }

    #[test]
    fn test_routine_crud() {
        let mut backend = backend();
        let mut store = SessionStore::new();
        store.set_store_mode(StoreMode::Routine);
        store.new_routine("u1", &Preferences::default());
        let mut routine = store.routine().cloned().unwrap();
        routine.title = "Pull".into();

        let created = backend.create_routine(&routine).unwrap();
        assert!(created.id.is_some());

        let mut edited = created.clone();
        edited.title = "Pull A".into();
        backend.edit_routine(&edited).unwrap();

        let all = backend.fetch_routines_with_exercises("u1").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Pull A");
        assert_eq!(
            backend.fetch_routine_by_id(created.id.unwrap()).unwrap().title,
            "Pull A"
        );

        backend.delete_routine(created.id.unwrap()).unwrap();
        assert!(backend.fetch_routines_with_exercises("u1").unwrap().is_empty());
    }

    #[test]
    fn test_reference_data_comes_from_catalog() {
        let data = backend().fetch_reference_data().unwrap();
        assert!(data.find_exercise("bench_press").is_some());
    }
}
