//! Multi-step flows that tie the session store to the backend:
//! finishing a workout, saving routines and edits, loading aggregates
//! into their slots.
//!
//! Validation problems are reported through the [`Notifier`] and returned
//! as [`Error::Validation`] before the backend is touched. Backend errors are
//! returned untouched; the caller decides how to show them.

use crate::backend::Backend;
use crate::catalog::ReferenceData;
use crate::metrics::{count_sets, exercise_volume};
use crate::notify::Notifier;
use crate::persist::{KeyValueStore, SessionPersister};
use crate::units::round2;
use crate::{Error, Result, Routine, SessionStore, StoreMode, Workout, WorkoutExercise};
use uuid::Uuid;

fn reject(notifier: &dyn Notifier, message: &str) -> Error {
    notifier.notify_error(message);
    Error::Validation(message.to_string())
}

fn validate(
    title: &str,
    exercises: &[WorkoutExercise],
    what: &str,
    notifier: &dyn Notifier,
) -> Result<()> {
    if title.trim().is_empty() {
        return Err(reject(notifier, &format!("{} title is required", what)));
    }
    if exercises.is_empty() {
        return Err(reject(notifier, "Add at least one exercise"));
    }
    Ok(())
}

/// Stamp completed-set count and completed volume onto a workout
fn stamp_workout(workout: &mut Workout) {
    workout.sets = count_sets(&workout.workout_exercises).done;
    workout.volume = round2(exercise_volume(&workout.workout_exercises, false));
}

/// Stamp planned-set count and planned volume onto a routine
fn stamp_routine(routine: &mut Routine) {
    routine.sets = count_sets(&routine.workout_exercises).total;
    routine.volume = round2(exercise_volume(&routine.workout_exercises, true));
}

/// Save the workout in progress and clear its slot.
pub fn finish_workout<B: Backend + ?Sized>(
    store: &mut SessionStore,
    backend: &mut B,
    notifier: &dyn Notifier,
) -> Result<Workout> {
    let Some(workout) = store.workout() else {
        return Err(reject(notifier, "No workout in progress"));
    };
    validate(&workout.title, &workout.workout_exercises, "Workout", notifier)?;

    let mut record = workout.clone();
    stamp_workout(&mut record);

    let created = backend.create_workout(&record)?;
    tracing::info!(
        "Finished workout {:?}: {} sets, volume {}",
        created.id,
        created.sets,
        created.volume
    );
    notifier.notify_success("Workout saved");
    store.empty_workout();
    Ok(created)
}

/// Create or update the routine being edited and clear its slot.
pub fn save_routine<B: Backend + ?Sized>(
    store: &mut SessionStore,
    backend: &mut B,
    notifier: &dyn Notifier,
) -> Result<Routine> {
    let Some(routine) = store.routine() else {
        return Err(reject(notifier, "No routine being edited"));
    };
    validate(&routine.title, &routine.workout_exercises, "Routine", notifier)?;

    let mut record = routine.clone();
    stamp_routine(&mut record);

    let saved = if record.id.is_some() {
        let saved = backend.edit_routine(&record)?;
        notifier.notify_success("Routine updated");
        saved
    } else {
        let saved = backend.create_routine(&record)?;
        notifier.notify_success("Routine created");
        saved
    };

    store.empty_routine();
    if store.mode() == StoreMode::Routine {
        store.set_store_mode(StoreMode::Workout);
    }
    Ok(saved)
}

/// Save changes to a previously finished workout and clear the edit slot.
pub fn save_edited_workout<B: Backend + ?Sized>(
    store: &mut SessionStore,
    backend: &mut B,
    notifier: &dyn Notifier,
) -> Result<Workout> {
    let Some(workout) = store.editing_workout() else {
        return Err(reject(notifier, "No workout being edited"));
    };
    validate(&workout.title, &workout.workout_exercises, "Workout", notifier)?;

    let mut record = workout.clone();
    stamp_workout(&mut record);

    let saved = backend.edit_workout(&record)?;
    notifier.notify_success("Workout updated");
    store.set_editing_workout(None);
    if store.mode() == StoreMode::EditWorkout {
        store.set_store_mode(StoreMode::Workout);
    }
    Ok(saved)
}

/// Write a workout's exercises and sets back into the routine it was
/// started from. Sets are stored as planned (not completed).
pub fn update_routine_from_workout<B: Backend + ?Sized>(
    workout: &Workout,
    backend: &mut B,
    notifier: &dyn Notifier,
) -> Result<Routine> {
    let Some(base) = workout.routine.as_deref() else {
        return Err(reject(notifier, "Workout was not started from a routine"));
    };

    let mut routine = base.clone();
    routine.units = workout.units;
    routine.workout_exercises = workout
        .workout_exercises
        .iter()
        .map(|exercise| {
            let mut planned = exercise.clone();
            for set in planned.sets.iter_mut() {
                set.completed = false;
            }
            planned
        })
        .collect();
    stamp_routine(&mut routine);

    let saved = backend.edit_routine(&routine)?;
    notifier.notify_success("Routine updated");
    Ok(saved)
}

/// Load a saved workout into the edit slot and switch to edit mode
pub fn start_editing_workout<B: Backend + ?Sized>(
    store: &mut SessionStore,
    backend: &B,
    id: Uuid,
) -> Result<()> {
    let workout = backend.fetch_workout_by_id(id)?;
    store.set_editing_workout(Some(workout));
    store.set_store_mode(StoreMode::EditWorkout);
    Ok(())
}

/// Load a saved routine into the routine slot and switch to routine mode
pub fn open_routine<B: Backend + ?Sized>(
    store: &mut SessionStore,
    backend: &B,
    id: Uuid,
) -> Result<()> {
    let routine = backend.fetch_routine_by_id(id)?;
    store.load_routine(routine);
    store.set_store_mode(StoreMode::Routine);
    Ok(())
}

/// Start a workout from a saved routine
pub fn start_routine_workout<B: Backend + ?Sized>(
    store: &mut SessionStore,
    backend: &B,
    id: Uuid,
) -> Result<()> {
    let routine = backend.fetch_routine_by_id(id)?;
    store.start_workout_from_routine(&routine);
    Ok(())
}

pub fn delete_workout<B: Backend + ?Sized>(
    backend: &mut B,
    notifier: &dyn Notifier,
    id: Uuid,
) -> Result<()> {
    backend.delete_workout(id)?;
    notifier.notify_success("Workout deleted");
    Ok(())
}

pub fn delete_routine<B: Backend + ?Sized>(
    backend: &mut B,
    notifier: &dyn Notifier,
    id: Uuid,
) -> Result<()> {
    backend.delete_routine(id)?;
    notifier.notify_success("Routine deleted");
    Ok(())
}

/// Reference data from the cache, refetched from the backend when the
/// cache is missing or outdated
pub fn reference_data<S: KeyValueStore, B: Backend + ?Sized>(
    persister: &mut SessionPersister<S>,
    backend: &B,
) -> Result<ReferenceData> {
    if let Some(cached) = persister.load_reference() {
        return Ok(cached);
    }

    tracing::info!("Refetching reference data");
    let data = backend.fetch_reference_data()?;
    if let Err(e) = persister.save_reference(&data) {
        tracing::warn!("Failed to cache reference data: {}", e);
    }
    Ok(data)
}
