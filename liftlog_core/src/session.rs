//! The in-memory session store.
//!
//! A [`SessionStore`] holds three independent aggregate slots: a workout in
//! progress, an existing workout being edited, and a routine being edited.
//! The [`StoreMode`] selects which slot the mode-polymorphic actions target;
//! that selection is made in one place ([`SessionStore::active_mut`]) and
//! handed to the actions as an [`ActiveSessionMut`] that carries its own kind.
//!
//! Slots are only cleared by explicit actions. Switching mode never drops
//! data, so a workout in progress survives a detour into routine editing.

use crate::sets;
use crate::units::convert_set;
use crate::{
    Aggregate, Exercise, ExerciseSet, Intensity, NumericInput, Preferences, Routine, SetType,
    WeightUnit, Workout, WorkoutExercise,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which slot mutation actions apply to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    #[default]
    Workout,
    EditWorkout,
    Routine,
}

/// Read-only view of the slot selected by the current mode
#[derive(Clone, Copy, Debug)]
pub enum ActiveSession<'a> {
    Workout(&'a Workout),
    EditWorkout(&'a Workout),
    Routine(&'a Routine),
}

impl<'a> ActiveSession<'a> {
    pub fn kind(&self) -> StoreMode {
        match self {
            ActiveSession::Workout(_) => StoreMode::Workout,
            ActiveSession::EditWorkout(_) => StoreMode::EditWorkout,
            ActiveSession::Routine(_) => StoreMode::Routine,
        }
    }

    pub fn aggregate(&self) -> &'a dyn Aggregate {
        match *self {
            ActiveSession::Workout(w) | ActiveSession::EditWorkout(w) => w,
            ActiveSession::Routine(r) => r,
        }
    }

    pub fn title(&self) -> &'a str {
        match *self {
            ActiveSession::Workout(w) | ActiveSession::EditWorkout(w) => &w.title,
            ActiveSession::Routine(r) => &r.title,
        }
    }

    pub fn exercises(&self) -> &'a [WorkoutExercise] {
        self.aggregate().exercises()
    }
}

/// Mutable view of the slot selected by the current mode
#[derive(Debug)]
pub enum ActiveSessionMut<'a> {
    Workout(&'a mut Workout),
    EditWorkout(&'a mut Workout),
    Routine(&'a mut Routine),
}

impl<'a> ActiveSessionMut<'a> {
    pub fn kind(&self) -> StoreMode {
        match self {
            ActiveSessionMut::Workout(_) => StoreMode::Workout,
            ActiveSessionMut::EditWorkout(_) => StoreMode::EditWorkout,
            ActiveSessionMut::Routine(_) => StoreMode::Routine,
        }
    }

    pub fn into_aggregate(self) -> &'a mut dyn Aggregate {
        match self {
            ActiveSessionMut::Workout(w) | ActiveSessionMut::EditWorkout(w) => w,
            ActiveSessionMut::Routine(r) => r,
        }
    }
}

/// Application session state, owned by the composition root
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionStore {
    #[serde(default)]
    mode: StoreMode,
    #[serde(default)]
    workout: Option<Workout>,
    #[serde(default)]
    editing_workout: Option<Workout>,
    #[serde(default)]
    routine: Option<Routine>,
    /// Bumped whenever an exercise list changes
    #[serde(default)]
    revision: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    pub fn workout(&self) -> Option<&Workout> {
        self.workout.as_ref()
    }

    pub fn editing_workout(&self) -> Option<&Workout> {
        self.editing_workout.as_ref()
    }

    pub fn routine(&self) -> Option<&Routine> {
        self.routine.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The slot matching the current mode, if it is populated
    pub fn active(&self) -> Option<ActiveSession<'_>> {
        match self.mode {
            StoreMode::Workout => self.workout.as_ref().map(ActiveSession::Workout),
            StoreMode::EditWorkout => self.editing_workout.as_ref().map(ActiveSession::EditWorkout),
            StoreMode::Routine => self.routine.as_ref().map(ActiveSession::Routine),
        }
    }

    pub fn active_mut(&mut self) -> Option<ActiveSessionMut<'_>> {
        match self.mode {
            StoreMode::Workout => self.workout.as_mut().map(ActiveSessionMut::Workout),
            StoreMode::EditWorkout => self
                .editing_workout
                .as_mut()
                .map(ActiveSessionMut::EditWorkout),
            StoreMode::Routine => self.routine.as_mut().map(ActiveSessionMut::Routine),
        }
    }

    pub fn set_store_mode(&mut self, mode: StoreMode) {
        if self.mode != mode {
            tracing::debug!("Store mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    // ------------------------------------------------------------------------
    // Slot lifecycle
    // ------------------------------------------------------------------------

    /// Start a fresh workout in the workout slot. The mode is left alone.
    pub fn new_workout(&mut self, user_id: &str, prefs: &Preferences) -> &Workout {
        let now = Utc::now();
        tracing::info!("Starting new workout for {}", user_id);
        self.revision += 1;
        self.workout.insert(Workout {
            id: None,
            user_id: user_id.to_string(),
            title: format!("Workout {}", now.format("%Y-%m-%d")),
            date: now,
            duration: Some(0),
            sets: 0,
            volume: 0.0,
            units: prefs.weight_unit,
            workout_exercises: Vec::new(),
            description: None,
            routine: None,
        })
    }

    /// Start a blank routine in the routine slot. The mode is left alone.
    pub fn new_routine(&mut self, user_id: &str, prefs: &Preferences) -> &Routine {
        tracing::info!("Starting new routine for {}", user_id);
        self.revision += 1;
        self.routine.insert(Routine {
            id: None,
            user_id: user_id.to_string(),
            title: String::new(),
            date: Utc::now(),
            duration: None,
            sets: 0,
            volume: 0.0,
            units: prefs.weight_unit,
            workout_exercises: Vec::new(),
        })
    }

    pub fn load_routine(&mut self, routine: Routine) {
        tracing::debug!("Loaded routine {:?} for editing", routine.id);
        self.revision += 1;
        self.routine = Some(routine);
    }

    pub fn set_editing_workout(&mut self, workout: Option<Workout>) {
        self.revision += 1;
        self.editing_workout = workout;
    }

    pub fn empty_workout(&mut self) {
        self.revision += 1;
        self.workout = None;
    }

    pub fn empty_routine(&mut self) {
        self.revision += 1;
        self.routine = None;
    }

    /// Start a workout from a routine template and switch to workout mode.
    ///
    /// Exercises are deep copies under fresh ids; the workout keeps a copy of
    /// the routine so changes can later be written back to it.
    pub fn start_workout_from_routine(&mut self, routine: &Routine) -> &Workout {
        tracing::info!(
            "Starting workout from routine {:?} ({})",
            routine.id,
            routine.title
        );
        self.mode = StoreMode::Workout;
        self.revision += 1;
        self.workout.insert(Workout {
            id: None,
            user_id: routine.user_id.clone(),
            title: routine.title.clone(),
            date: Utc::now(),
            duration: Some(0),
            sets: 0,
            volume: 0.0,
            units: routine.units,
            workout_exercises: routine
                .workout_exercises
                .iter()
                .map(WorkoutExercise::duplicate)
                .collect(),
            description: None,
            routine: Some(Box::new(routine.clone())),
        })
    }

    /// Elapsed time of the workout in progress; other slots do not track it
    pub fn update_workout_duration(&mut self, seconds: u32) {
        if let Some(workout) = self.workout.as_mut() {
            workout.duration = Some(seconds);
        }
    }

    // ------------------------------------------------------------------------
    // Exercise-level actions (mode-polymorphic)
    // ------------------------------------------------------------------------

    pub fn set_title(&mut self, title: &str) {
        self.with_active("set title", |agg| agg.set_title(title));
    }

    pub fn add_exercises(&mut self, exercises: &[Exercise], set_interval: Option<u32>) {
        self.with_active("add exercises", |agg| {
            let units = agg.units();
            agg.exercises_mut().extend(
                exercises
                    .iter()
                    .cloned()
                    .map(|e| WorkoutExercise::new(e, units, set_interval)),
            );
        });
    }

    /// Swap the exercise at `index` for a brand-new entry; its sets and
    /// notes are dropped and it rests for `set_interval` like a newly
    /// added exercise.
    pub fn replace_exercise(
        &mut self,
        index: usize,
        exercise: Exercise,
        set_interval: Option<u32>,
    ) {
        self.with_active("replace exercise", |agg| {
            let units = agg.units();
            if let Some(slot) = agg.exercises_mut().get_mut(index) {
                *slot = WorkoutExercise::new(exercise, units, set_interval);
            }
        });
    }

    pub fn delete_exercise(&mut self, index: usize) {
        self.with_active("delete exercise", |agg| {
            let list = agg.exercises_mut();
            if index < list.len() {
                list.remove(index);
            }
        });
    }

    pub fn update_note(&mut self, index: usize, note: &str) {
        self.with_active("update note", |agg| {
            if let Some(exercise) = agg.exercises_mut().get_mut(index) {
                exercise.notes = note.to_string();
            }
        });
    }

    pub fn set_rest_time(&mut self, index: usize, seconds: Option<u32>) {
        self.with_active("set rest time", |agg| {
            if let Some(exercise) = agg.exercises_mut().get_mut(index) {
                exercise.set_interval = seconds;
            }
        });
    }

    /// Replace the exercise list with `ordered`. The caller computes the
    /// new order; it is not checked to be a permutation of the old one.
    pub fn reorder_exercises(&mut self, ordered: Vec<WorkoutExercise>) {
        self.with_active("reorder exercises", |agg| {
            *agg.exercises_mut() = ordered;
        });
    }

    // ------------------------------------------------------------------------
    // Set-level actions (mode-polymorphic, exercise addressed by id)
    // ------------------------------------------------------------------------

    pub fn add_set(&mut self, exercise_id: Uuid) {
        self.update_sets(exercise_id, |current, units| sets::add_set(current, units));
    }

    pub fn delete_set(&mut self, exercise_id: Uuid, index: usize) {
        self.update_sets(exercise_id, |current, _| sets::delete_set(current, index));
    }

    pub fn change_reps(&mut self, exercise_id: Uuid, index: usize, reps: NumericInput) {
        self.update_sets(exercise_id, |current, _| sets::set_reps(current, index, reps));
    }

    pub fn change_weight(&mut self, exercise_id: Uuid, index: usize, weight: NumericInput) {
        self.update_sets(exercise_id, |current, _| sets::set_weight(current, index, weight));
    }

    pub fn change_set_type(&mut self, exercise_id: Uuid, index: usize, set_type: SetType) {
        self.update_sets(exercise_id, |current, _| sets::set_type(current, index, set_type));
    }

    pub fn toggle_set_completion(&mut self, exercise_id: Uuid, index: usize) {
        self.update_sets(exercise_id, |current, _| sets::toggle_completion(current, index));
    }

    pub fn set_intensity(&mut self, exercise_id: Uuid, index: usize, intensity: Option<Intensity>) {
        self.update_sets(exercise_id, |current, _| {
            sets::set_intensity(current, index, intensity)
        });
    }

    // ------------------------------------------------------------------------
    // Bulk conversion
    // ------------------------------------------------------------------------

    /// Rewrite every set of the active slot into the user's preferred units.
    ///
    /// Weights convert from each set's own stored unit. Intensities convert
    /// only between RPE and RIR; sets on (or targeting) the `none` scale
    /// keep their value. Blank weights stay blank.
    pub fn convert_all_units(&mut self, prefs: &Preferences) {
        self.with_active("convert units", |agg| {
            for exercise in agg.exercises_mut().iter_mut() {
                for set in exercise.sets.iter_mut() {
                    convert_set(set, prefs);
                }
            }
            agg.set_units(prefs.weight_unit);
        });
    }

    fn with_active<F>(&mut self, action: &str, f: F)
    where
        F: FnOnce(&mut dyn Aggregate),
    {
        let mode = self.mode;
        match self.active_mut() {
            Some(active) => {
                f(active.into_aggregate());
                self.revision += 1;
                tracing::debug!("Applied '{}' to {:?} slot", action, mode);
            }
            None => {
                tracing::debug!("Ignoring '{}': {:?} slot is empty", action, mode);
            }
        }
    }

    fn update_sets<F>(&mut self, exercise_id: Uuid, f: F)
    where
        F: FnOnce(&[ExerciseSet], WeightUnit) -> Vec<ExerciseSet>,
    {
        self.with_active("update sets", |agg| {
            let units = agg.units();
            match agg.find_exercise_mut(exercise_id) {
                Some(exercise) => exercise.sets = f(&exercise.sets, units),
                None => tracing::debug!("No exercise {} in active slot", exercise_id),
            }
        });
    }
}

/// Move the exercise at `from` to position `to`, returning the new order.
///
/// Out-of-range positions return the list unchanged.
pub fn moved(exercises: &[WorkoutExercise], from: usize, to: usize) -> Vec<WorkoutExercise> {
    let mut next = exercises.to_vec();
    if from < next.len() && to < next.len() {
        let item = next.remove(from);
        next.insert(to, item);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IntensityScale, Weight};

    fn exercise(id: &str) -> Exercise {
        Exercise {
            id: id.into(),
            name: id.replace('_', " "),
            category: "legs".into(),
            equipment: "barbell".into(),
            muscles: vec![],
        }
    }

    fn prefs() -> Preferences {
        Preferences::default()
    }

    fn store_with_workout() -> SessionStore {
        let mut store = SessionStore::new();
        store.new_workout("u1", &prefs());
        store.add_exercises(&[exercise("squat"), exercise("deadlift")], Some(120));
        store
    }

    fn first_exercise_id(store: &SessionStore) -> Uuid {
        store.active().unwrap().exercises()[0].id
    }

    fn sample_routine() -> Routine {
        let mut store = SessionStore::new();
        store.set_store_mode(StoreMode::Routine);
        store.new_routine("u1", &prefs());
        store.add_exercises(&[exercise("bench_press")], Some(90));
        let id = first_exercise_id(&store);
        store.add_set(id);
        store.change_weight(id, 0, NumericInput::Value(60.0));
        let mut routine = store.routine().unwrap().clone();
        routine.id = Some(Uuid::new_v4());
        routine.title = "Push Day".into();
        routine
    }

    #[test]
    fn test_new_workout() {
        crate::logging::init_test();
        let mut store = SessionStore::new();
        let workout = store.new_workout("u1", &prefs());
        assert_eq!(workout.user_id, "u1");
        assert!(workout.workout_exercises.is_empty());
        assert_eq!(workout.sets, 0);
        assert_eq!(workout.volume, 0.0);
        assert!(workout.title.contains(&Utc::now().format("%Y-%m-%d").to_string()));
        assert_eq!(store.mode(), StoreMode::Workout);
    }

    #[test]
    fn test_new_workout_does_not_change_mode() {
        let mut store = SessionStore::new();
        store.set_store_mode(StoreMode::Routine);
        store.new_workout("u1", &prefs());
        assert_eq!(store.mode(), StoreMode::Routine);
        assert!(store.active().is_none());
    }

    #[test]
    fn test_add_exercise_then_add_set() {
        let mut store = SessionStore::new();
        store.new_workout("u1", &prefs());
        store.add_exercises(&[exercise("squat")], None);
        let id = first_exercise_id(&store);
        store.add_set(id);

        let sets = &store.workout().unwrap().workout_exercises[0].sets;
        assert_eq!(sets.len(), 2);
        assert_eq!(
            sets.iter().map(|s| s.number).collect::<Vec<_>>(),
            vec![Some(1), Some(2)]
        );
    }

    #[test]
    fn test_mutations_only_touch_active_slot() {
        let mut store = store_with_workout();
        store.set_store_mode(StoreMode::Routine);
        store.new_routine("u1", &prefs());
        let workout_before = store.workout().cloned();
        let routine_before = store.routine().cloned();

        store.set_store_mode(StoreMode::EditWorkout);
        store.set_editing_workout(Some(store.workout().unwrap().clone()));
        store.add_exercises(&[exercise("lunge")], None);
        store.delete_exercise(0);
        let id = first_exercise_id(&store);
        store.toggle_set_completion(id, 0);

        assert_eq!(store.workout().cloned(), workout_before);
        assert_eq!(store.routine().cloned(), routine_before);
        let editing = store.editing_workout().unwrap();
        assert_eq!(editing.workout_exercises.len(), 2);
        assert!(editing.workout_exercises[0].sets[0].completed);
    }

    #[test]
    fn test_actions_on_empty_slot_are_noops() {
        let mut store = SessionStore::new();
        let revision = store.revision();
        store.add_exercises(&[exercise("squat")], None);
        store.delete_exercise(0);
        store.add_set(Uuid::new_v4());
        assert!(store.workout().is_none());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_replace_exercise_discards_sets_and_notes() {
        let mut store = store_with_workout();
        let id = first_exercise_id(&store);
        store.add_set(id);
        store.update_note(0, "knees out");
        store.set_rest_time(0, Some(60));
        store.replace_exercise(0, exercise("front_squat"), Some(120));

        let replaced = &store.workout().unwrap().workout_exercises[0];
        assert_ne!(replaced.id, id);
        assert_eq!(replaced.exercise.id, "front_squat");
        assert_eq!(replaced.sets.len(), 1);
        assert!(replaced.notes.is_empty());
        assert_eq!(replaced.set_interval, Some(120));
    }

    #[test]
    fn test_index_actions_ignore_stale_indices() {
        let mut store = store_with_workout();
        let before = store.workout().cloned();
        store.delete_exercise(5);
        store.update_note(5, "nope");
        store.set_rest_time(5, Some(30));
        store.replace_exercise(5, exercise("row"), None);
        assert_eq!(store.workout().cloned(), before);
    }

    #[test]
    fn test_note_and_rest_time() {
        let mut store = store_with_workout();
        store.update_note(1, "use straps");
        store.set_rest_time(1, Some(180));
        let ex = &store.workout().unwrap().workout_exercises[1];
        assert_eq!(ex.notes, "use straps");
        assert_eq!(ex.set_interval, Some(180));
    }

    #[test]
    fn test_reorder_replaces_list() {
        let mut store = store_with_workout();
        let list = store.workout().unwrap().workout_exercises.clone();
        store.reorder_exercises(moved(&list, 0, 1));
        let names: Vec<_> = store
            .workout()
            .unwrap()
            .workout_exercises
            .iter()
            .map(|e| e.exercise.id.as_str())
            .collect();
        assert_eq!(names, vec!["deadlift", "squat"]);
    }

    #[test]
    fn test_set_level_actions() {
        let mut store = store_with_workout();
        let id = first_exercise_id(&store);
        store.add_set(id);
        store.change_reps(id, 0, NumericInput::Value(5.0));
        store.change_weight(id, 0, NumericInput::Value(100.0));
        store.change_set_type(id, 0, SetType::WarmUp);
        store.set_intensity(
            id,
            1,
            Some(Intensity {
                scale: IntensityScale::Rpe,
                value: 9.0,
            }),
        );
        store.delete_set(id, 5);

        let sets = &store.workout().unwrap().workout_exercises[0].sets;
        assert_eq!(sets[0].reps, NumericInput::Value(5.0));
        assert_eq!(sets[0].weight.value, NumericInput::Value(100.0));
        assert_eq!(sets[0].number, None);
        assert_eq!(sets[1].number, Some(1));
        assert_eq!(sets[1].intensity.map(|i| i.value), Some(9.0));
    }

    #[test]
    fn test_unknown_exercise_id_is_noop() {
        let mut store = store_with_workout();
        let before = store.workout().cloned();
        store.add_set(Uuid::new_v4());
        assert_eq!(store.workout().cloned(), before);
    }

    #[test]
    fn test_set_title_targets_active_slot() {
        let mut store = store_with_workout();
        store.new_routine("u1", &prefs());
        store.set_store_mode(StoreMode::Routine);
        store.set_title("Legs A");
        assert_eq!(store.routine().unwrap().title, "Legs A");
        assert_ne!(store.workout().unwrap().title, "Legs A");
        assert_eq!(store.active().unwrap().title(), "Legs A");
        assert_eq!(store.active().unwrap().kind(), StoreMode::Routine);
    }

    #[test]
    fn test_update_duration_only_touches_workout() {
        let mut store = store_with_workout();
        store.set_store_mode(StoreMode::Routine);
        store.new_routine("u1", &prefs());
        store.update_workout_duration(600);
        assert_eq!(store.workout().unwrap().duration, Some(600));
        assert_eq!(store.routine().unwrap().duration, None);
    }

    #[test]
    fn test_convert_all_units() {
        let mut store = store_with_workout();
        let id = first_exercise_id(&store);
        store.add_set(id);
        store.change_weight(id, 0, NumericInput::Value(100.0));
        store.set_intensity(
            id,
            0,
            Some(Intensity {
                scale: IntensityScale::Rpe,
                value: 8.0,
            }),
        );
        store.set_intensity(
            id,
            1,
            Some(Intensity {
                scale: IntensityScale::None,
                value: 3.0,
            }),
        );

        let imperial = Preferences {
            weight_unit: WeightUnit::Lb,
            intensity_scale: IntensityScale::Rir,
            default_rest_seconds: None,
        };
        store.convert_all_units(&imperial);

        let workout = store.workout().unwrap();
        assert_eq!(workout.units, WeightUnit::Lb);
        let sets = &workout.workout_exercises[0].sets;
        assert_eq!(
            sets[0].weight,
            Weight {
                value: NumericInput::Value(220.46),
                unit: WeightUnit::Lb
            }
        );
        assert_eq!(
            sets[0].intensity,
            Some(Intensity {
                scale: IntensityScale::Rir,
                value: 2.0
            })
        );
        // Blank weight stays blank, none-scale intensity untouched
        assert_eq!(sets[1].weight.value, NumericInput::Empty);
        assert_eq!(sets[1].weight.unit, WeightUnit::Lb);
        assert_eq!(sets[1].intensity.map(|i| i.scale), Some(IntensityScale::None));
    }

    #[test]
    fn test_convert_uses_each_sets_own_unit() {
        let mut store = store_with_workout();
        let id = first_exercise_id(&store);
        store.change_weight(id, 0, NumericInput::Value(225.0));
        if let Some(ActiveSessionMut::Workout(w)) = store.active_mut() {
            w.workout_exercises[0].sets[0].weight.unit = WeightUnit::Lb;
        }
        store.convert_all_units(&prefs());
        let set = &store.workout().unwrap().workout_exercises[0].sets[0];
        assert_eq!(set.weight.unit, WeightUnit::Kg);
        assert_eq!(set.weight.value, NumericInput::Value(102.06));
    }

    #[test]
    fn test_start_workout_from_routine() {
        let routine = sample_routine();
        let mut store = SessionStore::new();
        store.set_store_mode(StoreMode::Routine);
        store.load_routine(routine.clone());

        let workout = store.start_workout_from_routine(&routine).clone();
        assert_eq!(store.mode(), StoreMode::Workout);
        assert_eq!(workout.routine.as_ref().and_then(|r| r.id), routine.id);
        assert_eq!(workout.title, "Push Day");
        assert_eq!(workout.workout_exercises.len(), 1);
        assert_ne!(workout.workout_exercises[0].id, routine.workout_exercises[0].id);
        assert_eq!(workout.workout_exercises[0].sets, routine.workout_exercises[0].sets);

        let id = workout.workout_exercises[0].id;
        store.change_weight(id, 0, NumericInput::Value(999.0));
        store.toggle_set_completion(id, 0);
        assert_eq!(
            store.routine().unwrap().workout_exercises[0].sets[0].weight.value,
            NumericInput::Value(60.0)
        );
        assert_eq!(routine.workout_exercises[0].sets[0].weight.value, NumericInput::Value(60.0));
        assert!(!store.routine().unwrap().workout_exercises[0].sets[0].completed);
    }

    #[test]
    fn test_empty_slots() {
        let mut store = store_with_workout();
        store.new_routine("u1", &prefs());
        store.set_editing_workout(Some(store.workout().unwrap().clone()));

        store.empty_workout();
        assert!(store.workout().is_none());
        assert!(store.routine().is_some());

        store.empty_routine();
        store.set_editing_workout(None);
        assert!(store.routine().is_none());
        assert!(store.editing_workout().is_none());
    }

    #[test]
    fn test_revision_bumps_on_change() {
        let mut store = store_with_workout();
        let before = store.revision();
        let id = first_exercise_id(&store);
        store.toggle_set_completion(id, 0);
        assert!(store.revision() > before);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let store = store_with_workout();
        let json = serde_json::to_string(&store).unwrap();
        let restored: SessionStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, store);
    }
}
