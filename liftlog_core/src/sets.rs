//! Set list transformations.
//!
//! Every function takes an exercise's current sets and returns a new list.
//! An index past the end of the list leaves the sets unchanged, so a stale
//! index coming from the UI is a no-op rather than an error.

use crate::{ExerciseSet, Intensity, NumericInput, SetType, WeightUnit};

/// Assign dense 1-based ordinals to `Normal` and `Failure` sets, in order.
/// Other set types never carry a number.
pub fn renumber(sets: &[ExerciseSet]) -> Vec<ExerciseSet> {
    let mut next = 0;
    sets.iter()
        .map(|set| {
            let mut set = set.clone();
            if set.set_type.is_numbered() {
                next += 1;
                set.number = Some(next);
            } else {
                set.number = None;
            }
            set
        })
        .collect()
}

/// Append a blank normal set recorded in `unit`
pub fn add_set(sets: &[ExerciseSet], unit: WeightUnit) -> Vec<ExerciseSet> {
    let id = sets.iter().map(|s| s.id).max().map_or(1, |max| max + 1);
    let mut next = sets.to_vec();
    next.push(ExerciseSet::new(id, unit));
    renumber(&next)
}

pub fn delete_set(sets: &[ExerciseSet], index: usize) -> Vec<ExerciseSet> {
    if index >= sets.len() {
        return sets.to_vec();
    }
    let mut next = sets.to_vec();
    next.remove(index);
    renumber(&next)
}

pub fn set_reps(sets: &[ExerciseSet], index: usize, reps: NumericInput) -> Vec<ExerciseSet> {
    update_at(sets, index, |set| set.reps = reps)
}

/// Replace the weight value; the set keeps the unit it was recorded in
pub fn set_weight(sets: &[ExerciseSet], index: usize, weight: NumericInput) -> Vec<ExerciseSet> {
    update_at(sets, index, |set| set.weight.value = weight)
}

/// Record or clear a set's intensity. A non-finite value counts as no
/// input and clears it.
pub fn set_intensity(
    sets: &[ExerciseSet],
    index: usize,
    intensity: Option<Intensity>,
) -> Vec<ExerciseSet> {
    let intensity = intensity.filter(|i| i.value.is_finite());
    update_at(sets, index, |set| set.intensity = intensity)
}

/// Change a set's type. Moving a set in or out of the numbered types
/// shifts the ordinals of every later numbered set.
pub fn set_type(sets: &[ExerciseSet], index: usize, set_type: SetType) -> Vec<ExerciseSet> {
    update_at(sets, index, |set| set.set_type = set_type)
}

/// Flip a set's completion.
///
/// Marking a set done turns blank reps and weight into zero so the set
/// reads as a real (if empty) entry; un-completing leaves fields alone.
pub fn toggle_completion(sets: &[ExerciseSet], index: usize) -> Vec<ExerciseSet> {
    update_at(sets, index, |set| {
        set.completed = !set.completed;
        if set.completed {
            if set.reps.is_empty() {
                set.reps = NumericInput::Value(0.0);
            }
            if set.weight.value.is_empty() {
                set.weight.value = NumericInput::Value(0.0);
            }
        }
    })
}

fn update_at<F>(sets: &[ExerciseSet], index: usize, f: F) -> Vec<ExerciseSet>
where
    F: FnOnce(&mut ExerciseSet),
{
    if index >= sets.len() {
        tracing::debug!("Ignoring set update at stale index {}", index);
        return sets.to_vec();
    }
    let mut next = sets.to_vec();
    f(&mut next[index]);
    renumber(&next)
}
