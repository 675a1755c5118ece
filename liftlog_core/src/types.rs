//! Core domain types for the LiftLog system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Numeric user input with a first-class "not entered yet" state
//! - Weight units and intensity scales
//! - Sets, exercises and the workout/routine aggregates
//! - User preferences that drive display units

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Numeric Input
// ============================================================================

/// A weight or rep count as typed by the user.
///
/// `Empty` means nothing has been entered yet and is distinct from zero.
/// Serialized as `""` when empty and as a JSON number otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum NumericInput {
    #[default]
    Empty,
    Value(f64),
}

impl NumericInput {
    /// Parse raw text from an input field.
    ///
    /// Accepts `,` as a decimal separator. Anything that is not a finite
    /// number becomes `Empty`; malformed input is never an error.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return NumericInput::Empty;
        }

        match trimmed.replace(',', ".").parse::<f64>() {
            Ok(value) if value.is_finite() => NumericInput::Value(value),
            _ => NumericInput::Empty,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            NumericInput::Value(v) if !v.is_nan() => Some(v),
            _ => None,
        }
    }

    /// The numeric value, reading `Empty` (and NaN) as zero.
    pub fn or_zero(self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    pub fn is_empty(self) -> bool {
        matches!(self, NumericInput::Empty)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Value(value)
    }
}

impl fmt::Display for NumericInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericInput::Empty => Ok(()),
            NumericInput::Value(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for NumericInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            NumericInput::Empty => serializer.serialize_str(""),
            NumericInput::Value(v) => serializer.serialize_f64(*v),
        }
    }
}

impl<'de> Deserialize<'de> for NumericInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(v) => NumericInput::Value(v),
            Raw::Text(s) => NumericInput::parse(&s),
        })
    }
}

// ============================================================================
// Units and Intensity
// ============================================================================

/// Unit system for weights
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Kg => write!(f, "kg"),
            WeightUnit::Lb => write!(f, "lb"),
        }
    }
}

impl FromStr for WeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "metric" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "imperial" => Ok(WeightUnit::Lb),
            other => Err(Error::Validation(format!("Unknown weight unit: {}", other))),
        }
    }
}

/// Scale used to record subjective set intensity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntensityScale {
    None,
    #[default]
    Rpe,
    Rir,
}

impl fmt::Display for IntensityScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntensityScale::None => write!(f, "none"),
            IntensityScale::Rpe => write!(f, "RPE"),
            IntensityScale::Rir => write!(f, "RIR"),
        }
    }
}

impl FromStr for IntensityScale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(IntensityScale::None),
            "rpe" => Ok(IntensityScale::Rpe),
            "rir" => Ok(IntensityScale::Rir),
            other => Err(Error::Validation(format!("Unknown intensity scale: {}", other))),
        }
    }
}

/// Intensity recorded for a single set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Intensity {
    pub scale: IntensityScale,
    pub value: f64,
}

// ============================================================================
// Sets
// ============================================================================

/// Kind of set; only `Normal` and `Failure` sets are numbered
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SetType {
    #[default]
    Normal,
    WarmUp,
    Failure,
    Drop,
    RestPause,
}

impl SetType {
    /// Whether sets of this type receive a display ordinal
    pub fn is_numbered(self) -> bool {
        matches!(self, SetType::Normal | SetType::Failure)
    }

    /// Short label used in set tables
    pub fn label(self) -> &'static str {
        match self {
            SetType::Normal => "N",
            SetType::WarmUp => "W",
            SetType::Failure => "F",
            SetType::Drop => "D",
            SetType::RestPause => "RP",
        }
    }
}

impl FromStr for SetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "normal" | "n" => Ok(SetType::Normal),
            "warm_up" | "warmup" | "w" => Ok(SetType::WarmUp),
            "failure" | "f" => Ok(SetType::Failure),
            "drop" | "d" => Ok(SetType::Drop),
            "rest_pause" | "restpause" | "rp" => Ok(SetType::RestPause),
            other => Err(Error::Validation(format!("Unknown set type: {}", other))),
        }
    }
}

/// Weight entered for a set, in the unit it was recorded in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Weight {
    pub value: NumericInput,
    pub unit: WeightUnit,
}

/// One performed (or planned) set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSet {
    /// Unique within the owning exercise
    pub id: u32,
    pub weight: Weight,
    pub reps: NumericInput,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Intensity>,
    #[serde(rename = "type", default)]
    pub set_type: SetType,
    /// Display ordinal, present only on numbered set types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

impl ExerciseSet {
    /// A blank normal set recorded in `unit`
    pub fn new(id: u32, unit: WeightUnit) -> Self {
        Self {
            id,
            weight: Weight {
                value: NumericInput::Empty,
                unit,
            },
            reps: NumericInput::Empty,
            completed: false,
            intensity: None,
            set_type: SetType::Normal,
            number: None,
        }
    }
}

// ============================================================================
// Exercises and Aggregates
// ============================================================================

/// Reference exercise row (read-only from the session's point of view)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: String,
    pub equipment: String,
    #[serde(default)]
    pub muscles: Vec<String>,
}

/// An exercise placed inside a workout or routine, with its sets
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub exercise: Exercise,
    pub sets: Vec<ExerciseSet>,
    /// Rest between sets, in seconds
    pub set_interval: Option<u32>,
    #[serde(default)]
    pub notes: String,
}

impl WorkoutExercise {
    /// Wrap `exercise` with a fresh id and exactly one default set
    pub fn new(exercise: Exercise, unit: WeightUnit, set_interval: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise,
            sets: crate::sets::add_set(&[], unit),
            set_interval,
            notes: String::new(),
        }
    }

    /// Copy this exercise under a fresh id, keeping its sets
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}

/// Shared surface of workouts and routines used by the mutation engine
pub trait Aggregate {
    fn exercises(&self) -> &[WorkoutExercise];
    fn exercises_mut(&mut self) -> &mut Vec<WorkoutExercise>;
    fn units(&self) -> WeightUnit;
    fn set_units(&mut self, units: WeightUnit);
    fn set_title(&mut self, title: &str);

    fn find_exercise_mut(&mut self, exercise_id: Uuid) -> Option<&mut WorkoutExercise> {
        self.exercises_mut().iter_mut().find(|e| e.id == exercise_id)
    }
}

/// One concrete training session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: Option<Uuid>,
    pub user_id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    /// Elapsed time in seconds
    pub duration: Option<u32>,
    pub sets: u32,
    pub volume: f64,
    pub units: WeightUnit,
    pub workout_exercises: Vec<WorkoutExercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Routine this workout was started from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routine: Option<Box<Routine>>,
}

/// A reusable workout template
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Routine {
    pub id: Option<Uuid>,
    pub user_id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub duration: Option<u32>,
    pub sets: u32,
    pub volume: f64,
    pub units: WeightUnit,
    pub workout_exercises: Vec<WorkoutExercise>,
}

impl Aggregate for Workout {
    fn exercises(&self) -> &[WorkoutExercise] {
        &self.workout_exercises
    }

    fn exercises_mut(&mut self) -> &mut Vec<WorkoutExercise> {
        &mut self.workout_exercises
    }

    fn units(&self) -> WeightUnit {
        self.units
    }

    fn set_units(&mut self, units: WeightUnit) {
        self.units = units;
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }
}

impl Aggregate for Routine {
    fn exercises(&self) -> &[WorkoutExercise] {
        &self.workout_exercises
    }

    fn exercises_mut(&mut self) -> &mut Vec<WorkoutExercise> {
        &mut self.workout_exercises
    }

    fn units(&self) -> WeightUnit {
        self.units
    }

    fn set_units(&mut self, units: WeightUnit) {
        self.units = units;
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// Display preferences of the current user
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub intensity_scale: IntensityScale,
    /// Rest interval applied to newly added exercises
    #[serde(default)]
    pub default_rest_seconds: Option<u32>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            weight_unit: WeightUnit::Kg,
            intensity_scale: IntensityScale::Rpe,
            default_rest_seconds: None,
        }
    }
}
