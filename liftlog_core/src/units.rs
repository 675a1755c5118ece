//! Weight unit and intensity scale conversions.
//!
//! All functions are pure. Out-of-range input is clamped or zeroed,
//! never rejected.

use crate::{ExerciseSet, Intensity, IntensityScale, NumericInput, Preferences, WeightUnit};

/// Pounds per kilogram
pub const LB_PER_KG: f64 = 2.2046226218;

/// Upper bound of the RPE/RIR effort axis
pub const MAX_EFFORT: f64 = 10.0;

/// Convert a weight between unit systems.
///
/// NaN (the numeric form of an empty field) converts as zero.
pub fn convert_weight(value: f64, from: WeightUnit, to: WeightUnit) -> f64 {
    let value = if value.is_nan() { 0.0 } else { value };

    match (from, to) {
        (WeightUnit::Kg, WeightUnit::Lb) => value * LB_PER_KG,
        (WeightUnit::Lb, WeightUnit::Kg) => value / LB_PER_KG,
        _ => value,
    }
}

/// Convert an intensity value between RPE and RIR.
///
/// `RIR = 10 - RPE` and `RPE = 10 - RIR`, clamped to `[0, 10]`.
/// Returns `None` when either scale is [`IntensityScale::None`], which has
/// no numeric axis to convert to or from.
pub fn convert_intensity(value: f64, from: IntensityScale, to: IntensityScale) -> Option<f64> {
    let clamped = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_EFFORT)
    };

    match (from, to) {
        (IntensityScale::None, _) | (_, IntensityScale::None) => None,
        (IntensityScale::Rpe, IntensityScale::Rir) | (IntensityScale::Rir, IntensityScale::Rpe) => {
            Some(MAX_EFFORT - clamped)
        }
        _ => Some(clamped),
    }
}

/// Round to two decimal places for storage after a conversion
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rewrite a set's weight in `unit`, converting from the set's own unit.
/// Blank weights stay blank.
pub fn convert_set_weight(set: &mut ExerciseSet, unit: WeightUnit) {
    if let Some(value) = set.weight.value.value() {
        let converted = convert_weight(value, set.weight.unit, unit);
        set.weight.value = NumericInput::Value(round2(converted));
    }
    set.weight.unit = unit;
}

/// Rewrite a set into the preferred weight unit and intensity scale.
///
/// Intensities on (or targeting) the `none` scale are left untouched.
pub fn convert_set(set: &mut ExerciseSet, prefs: &Preferences) {
    convert_set_weight(set, prefs.weight_unit);

    if let Some(intensity) = set.intensity {
        if let Some(value) =
            convert_intensity(intensity.value, intensity.scale, prefs.intensity_scale)
        {
            set.intensity = Some(Intensity {
                scale: prefs.intensity_scale,
                value,
            });
        }
    }
}
