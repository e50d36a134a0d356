//! Checked numeric conversions used by time resolution and plotting

use crate::{Error, Result};

/// Truncate a non-negative float to a `usize` index
///
/// # Errors
///
/// Returns an error if the value is negative, not finite or larger than `usize::MAX`
#[allow(clippy::cast_possible_truncation)] // Truncation after bounds check is intended
#[allow(clippy::cast_sign_loss)] // Sign checked above
#[allow(clippy::cast_precision_loss)] // MAX bound is approximate
pub fn f64_to_usize_floor(value: f64) -> Result<usize> {
    if value.is_finite() && value >= 0.0 && value < usize::MAX as f64 {
        Ok(value.floor() as usize)
    } else {
        Err(Error::InvalidInput(format!(
            "Value {value} cannot be used as a frame index"
        )))
    }
}

/// Convert a frame count to `f64` for time computations
#[must_use]
#[allow(clippy::cast_precision_loss)] // Frame counts stay far below 2^52
pub fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Clamp and convert f64 to f32 for pixel coordinates
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures the value fits
pub fn f64_to_f32_clamp(value: f64, min: f32, max: f32) -> f32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    (value.clamp(f64::from(min), f64::from(max)) as f32).clamp(min, max)
}

/// Round to the nearest `i32`, saturating at the type bounds; NaN maps to 0
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamped to the i32 range first
pub fn f64_to_i32_saturating(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}
