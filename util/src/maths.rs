//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Saturate a value to the range `[min, max]`.
///
/// Returns the value and a flag which is `true` if the value had to be
/// limited. A `NaN` value is passed through unchanged and unflagged.
pub fn saturate<T>(value: T, min: T, max: T) -> (T, bool)
where
    T: Float
{
    if value > max {
        (max, true)
    }
    else if value < min {
        (min, true)
    }
    else {
        (value, false)
    }
}

/// Fold an angle in degrees into the range (-180, 180].
///
/// Only a single wrap of 360 degrees is applied, so the result is only
/// guaranteed to be in range for inputs in (-540, 540]. Larger inputs come
/// back still out of range.
pub fn norm_angle_deg<T>(value: T) -> T
where
    T: Float
{
    let half_turn = T::from(180.0).unwrap_or_else(T::max_value);
    let full_turn = half_turn + half_turn;

    let mut value = value;

    if value > half_turn {
        value = value - full_turn;
    }
    if value < -half_turn {
        value = value + full_turn;
    }

    value
}
