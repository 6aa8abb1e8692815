//! Range helpers shared by the playback state machine.

/// Wraps `value` into `[min, max]` by whole multiples of `size`.
///
/// Converges for any input, including values many spans out of range.
/// A non-positive `size` degrades to [`clamp`].
///
/// ```rust
/// use spinview_core::wrap;
///
/// assert_eq!(wrap(-1, 0, 24, 25), 24);
/// assert_eq!(wrap(30, 0, 24, 25), 5);
/// ```
#[inline]
pub fn wrap(value: i64, min: i64, max: i64, size: i64) -> i64 {
    if size <= 0 {
        return clamp(value, min, max);
    }
    let offset = (value as i128 - min as i128).rem_euclid(size as i128);
    i64::try_from(min as i128 + offset).unwrap_or(max)
}

/// Saturates `value` into `[min, max]`.
///
/// Unlike [`Ord::clamp`] this never panics; with `min > max` the result is `max`.
#[inline]
pub fn clamp(value: i64, min: i64, max: i64) -> i64 {
    value.max(min).min(max)
}

/// Replaces NaN and infinities with zero.
#[inline]
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
