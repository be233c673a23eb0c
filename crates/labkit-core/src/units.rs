//! Length rounding and clamping helpers
//!
//! Every coordinate in LabKit is a length in meters stored as `f64`.
//! Stored values are rounded to the millimeter so that persisted plans
//! do not accumulate floating point noise across edits.

/// Round `value` to the nearest multiple of `step`, midpoints away from zero.
///
/// A non-positive step returns the value unchanged.
pub fn round_to(value: f64, step: f64) -> f64 {
    if step <= 0.0 || !step.is_finite() {
        return value;
    }
    (value / step).round() * step
}

/// Round a length to the millimeter.
pub fn round_mm(value: f64) -> f64 {
    // Divide instead of multiplying by 0.001 so 1.002 stays 1.002.
    (value * 1000.0).round() / 1000.0
}

/// Snap a length to the grid.
pub fn snap_value(value: f64, grid_step: f64) -> f64 {
    round_to(value, grid_step)
}

/// Clamp `value` into `[min, max]`.
///
/// Unlike [`f64::clamp`] this never panics: when `min > max` the lower bound
/// wins, which pins oversized shapes to the origin side of their container.
pub fn clamp_between(min: f64, max: f64, value: f64) -> f64 {
    min.max(max.min(value))
}

/// Approximate equality within `tolerance`.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
