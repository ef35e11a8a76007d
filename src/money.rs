//! Currency precision helpers shared by the summary adapter and the
//! settlement engine.

/// Amounts whose magnitude is at or below this are treated as settled.
pub const EPSILON: f64 = 0.009;

/// Round to currency precision (two decimals, half away from zero).
///
/// Non-finite values collapse to zero. Values too large to scale by 100
/// are returned unchanged; they have no cent digits left to round.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / 100.0;
    // Avoid printing "-0.00"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// True if `value` is within [`EPSILON`] of zero.
pub fn is_negligible(value: f64) -> bool {
    value.abs() <= EPSILON
}
