//! Numeric conversion helpers centralizing the counter-to-float casts used by summaries.

use num_traits::cast::cast;

/// Convert a u64 counter to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Fraction `part / whole`, returning 0.0 when `whole` is zero.
#[must_use]
pub fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    count_to_f64(part) / count_to_f64(whole)
}

/// Percentage `part / whole * 100`, returning 0.0 when `whole` is zero.
#[must_use]
pub fn percentage(part: u64, whole: u64) -> f64 {
    ratio(part, whole) * 100.0
}

/// Clamp a probability into [0, 1], mapping non-finite values to 0.0.
#[must_use]
pub fn sanitize_probability(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
