//! Flooring of near-zero corrected values.

/// Sets every value `<= threshold` to exactly `0.0`. NaN stays NaN.
///
/// Returns the number of values changed (values already equal to zero are
/// not counted).
pub fn floor_to_zero(values: &mut [f64], threshold: f64) -> usize {
    values
        .iter_mut()
        .map(|v| usize::from(floor_value(v, threshold)))
        .sum()
}

pub(crate) fn floor_value(value: &mut f64, threshold: f64) -> bool {
    if *value <= threshold && *value != 0.0 {
        *value = 0.0;
        true
    } else {
        false
    }
}
