//! Zero-inflation conditioning.
//!
//! Quantile estimation on samples with a point mass at zero produces long
//! flat runs in the quantile vector, which make both mappings ill-posed at
//! the dry end. Dry values are therefore replaced with tiny random noise
//! before estimation and floored back to zero afterwards.

use rand::Rng;

use crate::config::ZeroInflation;

/// Replaces every value `<= zero.threshold()` with an independent draw from
/// the open interval `(zero.low(), zero.threshold())`.
///
/// NaN values are left untouched. Returns the number of replaced values.
///
/// # Example
///
/// ```
/// use pluvio_qdm::{ZeroInflation, condition_zeros};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut values = vec![0.0, 3.2, 0.0];
/// let mut rng = StdRng::seed_from_u64(7);
/// let n = condition_zeros(&mut values, &ZeroInflation::new(), &mut rng);
/// assert_eq!(n, 2);
/// assert!(values.iter().all(|&v| v > 0.0));
/// ```
pub fn condition_zeros<R: Rng + ?Sized>(
    values: &mut [f64],
    zero: &ZeroInflation,
    rng: &mut R,
) -> usize {
    values
        .iter_mut()
        .map(|v| usize::from(condition_value(v, zero, rng)))
        .sum()
}

/// Conditions a single value in place. Returns `true` if it was replaced.
pub(crate) fn condition_value<R: Rng + ?Sized>(
    value: &mut f64,
    zero: &ZeroInflation,
    rng: &mut R,
) -> bool {
    if *value <= zero.threshold() {
        *value = draw_open(zero.low(), zero.threshold(), rng);
        true
    } else {
        false
    }
}

/// Redraws allowed before [`draw_open`] gives up on excluding `low`.
const MAX_REDRAWS: usize = 64;

/// Uniform draw from `(low, high)`; `random_range` includes `low`.
///
/// An interval too narrow to hold a float strictly inside it yields the
/// midpoint after [`MAX_REDRAWS`] attempts; [`ZeroInflation::validate`]
/// rejects such bounds.
fn draw_open<R: Rng + ?Sized>(low: f64, high: f64, rng: &mut R) -> f64 {
    for _ in 0..MAX_REDRAWS {
        let x = rng.random_range(low..high);
        if x > low {
            return x;
        }
    }
    low + (high - low) / 2.0
}
