//! Empirical quantile estimation on a fixed probability grid.

use pluvio_stats::{plotting_position_quantile, sorted_finite};

use crate::config::PlottingPosition;
use crate::error::QdmError;

/// Probability levels `p_i = (i - 0.5) / nbins` for `i = 0..=nbins + 1`.
///
/// The grid has `nbins + 2` points; its two ends overshoot `[0, 1]` by half
/// a bin so the first and last quantiles are the sample extremes.
///
/// # Example
///
/// ```
/// let p = pluvio_qdm::probability_levels(4);
/// assert_eq!(p, vec![-0.125, 0.125, 0.375, 0.625, 0.875, 1.125]);
/// ```
pub fn probability_levels(nbins: usize) -> Vec<f64> {
    let n = nbins as f64;
    (0..nbins + 2).map(|i| (i as f64 - 0.5) / n).collect()
}

/// Sample quantiles at a fixed set of probability levels. Non-decreasing.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileVector {
    values: Vec<f64>,
}

impl QuantileVector {
    /// Estimates quantiles of `sample` at `levels`. NaN values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`QdmError::EmptyData`] if `sample` has no finite values or
    /// `levels` is empty.
    pub fn estimate(
        sample: &[f64],
        levels: &[f64],
        position: PlottingPosition,
    ) -> Result<Self, QdmError> {
        Self::from_sorted(&sorted_finite(sample), levels, position)
    }

    /// As [`estimate`](Self::estimate), for a sample already sorted ascending
    /// and free of NaN.
    pub fn from_sorted(
        sorted: &[f64],
        levels: &[f64],
        position: PlottingPosition,
    ) -> Result<Self, QdmError> {
        if sorted.is_empty() || levels.is_empty() {
            return Err(QdmError::EmptyData);
        }
        let (alphap, betap) = position.parameters();
        let values = levels
            .iter()
            .map(|&p| plotting_position_quantile(sorted, p, alphap, betap))
            .collect();
        Ok(Self { values })
    }

    /// The quantile values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false` for a successfully estimated vector.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Lowest quantile.
    pub fn min(&self) -> f64 {
        self.values[0]
    }

    /// Highest quantile.
    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }
}
