//! The quantile delta mapping formula.

use pluvio_stats::sorted_finite;

use crate::config::{DegeneratePolicy, QdmConfig};
use crate::error::QdmError;
use crate::mapping::Mapping;
use crate::quantile::{QuantileVector, probability_levels};
use crate::result::{IssueKind, SampleRole};

/// Applies `x * M_fo(x) / M_fc(x)` for one (cell, month, window).
///
/// `M_fo` maps model-future quantiles onto reference quantiles and `M_fc`
/// maps model-future quantiles onto model-historical quantiles. The ratio
/// carries the model's projected relative change onto the reference
/// distribution.
#[derive(Debug, Clone)]
pub struct QdmCorrector {
    to_reference: Mapping,
    to_historical: Mapping,
    min_denominator: f64,
    degenerate_policy: DegeneratePolicy,
}

impl QdmCorrector {
    /// Builds both mappings from the three quantile vectors.
    ///
    /// # Errors
    ///
    /// Returns [`QdmError::KnotMismatch`] if the vectors differ in length.
    pub fn new(
        reference: &QuantileVector,
        historical: &QuantileVector,
        future: &QuantileVector,
        config: &QdmConfig,
    ) -> Result<Self, QdmError> {
        Ok(Self {
            to_reference: Mapping::new(future, reference, config.extrapolation())?,
            to_historical: Mapping::new(future, historical, config.extrapolation())?,
            min_denominator: config.min_denominator(),
            degenerate_policy: config.degenerate_policy(),
        })
    }

    /// Corrects one value.
    ///
    /// Returns the corrected value together with the issue it raised, if
    /// any. NaN input gives NaN without an issue. Out-of-domain input gives
    /// NaN with [`IssueKind::OutOfDomain`]. A historical mapping smaller than
    /// the denominator guard raises [`IssueKind::DegenerateRatio`] and gives
    /// NaN or a floored-denominator ratio depending on the policy.
    pub fn correct(&self, x: f64) -> (f64, Option<IssueKind>) {
        if x.is_nan() {
            return (f64::NAN, None);
        }
        let (Ok(fo), Ok(fc)) = (self.to_reference.evaluate(x), self.to_historical.evaluate(x))
        else {
            return (f64::NAN, Some(IssueKind::OutOfDomain));
        };
        if fc.abs() < self.min_denominator {
            let value = match self.degenerate_policy {
                DegeneratePolicy::MarkMissing => f64::NAN,
                DegeneratePolicy::FloorDenominator => x * fo / self.min_denominator,
            };
            return (value, Some(IssueKind::DegenerateRatio));
        }
        (x * fo / fc, None)
    }
}

/// Returns an error if a sorted sample is too small for estimation.
pub(crate) fn check_sample(
    sorted: &[f64],
    role: SampleRole,
    config: &QdmConfig,
) -> Result<(), QdmError> {
    if sorted.len() < config.min_samples() {
        return Err(QdmError::InsufficientData {
            role,
            valid: sorted.len(),
            required: config.min_samples(),
        });
    }
    Ok(())
}

/// Corrects a whole model-future sample against one reference and one
/// model-historical sample.
///
/// This is a single (cell, month, window) step of the rolling scheduler.
/// Inputs should already be conditioned. Values that raise an issue come
/// back as NaN (or, under [`DegeneratePolicy::FloorDenominator`], as the
/// floored ratio).
///
/// # Errors
///
/// - [`QdmError::InvalidConfig`] if `config` is invalid.
/// - [`QdmError::InsufficientData`] if any sample has fewer than
///   `config.min_samples()` finite values.
///
/// # Example
///
/// ```
/// use pluvio_qdm::{QdmConfig, correct_sample};
///
/// let reference = [2.0, 4.0, 6.0, 8.0];
/// let historical = [1.0, 2.0, 3.0, 4.0];
/// let future = [1.5, 2.5, 3.5];
/// let config = QdmConfig::new().with_nbins(20);
/// let corrected = correct_sample(&reference, &historical, &future, &config).unwrap();
/// assert!((corrected[1] - 5.0).abs() < 1e-9);
/// ```
pub fn correct_sample(
    reference: &[f64],
    historical: &[f64],
    future: &[f64],
    config: &QdmConfig,
) -> Result<Vec<f64>, QdmError> {
    config.validate()?;
    let levels = probability_levels(config.nbins());
    let position = config.plotting_position();

    let mut vectors = Vec::with_capacity(3);
    for (sample, role) in [
        (reference, SampleRole::Reference),
        (historical, SampleRole::Historical),
        (future, SampleRole::Future),
    ] {
        let sorted = sorted_finite(sample);
        check_sample(&sorted, role, config)?;
        vectors.push(QuantileVector::from_sorted(&sorted, &levels, position)?);
    }

    let corrector = QdmCorrector::new(&vectors[0], &vectors[1], &vectors[2], config)?;
    Ok(future.iter().map(|&x| corrector.correct(x).0).collect())
}
