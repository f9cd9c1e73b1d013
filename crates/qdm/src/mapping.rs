//! Piecewise-linear quantile-to-quantile mappings.

use crate::config::Extrapolation;
use crate::error::QdmError;
use crate::quantile::QuantileVector;

/// Error returned by [`Mapping::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MappingError {
    /// The input lies outside the domain and the policy is
    /// [`Extrapolation::Missing`].
    #[error("value {value} is outside the mapping domain [{min}, {max}]")]
    OutOfDomain {
        /// The evaluated value.
        value: f64,
        /// Lower end of the domain.
        min: f64,
        /// Upper end of the domain.
        max: f64,
    },
}

impl From<MappingError> for QdmError {
    fn from(e: MappingError) -> Self {
        match e {
            MappingError::OutOfDomain { value, min, max } => {
                QdmError::OutOfDomain { value, min, max }
            }
        }
    }
}

/// A monotone piecewise-linear function from one quantile vector's support
/// to another's.
///
/// Runs of equal domain knots are collapsed into one knot carrying the mean
/// of their range values, so the function is single-valued and every
/// untied knot is reproduced exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    domain: Vec<f64>,
    range: Vec<f64>,
    extrapolation: Extrapolation,
}

impl Mapping {
    /// Builds the mapping `domain -> range`.
    ///
    /// # Errors
    ///
    /// Returns [`QdmError::KnotMismatch`] if the vectors differ in length.
    pub fn new(
        domain: &QuantileVector,
        range: &QuantileVector,
        extrapolation: Extrapolation,
    ) -> Result<Self, QdmError> {
        Self::from_knots(domain.values(), range.values(), extrapolation)
    }

    /// Builds a mapping from raw knots.
    ///
    /// # Errors
    ///
    /// - [`QdmError::EmptyData`] if there are no knots.
    /// - [`QdmError::KnotMismatch`] if the slices differ in length.
    /// - [`QdmError::UnsortedKnots`] if `domain` decreases anywhere or
    ///   contains NaN.
    pub fn from_knots(
        domain: &[f64],
        range: &[f64],
        extrapolation: Extrapolation,
    ) -> Result<Self, QdmError> {
        if domain.len() != range.len() {
            return Err(QdmError::KnotMismatch {
                domain_len: domain.len(),
                range_len: range.len(),
            });
        }
        if domain.is_empty() {
            return Err(QdmError::EmptyData);
        }
        if let Some(index) = domain.iter().position(|d| d.is_nan()) {
            return Err(QdmError::UnsortedKnots { index });
        }
        if let Some(i) = domain.windows(2).position(|w| w[1] < w[0]) {
            return Err(QdmError::UnsortedKnots { index: i + 1 });
        }

        let mut knots_d = Vec::with_capacity(domain.len());
        let mut knots_r = Vec::with_capacity(range.len());
        let mut start = 0;
        while start < domain.len() {
            let mut end = start + 1;
            while end < domain.len() && domain[end] == domain[start] {
                end += 1;
            }
            let tied = &range[start..end];
            knots_d.push(domain[start]);
            knots_r.push(if tied.len() == 1 {
                tied[0]
            } else {
                tied.iter().sum::<f64>() / tied.len() as f64
            });
            start = end;
        }

        Ok(Self {
            domain: knots_d,
            range: knots_r,
            extrapolation,
        })
    }

    /// Domain knots after tie collapsing.
    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    /// Range knots after tie collapsing.
    pub fn range(&self) -> &[f64] {
        &self.range
    }

    /// The out-of-domain policy.
    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Evaluates the mapping at `x`. NaN maps to NaN.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::OutOfDomain`] for inputs outside the domain
    /// under [`Extrapolation::Missing`].
    pub fn evaluate(&self, x: f64) -> Result<f64, MappingError> {
        if x.is_nan() {
            return Ok(f64::NAN);
        }
        let n = self.domain.len();
        let (lo, hi) = (self.domain[0], self.domain[n - 1]);

        if x < lo || x > hi {
            return match self.extrapolation {
                Extrapolation::Missing => Err(MappingError::OutOfDomain {
                    value: x,
                    min: lo,
                    max: hi,
                }),
                Extrapolation::Clamp => Ok(if x < lo {
                    self.range[0]
                } else {
                    self.range[n - 1]
                }),
                Extrapolation::Linear if n == 1 => Ok(self.range[0]),
                Extrapolation::Linear => Ok(if x < lo {
                    self.segment(0, x)
                } else {
                    self.segment(n - 2, x)
                }),
            };
        }

        // First knot strictly greater than x.
        let j = self.domain.partition_point(|&d| d <= x);
        if j >= n {
            return Ok(self.range[n - 1]);
        }
        Ok(self.segment(j - 1, x))
    }

    /// Linear interpolant (or extension) of segment `[i, i + 1]` at `x`.
    fn segment(&self, i: usize, x: f64) -> f64 {
        let (d0, d1) = (self.domain[i], self.domain[i + 1]);
        let (r0, r1) = (self.range[i], self.range[i + 1]);
        r0 + (x - d0) * (r1 - r0) / (d1 - d0)
    }
}
