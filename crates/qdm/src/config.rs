//! Configuration for rolling-window quantile delta mapping.

use crate::error::QdmError;

/// Largest accepted `half_window`, in years.
pub const MAX_HALF_WINDOW: i32 = 1000;

/// Smallest accepted width of the zero-inflation noise interval.
pub const MIN_NOISE_WIDTH: f64 = 1e-9;

/// Plotting-position convention used by the quantile estimator.
///
/// Each preset is a pair `(alphap, betap)` of the Hyndman & Fan continuous
/// quantile family.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlottingPosition {
    /// `(0.4, 0.4)`: approximately quantile-unbiased.
    #[default]
    Cunnane,
    /// `(0, 0)`: `p(k) = k / (n + 1)`.
    Weibull,
    /// `(0.5, 0.5)`: piecewise linear with knots at `(k - 0.5) / n`.
    Hazen,
    /// `(1, 1)`: R's default (type 7).
    Linear,
    /// `(1/3, 1/3)`: approximately median-unbiased.
    MedianUnbiased,
    /// Arbitrary parameters.
    Custom {
        /// Plotting-position parameter alpha.
        alphap: f64,
        /// Plotting-position parameter beta.
        betap: f64,
    },
}

impl PlottingPosition {
    /// Returns `(alphap, betap)`.
    pub fn parameters(self) -> (f64, f64) {
        match self {
            Self::Cunnane => (0.4, 0.4),
            Self::Weibull => (0.0, 0.0),
            Self::Hazen => (0.5, 0.5),
            Self::Linear => (1.0, 1.0),
            Self::MedianUnbiased => (1.0 / 3.0, 1.0 / 3.0),
            Self::Custom { alphap, betap } => (alphap, betap),
        }
    }
}

/// What a mapping returns for inputs outside its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolation {
    /// The value is missing (NaN in gridded output).
    Missing,
    /// Nearest endpoint value.
    #[default]
    Clamp,
    /// Extend the slope of the nearest segment.
    Linear,
}

/// What the corrector does when the historical mapping is close to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Emit NaN.
    #[default]
    MarkMissing,
    /// Divide by the minimum denominator instead.
    FloorDenominator,
}

/// How windows are formed for target years near the ends of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPolicy {
    /// Intersect the nominal window with the record.
    #[default]
    Truncate,
    /// Slide the window so it keeps its full length inside the record.
    Shift,
    /// Skip target years whose nominal window leaves the record.
    Exclude,
}

/// Replacement of dry values by small uniform noise.
///
/// Values `<= threshold` are redrawn from the open interval
/// `(low, threshold)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroInflation {
    threshold: f64,
    low: f64,
}

impl ZeroInflation {
    /// Creates the default conditioner: `threshold = 0.05`, `low = 0.01`.
    pub fn new() -> Self {
        Self {
            threshold: 0.05,
            low: 0.01,
        }
    }

    /// Sets the dry threshold.
    pub fn with_threshold(mut self, v: f64) -> Self {
        self.threshold = v;
        self
    }

    /// Sets the lower end of the noise interval.
    pub fn with_low(mut self, v: f64) -> Self {
        self.low = v;
        self
    }

    /// Returns the dry threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the lower end of the noise interval.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Checks that both bounds are finite, `low >= 0`, and the interval
    /// `(low, threshold)` is at least [`MIN_NOISE_WIDTH`] wide.
    pub fn validate(&self) -> Result<(), QdmError> {
        if !self.threshold.is_finite() || !self.low.is_finite() {
            return Err(QdmError::InvalidConfig {
                reason: format!(
                    "zero-inflation bounds must be finite, got low={} threshold={}",
                    self.low, self.threshold
                ),
            });
        }
        if self.low < 0.0 || self.threshold - self.low < MIN_NOISE_WIDTH {
            return Err(QdmError::InvalidConfig {
                reason: format!(
                    "zero-inflation requires 0 <= low and threshold - low >= {MIN_NOISE_WIDTH}, got low={} threshold={}",
                    self.low, self.threshold
                ),
            });
        }
        Ok(())
    }
}

impl Default for ZeroInflation {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for quantile estimation, mapping, correction and scheduling.
///
/// # Example
///
/// ```
/// use pluvio_qdm::{QdmConfig, WindowPolicy};
///
/// let config = QdmConfig::new()
///     .with_target_years(2030, 2060)
///     .with_window_policy(WindowPolicy::Shift);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct QdmConfig {
    nbins: usize,
    plotting_position: PlottingPosition,
    min_samples: usize,
    extrapolation: Extrapolation,
    min_denominator: f64,
    degenerate_policy: DegeneratePolicy,
    half_window: i32,
    window_policy: WindowPolicy,
    first_target: i32,
    last_target: i32,
    zero_inflation: ZeroInflation,
    dry_threshold: f64,
}

impl QdmConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `nbins = 1000`, `plotting_position = Cunnane`,
    /// `min_samples = 2`, `extrapolation = Clamp`, `min_denominator = 1e-6`,
    /// `degenerate_policy = MarkMissing`, `half_window = 19`,
    /// `window_policy = Truncate`, target years `2019..=2100`,
    /// `zero_inflation = ZeroInflation::new()`, `dry_threshold = 0.05`.
    pub fn new() -> Self {
        Self {
            nbins: 1000,
            plotting_position: PlottingPosition::Cunnane,
            min_samples: 2,
            extrapolation: Extrapolation::Clamp,
            min_denominator: 1e-6,
            degenerate_policy: DegeneratePolicy::MarkMissing,
            half_window: 19,
            window_policy: WindowPolicy::Truncate,
            first_target: 2019,
            last_target: 2100,
            zero_inflation: ZeroInflation::new(),
            dry_threshold: 0.05,
        }
    }

    // --- Builder methods ---

    /// Sets the number of quantile bins.
    pub fn with_nbins(mut self, n: usize) -> Self {
        self.nbins = n;
        self
    }

    /// Sets the plotting-position convention.
    pub fn with_plotting_position(mut self, p: PlottingPosition) -> Self {
        self.plotting_position = p;
        self
    }

    /// Sets the minimum number of valid values per sample.
    pub fn with_min_samples(mut self, n: usize) -> Self {
        self.min_samples = n;
        self
    }

    /// Sets the out-of-domain policy.
    pub fn with_extrapolation(mut self, e: Extrapolation) -> Self {
        self.extrapolation = e;
        self
    }

    /// Sets the denominator guard.
    pub fn with_min_denominator(mut self, v: f64) -> Self {
        self.min_denominator = v;
        self
    }

    /// Sets the degenerate-ratio policy.
    pub fn with_degenerate_policy(mut self, p: DegeneratePolicy) -> Self {
        self.degenerate_policy = p;
        self
    }

    /// Sets the window half width in years.
    pub fn with_half_window(mut self, years: i32) -> Self {
        self.half_window = years;
        self
    }

    /// Sets the window boundary policy.
    pub fn with_window_policy(mut self, p: WindowPolicy) -> Self {
        self.window_policy = p;
        self
    }

    /// Sets the inclusive range of target years.
    pub fn with_target_years(mut self, first: i32, last: i32) -> Self {
        self.first_target = first;
        self.last_target = last;
        self
    }

    /// Sets the zero-inflation conditioner.
    pub fn with_zero_inflation(mut self, z: ZeroInflation) -> Self {
        self.zero_inflation = z;
        self
    }

    /// Sets the post-processing dry threshold.
    pub fn with_dry_threshold(mut self, v: f64) -> Self {
        self.dry_threshold = v;
        self
    }

    // --- Accessors ---

    /// Returns the number of quantile bins.
    pub fn nbins(&self) -> usize {
        self.nbins
    }

    /// Returns the plotting-position convention.
    pub fn plotting_position(&self) -> PlottingPosition {
        self.plotting_position
    }

    /// Returns the minimum number of valid values per sample.
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Returns the out-of-domain policy.
    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Returns the denominator guard.
    pub fn min_denominator(&self) -> f64 {
        self.min_denominator
    }

    /// Returns the degenerate-ratio policy.
    pub fn degenerate_policy(&self) -> DegeneratePolicy {
        self.degenerate_policy
    }

    /// Returns the window half width in years.
    pub fn half_window(&self) -> i32 {
        self.half_window
    }

    /// Returns the window boundary policy.
    pub fn window_policy(&self) -> WindowPolicy {
        self.window_policy
    }

    /// Returns the first target year.
    pub fn first_target(&self) -> i32 {
        self.first_target
    }

    /// Returns the last target year.
    pub fn last_target(&self) -> i32 {
        self.last_target
    }

    /// Returns the zero-inflation conditioner.
    pub fn zero_inflation(&self) -> &ZeroInflation {
        &self.zero_inflation
    }

    /// Returns the post-processing dry threshold.
    pub fn dry_threshold(&self) -> f64 {
        self.dry_threshold
    }

    /// Validates this configuration.
    ///
    /// Checks that `nbins` and `min_samples` are at least 1, the plotting
    /// position parameters lie in `[0, 1]`, `min_denominator` is finite and
    /// positive, `half_window` is in `0..=MAX_HALF_WINDOW`, the target range is not
    /// reversed, `dry_threshold` is finite and non-negative, and the
    /// zero-inflation bounds are valid.
    pub fn validate(&self) -> Result<(), QdmError> {
        if self.nbins < 1 {
            return Err(QdmError::InvalidConfig {
                reason: "nbins must be >= 1".to_string(),
            });
        }

        let (alphap, betap) = self.plotting_position.parameters();
        if !(0.0..=1.0).contains(&alphap) || !(0.0..=1.0).contains(&betap) {
            return Err(QdmError::InvalidConfig {
                reason: format!(
                    "plotting position parameters must be in [0, 1], got alphap={alphap} betap={betap}"
                ),
            });
        }

        if self.min_samples < 1 {
            return Err(QdmError::InvalidConfig {
                reason: "min_samples must be >= 1".to_string(),
            });
        }

        if !self.min_denominator.is_finite() || self.min_denominator <= 0.0 {
            return Err(QdmError::InvalidConfig {
                reason: format!(
                    "min_denominator must be finite and > 0, got {}",
                    self.min_denominator
                ),
            });
        }

        if !(0..=MAX_HALF_WINDOW).contains(&self.half_window) {
            return Err(QdmError::InvalidConfig {
                reason: format!(
                    "half_window must be in 0..={MAX_HALF_WINDOW}, got {}",
                    self.half_window
                ),
            });
        }

        if self.first_target > self.last_target {
            return Err(QdmError::InvalidConfig {
                reason: format!(
                    "first target year {} is after last target year {}",
                    self.first_target, self.last_target
                ),
            });
        }

        if !self.dry_threshold.is_finite() || self.dry_threshold < 0.0 {
            return Err(QdmError::InvalidConfig {
                reason: format!(
                    "dry_threshold must be finite and >= 0, got {}",
                    self.dry_threshold
                ),
            });
        }

        self.zero_inflation.validate()
    }
}

impl Default for QdmConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = QdmConfig::new();
        assert_eq!(cfg.nbins(), 1000);
        assert_eq!(cfg.plotting_position(), PlottingPosition::Cunnane);
        assert_eq!(cfg.min_samples(), 2);
        assert_eq!(cfg.extrapolation(), Extrapolation::Clamp);
        assert!((cfg.min_denominator() - 1e-6).abs() < f64::EPSILON);
        assert_eq!(cfg.degenerate_policy(), DegeneratePolicy::MarkMissing);
        assert_eq!(cfg.half_window(), 19);
        assert_eq!(cfg.window_policy(), WindowPolicy::Truncate);
        assert_eq!((cfg.first_target(), cfg.last_target()), (2019, 2100));
        assert!((cfg.zero_inflation().threshold() - 0.05).abs() < f64::EPSILON);
        assert!((cfg.zero_inflation().low() - 0.01).abs() < f64::EPSILON);
        assert!((cfg.dry_threshold() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn builder_chaining() {
        let cfg = QdmConfig::new()
            .with_nbins(50)
            .with_plotting_position(PlottingPosition::Hazen)
            .with_min_samples(5)
            .with_extrapolation(Extrapolation::Linear)
            .with_min_denominator(1e-3)
            .with_degenerate_policy(DegeneratePolicy::FloorDenominator)
            .with_half_window(10)
            .with_window_policy(WindowPolicy::Exclude)
            .with_target_years(2030, 2040)
            .with_zero_inflation(ZeroInflation::new().with_threshold(0.1).with_low(0.02))
            .with_dry_threshold(0.1);

        assert_eq!(cfg.nbins(), 50);
        assert_eq!(cfg.plotting_position(), PlottingPosition::Hazen);
        assert_eq!(cfg.min_samples(), 5);
        assert_eq!(cfg.extrapolation(), Extrapolation::Linear);
        assert_eq!(cfg.degenerate_policy(), DegeneratePolicy::FloorDenominator);
        assert_eq!(cfg.half_window(), 10);
        assert_eq!(cfg.window_policy(), WindowPolicy::Exclude);
        assert_eq!((cfg.first_target(), cfg.last_target()), (2030, 2040));
        assert!((cfg.zero_inflation().low() - 0.02).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn plotting_position_parameters() {
        assert_eq!(PlottingPosition::Cunnane.parameters(), (0.4, 0.4));
        assert_eq!(PlottingPosition::Weibull.parameters(), (0.0, 0.0));
        assert_eq!(PlottingPosition::Linear.parameters(), (1.0, 1.0));
        let custom = PlottingPosition::Custom {
            alphap: 0.3,
            betap: 0.2,
        };
        assert_eq!(custom.parameters(), (0.3, 0.2));
    }

    #[test]
    fn validate_ok() {
        assert!(QdmConfig::new().validate().is_ok());
    }

    #[test]
    fn validate_zero_nbins() {
        assert!(QdmConfig::new().with_nbins(0).validate().is_err());
    }

    #[test]
    fn validate_bad_plotting_position() {
        let p = PlottingPosition::Custom {
            alphap: 1.5,
            betap: 0.4,
        };
        assert!(
            QdmConfig::new()
                .with_plotting_position(p)
                .validate()
                .is_err()
        );
        let p = PlottingPosition::Custom {
            alphap: f64::NAN,
            betap: 0.4,
        };
        assert!(
            QdmConfig::new()
                .with_plotting_position(p)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn validate_bad_denominator() {
        assert!(QdmConfig::new().with_min_denominator(0.0).validate().is_err());
        assert!(
            QdmConfig::new()
                .with_min_denominator(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn validate_reversed_targets() {
        let result = QdmConfig::new().with_target_years(2050, 2040).validate();
        assert!(matches!(result, Err(QdmError::InvalidConfig { .. })));
    }

    #[test]
    fn validate_negative_half_window() {
        assert!(QdmConfig::new().with_half_window(-1).validate().is_err());
    }

    #[test]
    fn validate_huge_half_window() {
        assert!(QdmConfig::new().with_half_window(MAX_HALF_WINDOW).validate().is_ok());
        for h in [MAX_HALF_WINDOW + 1, i32::MAX] {
            let result = QdmConfig::new().with_half_window(h).validate();
            assert!(matches!(result, Err(QdmError::InvalidConfig { .. })));
        }
    }

    #[test]
    fn validate_zero_inflation_bounds() {
        let z = ZeroInflation::new().with_low(0.05);
        assert!(QdmConfig::new().with_zero_inflation(z).validate().is_err());
        let z = ZeroInflation::new().with_low(-0.01);
        assert!(z.validate().is_err());
        let z = ZeroInflation::new().with_threshold(f64::INFINITY);
        assert!(z.validate().is_err());
    }

    #[test]
    fn validate_rejects_collapsed_noise_interval() {
        let low = 0.01_f64;
        let z = ZeroInflation::new().with_low(low).with_threshold(low.next_up());
        assert!(matches!(z.validate(), Err(QdmError::InvalidConfig { .. })));
        let z = ZeroInflation::new().with_low(low).with_threshold(low + 1e-6);
        assert!(z.validate().is_ok());
    }

    #[test]
    fn default_trait() {
        assert_eq!(QdmConfig::default().nbins(), QdmConfig::new().nbins());
        assert_eq!(ZeroInflation::default(), ZeroInflation::new());
    }
}
