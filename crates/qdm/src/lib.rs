//! Rolling-window empirical quantile delta mapping (QDM) for daily
//! precipitation.
//!
//! This crate bias-corrects model precipitation onto the distribution of a
//! reference dataset, independently per grid cell and calendar month, with
//! model-future quantiles re-estimated over a moving multi-decade window for
//! every target year.
//!
//! # Pipeline
//!
//! 1. **Condition** dry values (`<= 0.05`) with uniform noise in `(0.01, 0.05)`
//! 2. **Estimate** reference, model-historical and windowed model-future
//!    quantiles on a fixed probability grid
//! 3. **Map** future values: `x * M_fo(x) / M_fc(x)`
//! 4. **Floor** corrected values `<= 0.05` back to zero
//!
//! # Glossary
//!
//! - **QDM**: Quantile Delta Mapping; preserves the model's relative change
//!   per quantile while correcting its historical bias
//! - **M_fo / M_fc**: piecewise-linear maps from future quantiles to
//!   reference / historical quantiles
//! - **Window**: years `Y - 19 ..= Y + 19` around target year `Y`
//!
//! # Quick Start
//!
//! ```no_run
//! use pluvio_qdm::{GriddedSeries, QdmConfig, downscale};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! # fn load() -> GriddedSeries { unimplemented!() }
//! let reference = load();
//! let historical = load();
//! let future = load();
//!
//! let config = QdmConfig::new().with_target_years(2019, 2100);
//! let mut rng = StdRng::seed_from_u64(42);
//! let result = downscale(&reference, &historical, &future, &config, &mut rng, |p| {
//!     println!("{} done in {:?}", p.year, p.elapsed);
//! })?;
//! println!("{:?}", result.report().summary());
//! # Ok::<(), pluvio_qdm::QdmError>(())
//! ```

mod condition;
mod config;
mod correct;
mod error;
mod mapping;
mod postprocess;
mod quantile;
mod result;
mod schedule;
mod series;

pub use condition::condition_zeros;
pub use config::{
    DegeneratePolicy, Extrapolation, PlottingPosition, QdmConfig, WindowPolicy, ZeroInflation,
};
pub use correct::{QdmCorrector, correct_sample};
pub use error::QdmError;
pub use mapping::{Mapping, MappingError};
pub use postprocess::floor_to_zero;
pub use quantile::{QuantileVector, probability_levels};
pub use result::{CellIssue, CorrectionReport, IssueKind, IssueSummary, QdmResult, SampleRole};
pub use schedule::{
    WorkUnit, YearProgress, YearWindow, correct_rolling, plan_windows, work_units,
};
pub use series::GriddedSeries;

use pluvio_stats::fraction_at_or_below;
use rand::Rng;
use tracing::debug;

/// Conditions copies of the three inputs, runs [`correct_rolling`] and
/// floors the corrected values at `config.dry_threshold()`.
///
/// Inputs are conditioned in the order reference, historical, future, so a
/// seeded `rng` gives reproducible output.
///
/// # Errors
///
/// Returns [`QdmError`] on invalid configuration or inputs, see
/// [`correct_rolling`].
pub fn downscale<R, F>(
    reference: &GriddedSeries,
    historical: &GriddedSeries,
    future: &GriddedSeries,
    config: &QdmConfig,
    rng: &mut R,
    progress: F,
) -> Result<QdmResult, QdmError>
where
    R: Rng + ?Sized,
    F: FnMut(&YearProgress),
{
    config.validate()?;
    let zero = config.zero_inflation();

    let dry = |s: &GriddedSeries| {
        s.values()
            .as_slice()
            .map_or(f64::NAN, |v| fraction_at_or_below(v, zero.threshold()))
    };
    debug!(
        reference = dry(reference),
        historical = dry(historical),
        future = dry(future),
        "dry fraction before conditioning"
    );

    let mut reference = reference.clone();
    let mut historical = historical.clone();
    let mut future = future.clone();
    let conditioned = [
        reference.condition_zeros(zero, rng),
        historical.condition_zeros(zero, rng),
        future.condition_zeros(zero, rng),
    ];
    debug!(
        reference = conditioned[0],
        historical = conditioned[1],
        future = conditioned[2],
        "conditioned dry values"
    );

    let mut result = correct_rolling(&reference, &historical, &future, config, progress)?;
    let floored = result
        .corrected_mut()
        .floor_to_zero(config.dry_threshold());
    debug!(floored, "floored near-zero values");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn one_cell(values: Vec<f64>, years: Vec<i32>) -> GriddedSeries {
        let months = vec![1u8; years.len()];
        GriddedSeries::from_flat(values, 1, years, months).unwrap()
    }

    #[test]
    fn downscale_rejects_invalid_config() {
        let s = one_cell(vec![1.0, 2.0], vec![2019, 2019]);
        let config = QdmConfig::new().with_nbins(0);
        let mut rng = StdRng::seed_from_u64(0);
        let r = downscale(&s, &s, &s, &config, &mut rng, |_| {});
        assert!(matches!(r, Err(QdmError::InvalidConfig { .. })));
    }

    #[test]
    fn downscale_output_has_no_values_in_dry_band() {
        let values = vec![0.0, 0.0, 0.3, 4.0, 0.0, 7.0];
        let s = one_cell(values, vec![2019; 6]);
        let config = QdmConfig::new().with_target_years(2019, 2019).with_nbins(50);
        let mut rng = StdRng::seed_from_u64(5);
        let result = downscale(&s, &s, &s, &config, &mut rng, |_| {}).unwrap();
        for &v in result.corrected().values() {
            assert!(v == 0.0 || v > 0.05, "value {v} left in the dry band");
        }
    }
}
