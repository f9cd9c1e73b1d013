//! Pure conversion functions: TOML config structs -> crate API config types,
//! and NetCDF grid files -> correction-engine series.

use anyhow::{Context, Result, bail};

use crate::config::*;

use pluvio_io::{GridFile, ReaderConfig, UnitConversion, WriterConfig};
use pluvio_qdm::{
    DegeneratePolicy, Extrapolation, GriddedSeries, PlottingPosition, QdmConfig, WindowPolicy,
    ZeroInflation,
};

/// Parses a window edge policy name into the corresponding enum variant.
pub fn parse_window_policy(s: &str) -> Result<WindowPolicy> {
    match s.to_lowercase().as_str() {
        "truncate" => Ok(WindowPolicy::Truncate),
        "shift" => Ok(WindowPolicy::Shift),
        "exclude" => Ok(WindowPolicy::Exclude),
        other => bail!("unknown window policy: {other:?}"),
    }
}

/// Parses an extrapolation policy name into the corresponding enum variant.
pub fn parse_extrapolation(s: &str) -> Result<Extrapolation> {
    match s.to_lowercase().as_str() {
        "missing" => Ok(Extrapolation::Missing),
        "clamp" => Ok(Extrapolation::Clamp),
        "linear" => Ok(Extrapolation::Linear),
        other => bail!("unknown extrapolation: {other:?}"),
    }
}

/// Parses a degenerate-ratio policy name into the corresponding enum variant.
pub fn parse_degenerate(s: &str) -> Result<DegeneratePolicy> {
    match s.to_lowercase().as_str() {
        "mark_missing" => Ok(DegeneratePolicy::MarkMissing),
        "floor_denominator" => Ok(DegeneratePolicy::FloorDenominator),
        other => bail!("unknown degenerate policy: {other:?}"),
    }
}

/// Parses a plotting-position name.
///
/// `"custom"` requires both `alphap` and `betap`; the named positions
/// reject them.
pub fn parse_plotting_position(
    s: &str,
    alphap: Option<f64>,
    betap: Option<f64>,
) -> Result<PlottingPosition> {
    let named = match s.to_lowercase().as_str() {
        "custom" => {
            return match (alphap, betap) {
                (Some(alphap), Some(betap)) => Ok(PlottingPosition::Custom { alphap, betap }),
                _ => bail!("plotting_position = \"custom\" needs both alphap and betap"),
            };
        }
        "cunnane" => PlottingPosition::Cunnane,
        "weibull" => PlottingPosition::Weibull,
        "hazen" => PlottingPosition::Hazen,
        "linear" => PlottingPosition::Linear,
        "median_unbiased" => PlottingPosition::MedianUnbiased,
        other => bail!("unknown plotting position: {other:?}"),
    };
    if alphap.is_some() || betap.is_some() {
        bail!("alphap/betap are only used with plotting_position = \"custom\"");
    }
    Ok(named)
}

/// Parses a unit mode (`"auto"` or `"none"`); an explicit factor wins.
pub fn parse_unit_conversion(mode: &str, factor: Option<f64>) -> Result<UnitConversion> {
    if let Some(f) = factor {
        return Ok(UnitConversion::Factor(f));
    }
    match mode.to_lowercase().as_str() {
        "auto" => Ok(UnitConversion::Auto),
        "none" => Ok(UnitConversion::None),
        other => bail!("unknown unit conversion: {other:?}"),
    }
}

/// Builds and validates a [`QdmConfig`] from the TOML sections.
pub fn build_qdm_config(config: &PluvioConfig) -> Result<QdmConfig> {
    let q = &config.qdm;
    let w = &config.window;
    let z = &config.zero;

    let cfg = QdmConfig::new()
        .with_nbins(q.nbins)
        .with_plotting_position(parse_plotting_position(
            &q.plotting_position,
            q.alphap,
            q.betap,
        )?)
        .with_min_samples(q.min_samples)
        .with_extrapolation(parse_extrapolation(&q.extrapolation)?)
        .with_min_denominator(q.min_denominator)
        .with_degenerate_policy(parse_degenerate(&q.degenerate)?)
        .with_half_window(w.half_window)
        .with_window_policy(parse_window_policy(&w.policy)?)
        .with_target_years(w.first_target, w.last_target)
        .with_zero_inflation(
            ZeroInflation::new()
                .with_threshold(z.threshold)
                .with_low(z.low),
        )
        .with_dry_threshold(z.dry_threshold);
    cfg.validate().context("invalid [qdm]/[window]/[zero] configuration")?;

    if w.future_start > w.future_end {
        bail!(
            "future_start ({}) must not be after future_end ({})",
            w.future_start,
            w.future_end
        );
    }
    Ok(cfg)
}

/// Builds the [`ReaderConfig`] for the reference file.
pub fn build_reference_reader(io: &IoToml) -> Result<ReaderConfig> {
    let cfg = ReaderConfig::new(&io.reference_var).with_unit_conversion(parse_unit_conversion(
        &io.reference_units,
        io.reference_factor,
    )?);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds the [`ReaderConfig`] for model-historical and model-future files.
pub fn build_model_reader(io: &IoToml) -> Result<ReaderConfig> {
    let cfg = ReaderConfig::new(&io.model_var)
        .with_unit_conversion(parse_unit_conversion(&io.model_units, io.model_factor)?);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds the [`WriterConfig`] for corrected output.
pub fn build_writer_config(io: &IoToml, history: &str) -> WriterConfig {
    WriterConfig::default()
        .with_variable(&io.output_var)
        .with_history(history)
}

/// Flattens a `(time, lat, lon)` grid file into a `(time, cell)` series
/// labelled with the file's decoded years and months.
pub fn to_series(file: &GridFile) -> Result<GriddedSeries> {
    let n_cells = file.grid().n_cells();
    GriddedSeries::from_flat(
        file.data().to_vec(),
        n_cells,
        file.time().years(),
        file.time().months(),
    )
    .with_context(|| format!("cannot build series from variable '{}'", file.variable()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pluvio_calendar::Calendar;
    use pluvio_io::{GridMetadata, TimeAxis};

    #[test]
    fn policies_parse_case_insensitively() {
        assert_eq!(parse_window_policy("Shift").unwrap(), WindowPolicy::Shift);
        assert_eq!(parse_extrapolation("LINEAR").unwrap(), Extrapolation::Linear);
        assert_eq!(
            parse_degenerate("floor_denominator").unwrap(),
            DegeneratePolicy::FloorDenominator
        );
        assert!(parse_window_policy("wrap").is_err());
    }

    #[test]
    fn plotting_position_custom_needs_both_parameters() {
        assert_eq!(
            parse_plotting_position("custom", Some(0.3), Some(0.2)).unwrap(),
            PlottingPosition::Custom {
                alphap: 0.3,
                betap: 0.2
            }
        );
        assert!(parse_plotting_position("custom", Some(0.3), None).is_err());
        assert!(parse_plotting_position("hazen", Some(0.3), None).is_err());
        assert_eq!(
            parse_plotting_position("median_unbiased", None, None).unwrap(),
            PlottingPosition::MedianUnbiased
        );
    }

    #[test]
    fn unit_factor_overrides_mode() {
        assert_eq!(
            parse_unit_conversion("auto", Some(86400.0)).unwrap(),
            UnitConversion::Factor(86400.0)
        );
        assert_eq!(parse_unit_conversion("none", None).unwrap(), UnitConversion::None);
        assert!(parse_unit_conversion("kelvin", None).is_err());
    }

    #[test]
    fn default_toml_builds_default_qdm_config() {
        let cfg = build_qdm_config(&PluvioConfig::default()).unwrap();
        assert_eq!(cfg, QdmConfig::new());
    }

    #[test]
    fn invalid_qdm_values_are_rejected() {
        let mut config = PluvioConfig::default();
        config.window.first_target = 2101;
        assert!(build_qdm_config(&config).is_err());

        let mut config = PluvioConfig::default();
        config.window.future_start = 2200;
        assert!(build_qdm_config(&config).is_err());
    }

    #[test]
    fn grid_file_flattens_row_major() {
        let grid = GridMetadata::new(vec![40.0, 41.0], vec![70.0, 71.0]);
        let time = TimeAxis::new(vec![0.0, 31.0], "days since 2000-01-01", Calendar::NoLeap)
            .unwrap();
        let data: Vec<f64> = (0..8).map(f64::from).collect();
        let file = GridFile::new(data, grid, time, "pr", None).unwrap();

        let series = to_series(&file).unwrap();
        assert_eq!(series.n_time(), 2);
        assert_eq!(series.n_cells(), 4);
        assert_eq!(series.months(), &[1, 2]);
        assert_eq!(series.values()[[1, 2]], 6.0);
    }
}
