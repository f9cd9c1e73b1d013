//! High-level NetCDF reader configuration and orchestration.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::IoError;
use crate::grid::{GridFile, GridMetadata};
use crate::netcdf_read::{self, Axis};
use crate::validate::ValidationCollector;

/// Seconds per day, the factor from `kg m-2 s-1` to `mm/day`.
const SECONDS_PER_DAY: f64 = 86_400.0;

// ---------------------------------------------------------------------------
// UnitConversion
// ---------------------------------------------------------------------------

/// How precipitation values are converted to `mm/day` on read.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum UnitConversion {
    /// Infer the factor from the variable's `units` attribute.
    #[default]
    Auto,
    /// Multiply by a fixed factor regardless of the attribute.
    Factor(f64),
    /// Leave the values untouched.
    None,
}

impl UnitConversion {
    /// Returns the multiplicative factor to apply to `variable` whose
    /// `units` attribute is `units`.
    ///
    /// Under [`Auto`](Self::Auto) a missing attribute is treated as
    /// already in `mm/day`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownUnits`] if `Auto` cannot recognise `units`.
    pub fn factor(&self, variable: &str, units: Option<&str>) -> Result<f64, IoError> {
        match self {
            Self::None => Ok(1.0),
            Self::Factor(f) => Ok(*f),
            Self::Auto => match units {
                None => {
                    warn!(variable, "no 'units' attribute, assuming mm/day");
                    Ok(1.0)
                }
                Some(u) => auto_factor(u).ok_or_else(|| IoError::UnknownUnits {
                    variable: variable.to_string(),
                    units: u.to_string(),
                }),
            },
        }
    }
}

/// Recognise common spellings of flux, mm-per-day and m-per-day units.
fn auto_factor(units: &str) -> Option<f64> {
    let u: String = units
        .to_ascii_lowercase()
        .replace("**", "")
        .replace('^', "")
        .split_whitespace()
        .collect();
    match u.as_str() {
        "kgm-2s-1" | "kg/m2/s" | "kg/m2s" | "kgm-2/s" | "mm/s" | "mms-1" => Some(SECONDS_PER_DAY),
        "mm/day" | "mm/d" | "mmday-1" | "mmd-1" | "mm" => Some(1.0),
        "m/day" | "m/d" | "mday-1" | "md-1" | "m" => Some(1_000.0),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ReaderConfig
// ---------------------------------------------------------------------------

/// Configuration for reading one gridded precipitation file.
///
/// The [`Default`] implementation reads CF-style model output (`pr`) and
/// recognises WRF coordinate names (`XLAT`, `XLONG`, `Time`), so the same
/// config also opens WRF reference files once the variable name is changed.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// NetCDF variable name for precipitation.
    variable: String,
    /// Aliases to try when looking up latitude coordinates.
    lat_aliases: Vec<String>,
    /// Aliases to try when looking up longitude coordinates.
    lon_aliases: Vec<String>,
    /// Aliases to try when looking up the time coordinate.
    time_aliases: Vec<String>,
    /// Conversion of values to `mm/day`.
    unit_conversion: UnitConversion,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            variable: "pr".into(),
            lat_aliases: vec![
                "lat".into(),
                "latitude".into(),
                "XLAT".into(),
                "south_north".into(),
                "y".into(),
            ],
            lon_aliases: vec![
                "lon".into(),
                "longitude".into(),
                "XLONG".into(),
                "west_east".into(),
                "x".into(),
            ],
            time_aliases: vec!["time".into(), "Time".into(), "time2".into()],
            unit_conversion: UnitConversion::Auto,
        }
    }
}

impl ReaderConfig {
    /// Create a config with default aliases for `variable`.
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            ..Self::default()
        }
    }

    /// Set the precipitation variable name.
    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variable = name.into();
        self
    }

    /// Replace the latitude aliases.
    pub fn with_lat_aliases(mut self, aliases: Vec<String>) -> Self {
        self.lat_aliases = aliases;
        self
    }

    /// Replace the longitude aliases.
    pub fn with_lon_aliases(mut self, aliases: Vec<String>) -> Self {
        self.lon_aliases = aliases;
        self
    }

    /// Replace the time aliases.
    pub fn with_time_aliases(mut self, aliases: Vec<String>) -> Self {
        self.time_aliases = aliases;
        self
    }

    /// Set the unit conversion policy.
    pub fn with_unit_conversion(mut self, conversion: UnitConversion) -> Self {
        self.unit_conversion = conversion;
        self
    }

    /// Precipitation variable name.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Unit conversion policy.
    pub fn unit_conversion(&self) -> UnitConversion {
        self.unit_conversion
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] listing every problem found.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut c = ValidationCollector::new();
        if self.variable.trim().is_empty() {
            c.push("variable name must not be empty");
        }
        for (label, aliases) in [
            ("lat", &self.lat_aliases),
            ("lon", &self.lon_aliases),
            ("time", &self.time_aliases),
        ] {
            if aliases.is_empty() {
                c.push(format!("{label} aliases must not be empty"));
            }
        }
        if let UnitConversion::Factor(f) = self.unit_conversion
            && !(f.is_finite() && f > 0.0)
        {
            c.push(format!("unit conversion factor must be finite and > 0, got {f}"));
        }
        c.finish()
    }
}

// ---------------------------------------------------------------------------
// read_gridded
// ---------------------------------------------------------------------------

/// Read a `(time, lat, lon)` precipitation field from a NetCDF file.
///
/// Coordinates are resolved through the configured alias lists; when no
/// coordinate variable exists the grid falls back to cell indices. Fill
/// values become NaN and the data are converted to `mm/day` per the
/// configured [`UnitConversion`].
///
/// # Errors
///
/// Returns [`IoError`] on missing variables, dimension mismatches, time
/// decoding failures, or unrecognised units.
#[tracing::instrument(skip(config), fields(variable = config.variable()))]
pub fn read_gridded(path: &Path, config: &ReaderConfig) -> Result<GridFile, IoError> {
    config.validate()?;

    let file = netcdf_read::open_file(path)?;

    // -- Data ---------------------------------------------------------------

    let (mut data, [nt, ny, nx], time_dim) =
        netcdf_read::read_3d_f64(&file, &config.variable, path)?;
    debug!(nt, ny, nx, "read data variable");

    // -- Coordinates --------------------------------------------------------

    let lats = read_coordinate(&file, &config.lat_aliases, Axis::Lat, ny, path)?;
    let lons = read_coordinate(&file, &config.lon_aliases, Axis::Lon, nx, path)?;

    // -- Time ---------------------------------------------------------------

    let mut time_aliases: Vec<&str> = config.time_aliases.iter().map(String::as_str).collect();
    time_aliases.push(time_dim.as_str());
    let time_var =
        netcdf_read::find_variable(&file, &time_aliases).ok_or_else(|| {
            IoError::MissingVariable {
                name: config.time_aliases.first().cloned().unwrap_or(time_dim.clone()),
                path: path.to_path_buf(),
            }
        })?;
    let time = netcdf_read::read_time_axis(&file, time_var, path)?;
    if time.len() != nt {
        return Err(IoError::DimensionMismatch {
            name: time_var.to_string(),
            expected: nt,
            got: time.len(),
        });
    }

    // -- Units --------------------------------------------------------------

    let units = file
        .variable(&config.variable)
        .and_then(|v| netcdf_read::string_attribute(&v, "units"));
    let factor = config
        .unit_conversion
        .factor(&config.variable, units.as_deref())?;
    if factor != 1.0 {
        data.iter_mut().for_each(|v| *v *= factor);
    }
    let units = match config.unit_conversion {
        UnitConversion::None => units,
        _ => Some("mm/day".to_string()),
    };

    info!(
        path = %path.display(),
        nt,
        ny,
        nx,
        factor,
        calendar = %time.calendar(),
        "read gridded file"
    );

    GridFile::new(
        data,
        GridMetadata::new(lats, lons),
        time,
        config.variable.clone(),
        units,
    )
}

/// Resolve a coordinate through `aliases`, falling back to `0..n` indices.
fn read_coordinate(
    file: &netcdf::File,
    aliases: &[String],
    axis: Axis,
    n: usize,
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    let refs: Vec<&str> = aliases.iter().map(String::as_str).collect();
    match netcdf_read::find_variable(file, &refs) {
        Some(name) => netcdf_read::read_axis(file, name, axis, n, path),
        None => {
            warn!(?axis, "no coordinate variable found, using cell indices");
            Ok((0..n).map(|i| i as f64).collect())
        }
    }
}
