//! NetCDF writer for corrected precipitation fields.

use std::path::Path;

use tracing::info;

use crate::error::IoError;
use crate::grid::{GridMetadata, TimeAxis};

/// Fill value written in place of NaN.
const DEFAULT_FILL_VALUE: f64 = 1.0e20;

/// Configuration for writing a `(time, lat, lon)` precipitation file.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Output variable name.
    variable: String,
    /// `units` attribute of the output variable.
    units: String,
    /// `long_name` attribute of the output variable.
    long_name: String,
    /// Value that stands in for missing data.
    fill_value: f64,
    /// Free-text `history` global attribute, if any.
    history: Option<String>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            variable: "pr".into(),
            units: "mm/day".into(),
            long_name: "bias-corrected daily precipitation".into(),
            fill_value: DEFAULT_FILL_VALUE,
            history: None,
        }
    }
}

impl WriterConfig {
    /// Sets the output variable name.
    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variable = name.into();
        self
    }

    /// Sets the `units` attribute.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Sets the `long_name` attribute.
    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = long_name.into();
        self
    }

    /// Sets the fill value used for NaN.
    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = fill_value;
        self
    }

    /// Sets the `history` global attribute.
    pub fn with_history(mut self, history: impl Into<String>) -> Self {
        self.history = Some(history.into());
        self
    }

    /// Output variable name.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    fn validate(&self) -> Result<(), IoError> {
        if self.variable.trim().is_empty() {
            return Err(IoError::Validation {
                count: 1,
                details: "output variable name must not be empty".to_string(),
            });
        }
        if !self.fill_value.is_finite() {
            return Err(IoError::Validation {
                count: 1,
                details: format!("fill value must be finite, got {}", self.fill_value),
            });
        }
        Ok(())
    }
}

/// Write `data` (flattened `(time, lat, lon)`) to a new NetCDF file.
///
/// The file has dimensions `time`, `lat`, `lon`, CF coordinate variables
/// carrying `time`'s raw offsets with its `units` and `calendar`, and the
/// precipitation variable with `units`, `long_name` and `_FillValue`. NaN
/// values are stored as the fill value. An existing file is overwritten.
///
/// # Errors
///
/// Returns [`IoError::DimensionMismatch`] if `data` does not hold
/// `nt * ny * nx` values, or [`IoError::Netcdf`] on write failure.
pub fn write_gridded(
    path: &Path,
    grid: &GridMetadata,
    time: &TimeAxis,
    data: &[f64],
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;

    let (nt, ny, nx) = (time.len(), grid.ny(), grid.nx());
    let expected = nt * ny * nx;
    if data.len() != expected {
        return Err(IoError::DimensionMismatch {
            name: format!("{} values", config.variable),
            expected,
            got: data.len(),
        });
    }

    let mut file = netcdf::create(path)?;

    file.add_attribute("Conventions", "CF-1.8")?;
    if let Some(history) = &config.history {
        file.add_attribute("history", history.as_str())?;
    }

    file.add_dimension("time", nt)?;
    file.add_dimension("lat", ny)?;
    file.add_dimension("lon", nx)?;

    {
        let mut var = file.add_variable::<f64>("lat", &["lat"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_attribute("standard_name", "latitude")?;
        var.put_values(grid.lats(), ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("lon", &["lon"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_attribute("standard_name", "longitude")?;
        var.put_values(grid.lons(), ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        var.put_attribute("units", time.units())?;
        var.put_attribute("calendar", time.calendar().name())?;
        var.put_attribute("standard_name", "time")?;
        var.put_values(time.offsets(), ..)?;
    }
    {
        let filled: Vec<f64> = data
            .iter()
            .map(|&v| if v.is_nan() { config.fill_value } else { v })
            .collect();
        let mut var = file.add_variable::<f64>(&config.variable, &["time", "lat", "lon"])?;
        var.put_attribute("_FillValue", config.fill_value)?;
        var.put_attribute("units", config.units.as_str())?;
        var.put_attribute("long_name", config.long_name.as_str())?;
        var.put_values(&filled, ..)?;
    }

    info!(path = %path.display(), nt, ny, nx, "wrote gridded file");
    Ok(())
}
