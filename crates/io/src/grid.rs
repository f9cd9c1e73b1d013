//! In-memory representation of a gridded NetCDF precipitation file.

use pluvio_calendar::{Calendar, CfDate};

use crate::error::IoError;
use crate::netcdf_read::decode_offsets;

// ---------------------------------------------------------------------------
// GridMetadata
// ---------------------------------------------------------------------------

/// Spatial coordinates of a regular `(lat, lon)` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMetadata {
    lats: Vec<f64>,
    lons: Vec<f64>,
}

impl GridMetadata {
    /// Create grid metadata from 1-D latitude and longitude axes.
    pub fn new(lats: Vec<f64>, lons: Vec<f64>) -> Self {
        Self { lats, lons }
    }

    /// Latitude axis (length `ny`).
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Longitude axis (length `nx`).
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Number of rows.
    pub fn ny(&self) -> usize {
        self.lats.len()
    }

    /// Number of columns.
    pub fn nx(&self) -> usize {
        self.lons.len()
    }

    /// Number of grid cells (`ny * nx`).
    pub fn n_cells(&self) -> usize {
        self.ny() * self.nx()
    }
}

// ---------------------------------------------------------------------------
// TimeAxis
// ---------------------------------------------------------------------------

/// A CF time axis: raw offsets, their `units`/`calendar`, and decoded dates.
///
/// The raw offsets are kept so that a written file carries exactly the
/// time values of its source.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    offsets: Vec<f64>,
    units: String,
    calendar: Calendar,
    dates: Vec<CfDate>,
}

impl TimeAxis {
    /// Decode `offsets` expressed in `units` under `calendar`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Calendar`] if the units string is malformed or an
    /// offset cannot be decoded.
    pub fn new(
        offsets: Vec<f64>,
        units: impl Into<String>,
        calendar: Calendar,
    ) -> Result<Self, IoError> {
        let units = units.into();
        let dates = decode_offsets(&offsets, &units, calendar)?;
        Ok(Self {
            offsets,
            units,
            calendar,
            dates,
        })
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns `true` if the axis has no time steps.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Raw offsets as stored in the file.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// CF `units` string, e.g. `"days since 1950-01-01"`.
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Calendar of the axis.
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Decoded dates.
    pub fn dates(&self) -> &[CfDate] {
        &self.dates
    }

    /// Year label of every time step.
    pub fn years(&self) -> Vec<i32> {
        self.dates.iter().map(|d| d.year()).collect()
    }

    /// Month label (1..=12) of every time step.
    pub fn months(&self) -> Vec<u8> {
        self.dates.iter().map(|d| d.month()).collect()
    }

    /// Indices of time steps whose year lies in `first..=last`.
    pub fn indices_in_years(&self, first: i32, last: i32) -> Vec<usize> {
        self.dates
            .iter()
            .enumerate()
            .filter(|(_, d)| (first..=last).contains(&d.year()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Sub-axis made of the time steps at `indices`, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            offsets: indices.iter().map(|&i| self.offsets[i]).collect(),
            units: self.units.clone(),
            calendar: self.calendar,
            dates: indices.iter().map(|&i| self.dates[i]).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// GridFile
// ---------------------------------------------------------------------------

/// A `(time, lat, lon)` precipitation field read from or written to NetCDF.
///
/// `data` is flattened time-major with the spatial axes row-major, so row
/// `t` of the equivalent `(time, cell)` matrix is
/// `data[t * n_cells..(t + 1) * n_cells]` and `cell = j * nx + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridFile {
    data: Vec<f64>,
    grid: GridMetadata,
    time: TimeAxis,
    variable: String,
    units: Option<String>,
}

impl GridFile {
    /// Assemble a grid file, checking that `data` has `nt * ny * nx` values.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] on a length mismatch.
    pub fn new(
        data: Vec<f64>,
        grid: GridMetadata,
        time: TimeAxis,
        variable: impl Into<String>,
        units: Option<String>,
    ) -> Result<Self, IoError> {
        let expected = time.len() * grid.n_cells();
        if data.len() != expected {
            return Err(IoError::DimensionMismatch {
                name: "data length".to_string(),
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            grid,
            time,
            variable: variable.into(),
            units,
        })
    }

    /// Flattened values in `(time, lat, lon)` order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Consume the file and return its values.
    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Spatial grid.
    pub fn grid(&self) -> &GridMetadata {
        &self.grid
    }

    /// Time axis.
    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    /// Variable name the data was read from.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Units of `data` after any conversion, if known.
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// Shape `[nt, ny, nx]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.time.len(), self.grid.ny(), self.grid.nx()]
    }
}
