//! # pluvio-io
//!
//! Read gridded daily precipitation from NetCDF, normalise coordinates and
//! units, and write corrected fields back to NetCDF. Bridges climate-model
//! and WRF files into the flat `(time, lat, lon)` buffers used by the
//! correction engine.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use pluvio_io::{ReaderConfig, WriterConfig, read_gridded, write_gridded};
//!
//! let reference = read_gridded(Path::new("wrf.nc"), &ReaderConfig::new("RAINNC"))?;
//! let historical = read_gridded(Path::new("pr_historical.nc"), &ReaderConfig::default())?;
//! pluvio_io::check_same_grid(&[("reference", &reference), ("historical", &historical)])?;
//!
//! write_gridded(
//!     Path::new("out.nc"),
//!     reference.grid(),
//!     historical.time(),
//!     historical.data(),
//!     &WriterConfig::default(),
//! )?;
//! # Ok::<(), pluvio_io::IoError>(())
//! ```

mod error;
mod grid;
mod naming;
mod netcdf_read;
mod reader;
mod validate;
mod writer;

pub use error::IoError;
pub use grid::{GridFile, GridMetadata, TimeAxis};
pub use naming::{future_path_for, output_path};
pub use reader::{ReaderConfig, UnitConversion, read_gridded};
pub use validate::{check_same_grid, validate_grid_file};
pub use writer::{WriterConfig, write_gridded};
