//! Error types for pluvio-io.

use std::path::PathBuf;

/// Error type for all fallible operations in the pluvio-io crate.
///
/// This enum covers I/O failures, NetCDF errors, calendar decoding issues,
/// validation problems, and grid mismatches encountered when reading or
/// writing gridded precipitation files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Wraps an error originating from the pluvio-calendar crate.
    #[error("calendar error: {reason}")]
    Calendar {
        /// Description of the underlying calendar failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a required variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a dimension has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when two files do not share the same spatial grid.
    #[error("grid mismatch: {name} is {got_ny}x{got_nx}, expected {expected_ny}x{expected_nx}")]
    GridMismatch {
        /// Label of the offending input.
        name: String,
        /// Expected number of rows.
        expected_ny: usize,
        /// Expected number of columns.
        expected_nx: usize,
        /// Actual number of rows.
        got_ny: usize,
        /// Actual number of columns.
        got_nx: usize,
    },

    /// Returned when a time axis cannot be read or decoded.
    #[error("invalid time: {reason}")]
    InvalidTime {
        /// Description of the time parsing issue.
        reason: String,
    },

    /// Returned when a `units` attribute is not recognised.
    #[error("unrecognised units '{units}' on variable '{variable}'")]
    UnknownUnits {
        /// The variable inspected.
        variable: String,
        /// The `units` attribute value.
        units: String,
    },

    /// Returned when an input path cannot be turned into a derived path.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<pluvio_calendar::CalendarError> for IoError {
    fn from(e: pluvio_calendar::CalendarError) -> Self {
        IoError::Calendar {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_not_found() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("/tmp/missing.nc"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.nc");
    }

    #[test]
    fn display_netcdf() {
        let err = IoError::Netcdf {
            reason: "bad header".to_string(),
        };
        assert_eq!(err.to_string(), "netcdf error: bad header");
    }

    #[test]
    fn display_validation() {
        let err = IoError::Validation {
            count: 2,
            details: "latitude not finite; time not increasing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "2 validation error(s): latitude not finite; time not increasing"
        );
    }

    #[test]
    fn display_missing_variable() {
        let err = IoError::MissingVariable {
            name: "pr".to_string(),
            path: PathBuf::from("/data/model_historical.nc"),
        };
        assert_eq!(
            err.to_string(),
            "variable 'pr' not found in /data/model_historical.nc"
        );
    }

    #[test]
    fn display_grid_mismatch() {
        let err = IoError::GridMismatch {
            name: "future".to_string(),
            expected_ny: 10,
            expected_nx: 12,
            got_ny: 10,
            got_nx: 11,
        };
        assert_eq!(
            err.to_string(),
            "grid mismatch: future is 10x11, expected 10x12"
        );
    }

    #[test]
    fn display_unknown_units() {
        let err = IoError::UnknownUnits {
            variable: "pr".to_string(),
            units: "furlongs".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unrecognised units 'furlongs' on variable 'pr'"
        );
    }

    #[test]
    fn from_netcdf_error() {
        let nc_err = netcdf::Error::Str("test nc error".to_string());
        let err: IoError = nc_err.into();
        assert!(matches!(err, IoError::Netcdf { .. }));
        assert!(err.to_string().contains("test nc error"));
    }

    #[test]
    fn from_calendar_error() {
        let cal_err = pluvio_calendar::CalendarError::InvalidMonth { month: 13 };
        let err: IoError = cal_err.into();
        assert!(matches!(err, IoError::Calendar { .. }));
        assert!(err.to_string().contains("calendar error"));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<IoError>();
    }
}
