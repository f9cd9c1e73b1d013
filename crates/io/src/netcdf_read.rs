//! Low-level NetCDF extraction helpers.

use std::path::Path;

use netcdf::AttributeValue;
use pluvio_calendar::{Calendar, TimeUnits};
use tracing::debug;

use crate::error::IoError;
use crate::grid::TimeAxis;

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Return the first alias that names a variable in `file`.
pub(crate) fn find_variable<'a>(file: &netcdf::File, aliases: &[&'a str]) -> Option<&'a str> {
    aliases
        .iter()
        .copied()
        .find(|alias| file.variable(alias).is_some())
}

/// Which spatial axis a coordinate variable describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Lat,
    Lon,
}

/// Read a coordinate variable as a 1-D axis of length `expected`.
///
/// 1-D variables are returned as-is. 2-D `(y, x)` and WRF-style 3-D
/// `(Time, y, x)` arrays are reduced to their first column (latitude) or
/// first row (longitude) of the first time slice.
pub(crate) fn read_axis(
    file: &netcdf::File,
    name: &str,
    axis: Axis,
    expected: usize,
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    let var = file.variable(name).ok_or_else(|| IoError::MissingVariable {
        name: name.to_string(),
        path: path.to_path_buf(),
    })?;
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let data = var.get_values::<f64, _>(..)?;

    let values = match shape.as_slice() {
        [_] => data,
        [ny, nx] | [_, ny, nx] => {
            let (ny, nx) = (*ny, *nx);
            debug!(name, ny, nx, "reducing 2-D coordinate array");
            match axis {
                Axis::Lat => (0..ny).map(|j| data[j * nx]).collect(),
                Axis::Lon => data[..nx].to_vec(),
            }
        }
        other => {
            return Err(IoError::DimensionMismatch {
                name: format!("{name} dimensions"),
                expected: 2,
                got: other.len(),
            });
        }
    };

    if values.len() != expected {
        return Err(IoError::DimensionMismatch {
            name: name.to_string(),
            expected,
            got: values.len(),
        });
    }
    Ok(values)
}

/// Read a 3-D `f64` variable and return the flattened data, the shape
/// `[nt, ny, nx]` and the name of its leading (time) dimension.
///
/// Values equal to the variable's `_FillValue` or `missing_value` attribute
/// are replaced with NaN.
pub(crate) fn read_3d_f64(
    file: &netcdf::File,
    var_name: &str,
    path: &Path,
) -> Result<(Vec<f64>, [usize; 3], String), IoError> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| IoError::MissingVariable {
            name: var_name.to_string(),
            path: path.to_path_buf(),
        })?;

    let dims = var.dimensions();
    if dims.len() != 3 {
        return Err(IoError::DimensionMismatch {
            name: format!("{var_name} dimensions"),
            expected: 3,
            got: dims.len(),
        });
    }

    let nt = dims[0].len();
    let ny = dims[1].len();
    let nx = dims[2].len();
    let time_dim = dims[0].name();

    let mut data = var.get_values::<f64, _>(..)?;

    let sentinels: Vec<f64> = ["_FillValue", "missing_value"]
        .into_iter()
        .filter_map(|attr| numeric_attribute(&var, attr))
        .collect();
    if !sentinels.is_empty() {
        let mut masked = 0usize;
        for v in data.iter_mut() {
            if sentinels.iter().any(|s| *v == *s) {
                *v = f64::NAN;
                masked += 1;
            }
        }
        debug!(var_name, masked, "masked fill values");
    }

    Ok((data, [nt, ny, nx], time_dim))
}

/// Read a numeric attribute as `f64`, if present.
fn numeric_attribute(var: &netcdf::Variable, name: &str) -> Option<f64> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        _ => None,
    }
}

/// Read a string attribute, if present.
pub(crate) fn string_attribute(var: &netcdf::Variable, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Read and decode the time axis stored in `time_var`.
///
/// The `calendar` attribute defaults to `"standard"` when absent, as CF
/// prescribes.
pub(crate) fn read_time_axis(
    file: &netcdf::File,
    time_var: &str,
    path: &Path,
) -> Result<TimeAxis, IoError> {
    let var = file
        .variable(time_var)
        .ok_or_else(|| IoError::MissingVariable {
            name: time_var.to_string(),
            path: path.to_path_buf(),
        })?;

    let units = string_attribute(&var, "units").ok_or_else(|| IoError::InvalidTime {
        reason: format!("time variable '{time_var}' has no string 'units' attribute"),
    })?;
    let calendar_name =
        string_attribute(&var, "calendar").unwrap_or_else(|| "standard".to_string());
    let calendar = Calendar::parse(&calendar_name)?;

    let offsets = var.get_values::<f64, _>(..)?;
    TimeAxis::new(offsets, units, calendar)
}

/// Decode `offsets` in `units` under `calendar`.
pub(crate) fn decode_offsets(
    offsets: &[f64],
    units: &str,
    calendar: Calendar,
) -> Result<Vec<pluvio_calendar::CfDate>, IoError> {
    let parsed = TimeUnits::parse(units, calendar)?;
    Ok(parsed.decode_all(offsets, calendar)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_standard_days() {
        let dates = decode_offsets(&[0.0, 31.0, 59.0], "days since 2000-01-01", Calendar::Standard)
            .unwrap();
        let ymd: Vec<(i32, u8, u8)> = dates.iter().map(|d| (d.year(), d.month(), d.day())).collect();
        assert_eq!(ymd, vec![(2000, 1, 1), (2000, 2, 1), (2000, 2, 29)]);
    }

    #[test]
    fn decode_noleap_skips_feb29() {
        let dates =
            decode_offsets(&[59.0], "days since 2000-01-01", Calendar::NoLeap).unwrap();
        assert_eq!((dates[0].month(), dates[0].day()), (3, 1));
    }

    #[test]
    fn decode_hours_since() {
        let dates =
            decode_offsets(&[0.0, 36.0], "hours since 1990-06-30 12:00:00", Calendar::Day360)
                .unwrap();
        assert_eq!((dates[1].year(), dates[1].month(), dates[1].day()), (1990, 7, 2));
    }

    #[test]
    fn decode_rejects_bad_units() {
        let r = decode_offsets(&[0.0], "fortnights after lunch", Calendar::Standard);
        assert!(matches!(r, Err(IoError::Calendar { .. })));
    }
}
