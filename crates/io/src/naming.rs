//! Input and output path conventions.

use std::path::{Path, PathBuf};

use crate::error::IoError;

/// Derive the model-future input path from a model-historical one by
/// replacing every `historical` in the path with `future`.
///
/// # Errors
///
/// Returns [`IoError::InvalidPath`] if the path is not valid UTF-8 or does
/// not contain `historical`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use pluvio_io::future_path_for;
///
/// let p = future_path_for(Path::new("/data/historical/pr_historical_r1.nc")).unwrap();
/// assert_eq!(p, Path::new("/data/future/pr_future_r1.nc"));
/// ```
pub fn future_path_for(historical: &Path) -> Result<PathBuf, IoError> {
    let s = historical.to_str().ok_or_else(|| IoError::InvalidPath {
        path: historical.to_path_buf(),
        reason: "path is not valid UTF-8".to_string(),
    })?;
    if !s.contains("historical") {
        return Err(IoError::InvalidPath {
            path: historical.to_path_buf(),
            reason: "path does not contain 'historical'".to_string(),
        });
    }
    Ok(PathBuf::from(s.replace("historical", "future")))
}

/// Output path for a corrected run: `<output_dir>/<stem>_qdm_<first>-<last>.nc`
/// where `stem` is the future input's file stem.
///
/// # Errors
///
/// Returns [`IoError::InvalidPath`] if `future` has no file stem.
pub fn output_path(
    output_dir: &Path,
    future: &Path,
    first: i32,
    last: i32,
) -> Result<PathBuf, IoError> {
    let stem = future
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IoError::InvalidPath {
            path: future.to_path_buf(),
            reason: "path has no UTF-8 file stem".to_string(),
        })?;
    Ok(output_dir.join(format!("{stem}_qdm_{first}-{last}.nc")))
}
