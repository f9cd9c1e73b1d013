//! Accumulated validation utilities.
//!
//! Provides [`ValidationCollector`] for gathering multiple validation errors
//! into a single [`IoError::Validation`], plus checks run on freshly read
//! grid files before they reach the correction engine.

use std::cmp::Ordering;

use crate::error::IoError;
use crate::grid::GridFile;

// ---------------------------------------------------------------------------
// ValidationCollector
// ---------------------------------------------------------------------------

/// Accumulates validation errors and converts them into a single
/// [`IoError::Validation`].
///
/// Create a collector, push zero or more error messages, then call
/// [`finish`](Self::finish) to obtain `Ok(())` when everything is valid or a
/// single `Err` that summarises every violation.
pub(crate) struct ValidationCollector {
    errors: Vec<String>,
}

impl ValidationCollector {
    /// Create an empty collector.
    pub(crate) fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record one validation error.
    pub(crate) fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.errors.len()
    }

    /// Consume the collector and return `Ok(())` if no errors were recorded,
    /// or `Err(IoError::Validation { count, details })` otherwise.
    ///
    /// The `details` string joins all messages with `"; "`.
    pub(crate) fn finish(self) -> Result<(), IoError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: self.errors.len(),
                details: self.errors.join("; "),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Grid checks
// ---------------------------------------------------------------------------

/// Check that every labelled file shares the `(ny, nx)` grid of the first.
///
/// # Errors
///
/// Returns [`IoError::GridMismatch`] naming the first file that differs.
pub fn check_same_grid(files: &[(&str, &GridFile)]) -> Result<(), IoError> {
    let Some((_, first)) = files.first() else {
        return Ok(());
    };
    let (expected_ny, expected_nx) = (first.grid().ny(), first.grid().nx());
    for (name, file) in &files[1..] {
        let (got_ny, got_nx) = (file.grid().ny(), file.grid().nx());
        if (got_ny, got_nx) != (expected_ny, expected_nx) {
            return Err(IoError::GridMismatch {
                name: (*name).to_string(),
                expected_ny,
                expected_nx,
                got_ny,
                got_nx,
            });
        }
    }
    Ok(())
}

/// Check a grid file for problems that would corrupt a correction run.
///
/// Reports an empty time axis, non-finite coordinates, and a time axis that
/// is not strictly increasing. Negative precipitation is not an error; it
/// falls in the dry band and is conditioned like any other dry value.
///
/// # Errors
///
/// Returns [`IoError::Validation`] listing every problem found.
pub fn validate_grid_file(file: &GridFile) -> Result<(), IoError> {
    let mut c = ValidationCollector::new();

    if file.time().is_empty() {
        c.push("time axis is empty");
    }
    if file.grid().lats().iter().any(|v| !v.is_finite()) {
        c.push("latitude contains non-finite values");
    }
    if file.grid().lons().iter().any(|v| !v.is_finite()) {
        c.push("longitude contains non-finite values");
    }
    if let Some(i) = file
        .time()
        .offsets()
        .windows(2)
        .position(|w| w[1].partial_cmp(&w[0]) != Some(Ordering::Greater))
    {
        c.push(format!("time is not strictly increasing at index {}", i + 1));
    }
    c.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
