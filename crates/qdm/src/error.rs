//! Error types for the pluvio-qdm crate.

use crate::result::SampleRole;

/// Error type for all fallible operations in the pluvio-qdm crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QdmError {
    /// Returned when an input series or sample is empty.
    #[error("input data is empty")]
    EmptyData,

    /// Returned when the value rows and the time labels differ in length.
    #[error(
        "length mismatch: values have {values_len} time steps, years has {years_len}, months has {months_len}"
    )]
    LengthMismatch {
        /// Number of time steps in the value array.
        values_len: usize,
        /// Length of the year labels.
        years_len: usize,
        /// Length of the month labels.
        months_len: usize,
    },

    /// Returned when a month label is outside 1..=12.
    #[error("invalid month: {month} (must be 1..=12)")]
    InvalidMonth {
        /// The invalid month value.
        month: u8,
    },

    /// Returned when the three inputs do not share a grid.
    #[error(
        "grid mismatch: reference has {reference} cells, historical has {historical}, future has {future}"
    )]
    GridMismatch {
        /// Cell count of the reference series.
        reference: usize,
        /// Cell count of the model-historical series.
        historical: usize,
        /// Cell count of the model-future series.
        future: usize,
    },

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a sample has too few valid values to estimate quantiles.
    #[error("insufficient {role} data: {valid} valid values, need at least {required}")]
    InsufficientData {
        /// Which input the sample came from.
        role: SampleRole,
        /// Number of finite values in the sample.
        valid: usize,
        /// Minimum number of values required.
        required: usize,
    },

    /// Returned when a mapping is evaluated outside its domain under
    /// [`Extrapolation::Missing`](crate::Extrapolation::Missing).
    #[error("value {value} is outside the mapping domain [{min}, {max}]")]
    OutOfDomain {
        /// The evaluated value.
        value: f64,
        /// Lower end of the domain.
        min: f64,
        /// Upper end of the domain.
        max: f64,
    },

    /// Returned when mapping knots have different lengths.
    #[error("knot mismatch: domain has {domain_len} knots, range has {range_len}")]
    KnotMismatch {
        /// Number of domain knots.
        domain_len: usize,
        /// Number of range knots.
        range_len: usize,
    },

    /// Returned when mapping domain knots are not non-decreasing.
    #[error("domain knots must be non-decreasing (violated at index {index})")]
    UnsortedKnots {
        /// Index of the first knot smaller than its predecessor.
        index: usize,
    },

    /// Returned when a target year has no model-future data at all.
    #[error("target year {year} has no future data (record covers {first}..={last})")]
    BoundaryWindow {
        /// The target year.
        year: i32,
        /// First year of the future record.
        first: i32,
        /// Last year of the future record.
        last: i32,
    },

    /// Returned when every target year was excluded by the window policy.
    #[error("no target year in {first}..={last} could be corrected")]
    NoTargetYears {
        /// First requested target year.
        first: i32,
        /// Last requested target year.
        last: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_empty_data() {
        assert_eq!(QdmError::EmptyData.to_string(), "input data is empty");
    }

    #[test]
    fn error_length_mismatch() {
        let e = QdmError::LengthMismatch {
            values_len: 100,
            years_len: 99,
            months_len: 98,
        };
        assert_eq!(
            e.to_string(),
            "length mismatch: values have 100 time steps, years has 99, months has 98"
        );
    }

    #[test]
    fn error_grid_mismatch() {
        let e = QdmError::GridMismatch {
            reference: 12,
            historical: 12,
            future: 9,
        };
        assert_eq!(
            e.to_string(),
            "grid mismatch: reference has 12 cells, historical has 12, future has 9"
        );
    }

    #[test]
    fn error_insufficient_data() {
        let e = QdmError::InsufficientData {
            role: SampleRole::Historical,
            valid: 1,
            required: 2,
        };
        assert_eq!(
            e.to_string(),
            "insufficient historical data: 1 valid values, need at least 2"
        );
    }

    #[test]
    fn error_out_of_domain() {
        let e = QdmError::OutOfDomain {
            value: 7.5,
            min: 0.5,
            max: 3.0,
        };
        assert_eq!(
            e.to_string(),
            "value 7.5 is outside the mapping domain [0.5, 3]"
        );
    }

    #[test]
    fn error_boundary_window() {
        let e = QdmError::BoundaryWindow {
            year: 2101,
            first: 2000,
            last: 2100,
        };
        assert_eq!(
            e.to_string(),
            "target year 2101 has no future data (record covers 2000..=2100)"
        );
    }

    #[test]
    fn error_no_target_years() {
        let e = QdmError::NoTargetYears {
            first: 2090,
            last: 2100,
        };
        assert_eq!(e.to_string(), "no target year in 2090..=2100 could be corrected");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<QdmError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<QdmError>();
    }
}
