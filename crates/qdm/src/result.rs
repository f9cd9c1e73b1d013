//! Result and report types for rolling-window correction.

use std::collections::BTreeSet;
use std::fmt;

use crate::schedule::YearWindow;
use crate::series::GriddedSeries;

/// The input a sample was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SampleRole {
    /// Observation-based reference data.
    Reference,
    /// Model output over the historical period.
    Historical,
    /// Model output over the projection period.
    Future,
}

impl fmt::Display for SampleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reference => "reference",
            Self::Historical => "historical",
            Self::Future => "future",
        })
    }
}

/// Kind of non-fatal problem met while correcting one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// A sample had fewer valid values than required; the whole
    /// (cell, year, month) slice is NaN.
    InsufficientData(SampleRole),
    /// A value fell outside a mapping domain under
    /// [`Extrapolation::Missing`](crate::Extrapolation::Missing).
    OutOfDomain,
    /// The historical mapping was below the denominator guard.
    DegenerateRatio,
}

/// A non-fatal issue at one (cell, year, month).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellIssue {
    /// Flat cell index.
    pub cell: usize,
    /// Target year.
    pub year: i32,
    /// Calendar month (1..=12).
    pub month: u8,
    /// What went wrong.
    pub kind: IssueKind,
    /// Number of affected values.
    pub count: usize,
}

/// Aggregate counts over all [`CellIssue`]s of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IssueSummary {
    /// Values lost to insufficient samples.
    pub insufficient_data: usize,
    /// Values outside a mapping domain.
    pub out_of_domain: usize,
    /// Values with a degenerate ratio.
    pub degenerate_ratio: usize,
    /// Number of distinct cells with at least one issue.
    pub affected_cells: usize,
}

impl IssueSummary {
    /// Total number of affected values.
    pub fn total(&self) -> usize {
        self.insufficient_data + self.out_of_domain + self.degenerate_ratio
    }

    /// Returns `true` if no issue was recorded.
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Bookkeeping for a rolling-window run.
#[derive(Debug, Clone, Default)]
pub struct CorrectionReport {
    corrected_years: Vec<i32>,
    excluded_years: Vec<i32>,
    windows: Vec<YearWindow>,
    issues: Vec<CellIssue>,
}

impl CorrectionReport {
    pub(crate) fn new(
        corrected_years: Vec<i32>,
        excluded_years: Vec<i32>,
        windows: Vec<YearWindow>,
        issues: Vec<CellIssue>,
    ) -> Self {
        Self {
            corrected_years,
            excluded_years,
            windows,
            issues,
        }
    }

    /// Target years that were corrected.
    pub fn corrected_years(&self) -> &[i32] {
        &self.corrected_years
    }

    /// Target years skipped by [`WindowPolicy::Exclude`](crate::WindowPolicy::Exclude).
    pub fn excluded_years(&self) -> &[i32] {
        &self.excluded_years
    }

    /// The window used for every target year, in order.
    pub fn windows(&self) -> &[YearWindow] {
        &self.windows
    }

    /// All recorded per-cell issues.
    pub fn issues(&self) -> &[CellIssue] {
        &self.issues
    }

    /// Aggregates [`issues`](Self::issues).
    pub fn summary(&self) -> IssueSummary {
        let mut summary = IssueSummary::default();
        let mut cells = BTreeSet::new();
        for issue in &self.issues {
            match issue.kind {
                IssueKind::InsufficientData(_) => summary.insufficient_data += issue.count,
                IssueKind::OutOfDomain => summary.out_of_domain += issue.count,
                IssueKind::DegenerateRatio => summary.degenerate_ratio += issue.count,
            }
            cells.insert(issue.cell);
        }
        summary.affected_cells = cells.len();
        summary
    }
}

/// The output of a rolling-window correction.
#[derive(Debug, Clone)]
pub struct QdmResult {
    corrected: GriddedSeries,
    report: CorrectionReport,
}

impl QdmResult {
    pub(crate) fn new(corrected: GriddedSeries, report: CorrectionReport) -> Self {
        Self { corrected, report }
    }

    /// The corrected series, restricted to the target years.
    pub fn corrected(&self) -> &GriddedSeries {
        &self.corrected
    }

    pub(crate) fn corrected_mut(&mut self) -> &mut GriddedSeries {
        &mut self.corrected
    }

    /// The run report.
    pub fn report(&self) -> &CorrectionReport {
        &self.report
    }

    /// Consumes `self` and returns the corrected series and the report.
    pub fn into_parts(self) -> (GriddedSeries, CorrectionReport) {
        (self.corrected, self.report)
    }
}
