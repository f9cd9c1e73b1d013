//! Rolling-window scheduling over target years and calendar months.
//!
//! Every target year `Y` is corrected month by month with quantiles of the
//! model-future values inside the window around `Y`. Reference and
//! model-historical samples do not depend on `Y`, so they are gathered and
//! sorted once per (month, cell) into read-only pools.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use ndarray::Array2;
use pluvio_stats::sorted_finite;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{QdmConfig, WindowPolicy};
use crate::correct::{QdmCorrector, check_sample};
use crate::error::QdmError;
use crate::quantile::{QuantileVector, probability_levels};
use crate::result::{CellIssue, CorrectionReport, IssueKind, QdmResult, SampleRole};
use crate::series::GriddedSeries;

// ---------------------------------------------------------------------------
// Window planning
// ---------------------------------------------------------------------------

/// The model-future window used for one target year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    target: i32,
    span: Option<(i32, i32)>,
}

impl YearWindow {
    /// The target year.
    pub fn target(&self) -> i32 {
        self.target
    }

    /// Inclusive `(first, last)` years of the window, or `None` if the year
    /// is excluded.
    pub fn span(&self) -> Option<(i32, i32)> {
        self.span
    }

    /// Returns `true` if the target year is skipped.
    pub fn is_excluded(&self) -> bool {
        self.span.is_none()
    }

    /// Number of years in the window (0 when excluded).
    pub fn n_years(&self) -> usize {
        self.span.map_or(0, |(a, b)| (b - a + 1) as usize)
    }
}

/// Computes the window of every target year in the configured range.
///
/// `record` is the inclusive `(first, last)` year range of the model-future
/// series. The nominal window of `Y` is `Y - h ..= Y + h` with
/// `h = config.half_window()`; the [`WindowPolicy`] decides what happens
/// where it leaves the record.
///
/// # Errors
///
/// - [`QdmError::InvalidConfig`] if the configuration is invalid.
/// - [`QdmError::BoundaryWindow`] if a target year lies outside `record`.
///
/// # Example
///
/// ```
/// use pluvio_qdm::{QdmConfig, plan_windows};
///
/// let windows = plan_windows(&QdmConfig::new(), (2000, 2100)).unwrap();
/// assert_eq!(windows[0].target(), 2019);
/// assert_eq!(windows[0].span(), Some((2000, 2038)));
/// ```
pub fn plan_windows(config: &QdmConfig, record: (i32, i32)) -> Result<Vec<YearWindow>, QdmError> {
    config.validate()?;
    let (first, last) = record;
    let h = config.half_window();

    (config.first_target()..=config.last_target())
        .map(|year| {
            if year < first || year > last {
                return Err(QdmError::BoundaryWindow { year, first, last });
            }
            let (lo, hi) = (year.saturating_sub(h), year.saturating_add(h));
            let width = h.saturating_mul(2);
            let span = match config.window_policy() {
                WindowPolicy::Truncate => Some((lo.max(first), hi.min(last))),
                WindowPolicy::Shift => {
                    if i64::from(last) - i64::from(first) < i64::from(width) {
                        Some((first, last))
                    } else {
                        let start = lo.clamp(first, last - width);
                        Some((start, start + width))
                    }
                }
                WindowPolicy::Exclude => (lo >= first && hi <= last).then_some((lo, hi)),
            };
            Ok(YearWindow { target: year, span })
        })
        .collect()
}

/// One (target year, calendar month) correction over all cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    /// Target year.
    pub year: i32,
    /// Calendar month (1..=12).
    pub month: u8,
    /// Inclusive window years.
    pub window: (i32, i32),
}

/// Expands planned windows into work units, twelve per non-excluded year.
pub fn work_units(windows: &[YearWindow]) -> Vec<WorkUnit> {
    windows
        .iter()
        .filter_map(|w| w.span().map(|span| (w.target(), span)))
        .flat_map(|(year, window)| {
            (1..=12u8).map(move |month| WorkUnit {
                year,
                month,
                window,
            })
        })
        .collect()
}

/// Progress report delivered after each target year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearProgress {
    /// The year just finished.
    pub year: i32,
    /// 0-based position of the year in the plan.
    pub index: usize,
    /// Number of planned years.
    pub total: usize,
    /// Wall time spent on this year.
    pub elapsed: Duration,
    /// Values with an issue in this year.
    pub n_issues: usize,
}

// ---------------------------------------------------------------------------
// Sample pools
// ---------------------------------------------------------------------------

/// Sorted finite values per (month, cell) over a whole series.
struct MonthPools {
    pools: Vec<Vec<Vec<f64>>>,
}

impl MonthPools {
    fn build(series: &GriddedSeries) -> Self {
        let pools = (1..=12u8)
            .into_par_iter()
            .map(|month| {
                let rows = series.rows_in(i32::MIN, i32::MAX, month);
                (0..series.n_cells())
                    .map(|cell| gather_sorted(series, &rows, cell))
                    .collect()
            })
            .collect();
        Self { pools }
    }

    fn get(&self, month: u8, cell: usize) -> &[f64] {
        &self.pools[(month - 1) as usize][cell]
    }
}

fn gather_sorted(series: &GriddedSeries, rows: &[usize], cell: usize) -> Vec<f64> {
    let column = series.cell(cell);
    let values: Vec<f64> = rows.iter().map(|&t| column[t]).collect();
    sorted_finite(&values)
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

struct Context<'a> {
    future: &'a GriddedSeries,
    reference: &'a MonthPools,
    historical: &'a MonthPools,
    levels: Vec<f64>,
    config: &'a QdmConfig,
}

/// Corrected values of one work unit: `block[[i, cell]]` belongs to the
/// future time step `rows[i]`.
struct UnitOutput {
    rows: Vec<usize>,
    block: Array2<f64>,
    issues: Vec<CellIssue>,
}

fn run_unit(unit: &WorkUnit, ctx: &Context<'_>) -> Result<UnitOutput, QdmError> {
    let rows = ctx.future.rows_in(unit.year, unit.year, unit.month);
    let n_cells = ctx.future.n_cells();
    if rows.is_empty() {
        return Ok(UnitOutput {
            rows,
            block: Array2::zeros((0, n_cells)),
            issues: Vec::new(),
        });
    }
    let window_rows = ctx.future.rows_in(unit.window.0, unit.window.1, unit.month);

    let columns = (0..n_cells)
        .into_par_iter()
        .map(|cell| correct_cell(unit, cell, &rows, &window_rows, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    let mut block = Array2::from_elem((rows.len(), n_cells), f64::NAN);
    let mut issues = Vec::new();
    for (cell, (values, cell_issues)) in columns.into_iter().enumerate() {
        for (i, v) in values.into_iter().enumerate() {
            block[[i, cell]] = v;
        }
        issues.extend(cell_issues);
    }
    Ok(UnitOutput {
        rows,
        block,
        issues,
    })
}

fn correct_cell(
    unit: &WorkUnit,
    cell: usize,
    rows: &[usize],
    window_rows: &[usize],
    ctx: &Context<'_>,
) -> Result<(Vec<f64>, Vec<CellIssue>), QdmError> {
    let column = ctx.future.cell(cell);
    let window = gather_sorted(ctx.future, window_rows, cell);
    let issue = |kind, count| CellIssue {
        cell,
        year: unit.year,
        month: unit.month,
        kind,
        count,
    };

    let samples = [
        (ctx.reference.get(unit.month, cell), SampleRole::Reference),
        (ctx.historical.get(unit.month, cell), SampleRole::Historical),
        (window.as_slice(), SampleRole::Future),
    ];
    for (sorted, role) in samples {
        if check_sample(sorted, role, ctx.config).is_err() {
            let lost = vec![f64::NAN; rows.len()];
            return Ok((lost, vec![issue(IssueKind::InsufficientData(role), rows.len())]));
        }
    }

    let position = ctx.config.plotting_position();
    let [reference, historical, future] =
        samples.map(|(sorted, _)| QuantileVector::from_sorted(sorted, &ctx.levels, position));
    let corrector = QdmCorrector::new(&reference?, &historical?, &future?, ctx.config)?;

    let mut out_of_domain = 0;
    let mut degenerate = 0;
    let values = rows
        .iter()
        .map(|&t| {
            let (value, kind) = corrector.correct(column[t]);
            match kind {
                Some(IssueKind::OutOfDomain) => out_of_domain += 1,
                Some(IssueKind::DegenerateRatio) => degenerate += 1,
                _ => {}
            }
            value
        })
        .collect();

    let mut issues = Vec::new();
    if out_of_domain > 0 {
        issues.push(issue(IssueKind::OutOfDomain, out_of_domain));
    }
    if degenerate > 0 {
        issues.push(issue(IssueKind::DegenerateRatio, degenerate));
    }
    Ok((values, issues))
}

fn check_grids(
    reference: &GriddedSeries,
    historical: &GriddedSeries,
    future: &GriddedSeries,
) -> Result<(), QdmError> {
    let cells = (reference.n_cells(), historical.n_cells(), future.n_cells());
    if cells.0 != cells.1 || cells.0 != cells.2 {
        return Err(QdmError::GridMismatch {
            reference: cells.0,
            historical: cells.1,
            future: cells.2,
        });
    }
    Ok(())
}

/// Runs the rolling-window correction on already-conditioned inputs.
///
/// Target years are processed in order. Within a year the twelve month
/// units run in parallel and each maps over cells in parallel; units write
/// disjoint output rows. `progress` is called after every target year.
///
/// The returned series holds the future time steps of the target years.
/// Rows of excluded years and of (cell, month) slices with insufficient data
/// are NaN and listed in the report.
///
/// # Errors
///
/// - [`QdmError::InvalidConfig`] if the configuration is invalid.
/// - [`QdmError::GridMismatch`] if the inputs differ in cell count.
/// - [`QdmError::BoundaryWindow`] if a target year has no future data.
/// - [`QdmError::NoTargetYears`] if every target year was excluded.
#[tracing::instrument(skip_all, fields(
    n_cells = future.n_cells(),
    first = config.first_target(),
    last = config.last_target(),
))]
pub fn correct_rolling<F>(
    reference: &GriddedSeries,
    historical: &GriddedSeries,
    future: &GriddedSeries,
    config: &QdmConfig,
    mut progress: F,
) -> Result<QdmResult, QdmError>
where
    F: FnMut(&YearProgress),
{
    config.validate()?;
    check_grids(reference, historical, future)?;

    let (record_first, record_last) = future.year_range();
    let windows = plan_windows(config, (record_first, record_last))?;
    let present: BTreeSet<i32> = future.years().iter().copied().collect();
    if let Some(w) = windows.iter().find(|w| !present.contains(&w.target())) {
        return Err(QdmError::BoundaryWindow {
            year: w.target(),
            first: record_first,
            last: record_last,
        });
    }
    if windows.iter().all(YearWindow::is_excluded) {
        return Err(QdmError::NoTargetYears {
            first: config.first_target(),
            last: config.last_target(),
        });
    }

    let reference_pools = MonthPools::build(reference);
    let historical_pools = MonthPools::build(historical);
    debug!("built reference and historical month pools");

    let ctx = Context {
        future,
        reference: &reference_pools,
        historical: &historical_pools,
        levels: probability_levels(config.nbins()),
        config,
    };

    let targets = config.first_target()..=config.last_target();
    let out_rows: Vec<usize> = (0..future.n_time())
        .filter(|&t| targets.contains(&future.years()[t]))
        .collect();
    let mut out_index = vec![None; future.n_time()];
    for (i, &t) in out_rows.iter().enumerate() {
        out_index[t] = Some(i);
    }
    let mut corrected = future.select_rows(&out_rows);
    corrected.values_mut().fill(f64::NAN);

    let mut corrected_years = Vec::new();
    let mut excluded_years = Vec::new();
    let mut issues = Vec::new();
    let total = windows.len();

    for (index, window) in windows.iter().enumerate() {
        let started = Instant::now();
        let mut n_issues = 0;

        if window.is_excluded() {
            excluded_years.push(window.target());
            debug!(year = window.target(), "excluded by window policy");
        } else {
            let units = work_units(std::slice::from_ref(window));
            let outputs = units
                .par_iter()
                .map(|unit| run_unit(unit, &ctx))
                .collect::<Result<Vec<_>, _>>()?;

            for out in outputs {
                for (i, &t) in out.rows.iter().enumerate() {
                    if let Some(dst) = out_index[t] {
                        corrected.values_mut().row_mut(dst).assign(&out.block.row(i));
                    }
                }
                n_issues += out.issues.iter().map(|i| i.count).sum::<usize>();
                issues.extend(out.issues);
            }
            corrected_years.push(window.target());
        }

        let report = YearProgress {
            year: window.target(),
            index,
            total,
            elapsed: started.elapsed(),
            n_issues,
        };
        debug!(
            year = report.year,
            elapsed_s = report.elapsed.as_secs_f64(),
            n_issues,
            "target year done"
        );
        progress(&report);
    }

    info!(
        corrected = corrected_years.len(),
        excluded = excluded_years.len(),
        issues = issues.len(),
        "rolling correction finished"
    );

    Ok(QdmResult::new(
        corrected,
        CorrectionReport::new(corrected_years, excluded_years, windows, issues),
    ))
}
