//! Gridded daily series with calendar labels.

use ndarray::{Array2, ArrayView1, Axis};
use rand::Rng;

use crate::condition::condition_value;
use crate::config::ZeroInflation;
use crate::error::QdmError;
use crate::postprocess::floor_value;

/// A `(time, cell)` array of daily values with the calendar year and month
/// of every time step.
///
/// The two spatial axes of a grid are flattened row-major into `cell`.
/// Time steps are expected in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedSeries {
    values: Array2<f64>,
    years: Vec<i32>,
    months: Vec<u8>,
}

impl GriddedSeries {
    /// Creates a series, validating its labels.
    ///
    /// # Errors
    ///
    /// - [`QdmError::EmptyData`] if there are no time steps or no cells.
    /// - [`QdmError::LengthMismatch`] if the labels do not match the rows.
    /// - [`QdmError::InvalidMonth`] if a month is outside 1..=12.
    pub fn new(values: Array2<f64>, years: Vec<i32>, months: Vec<u8>) -> Result<Self, QdmError> {
        let (n_time, n_cells) = values.dim();
        if n_time == 0 || n_cells == 0 {
            return Err(QdmError::EmptyData);
        }
        if years.len() != n_time || months.len() != n_time {
            return Err(QdmError::LengthMismatch {
                values_len: n_time,
                years_len: years.len(),
                months_len: months.len(),
            });
        }
        if let Some(&month) = months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(QdmError::InvalidMonth { month });
        }
        Ok(Self {
            values,
            years,
            months,
        })
    }

    /// Creates a series from row-major `(time, cell)` data.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new); additionally [`QdmError::LengthMismatch`] if
    /// `data.len()` is not `years.len() * n_cells`.
    pub fn from_flat(
        data: Vec<f64>,
        n_cells: usize,
        years: Vec<i32>,
        months: Vec<u8>,
    ) -> Result<Self, QdmError> {
        if n_cells == 0 || data.is_empty() {
            return Err(QdmError::EmptyData);
        }
        if data.len() % n_cells != 0 {
            return Err(QdmError::LengthMismatch {
                values_len: data.len() / n_cells,
                years_len: years.len(),
                months_len: months.len(),
            });
        }
        let n_time = data.len() / n_cells;
        let values = Array2::from_shape_vec((n_time, n_cells), data).map_err(|_| {
            QdmError::LengthMismatch {
                values_len: n_time,
                years_len: years.len(),
                months_len: months.len(),
            }
        })?;
        Self::new(values, years, months)
    }

    /// Number of time steps.
    pub fn n_time(&self) -> usize {
        self.values.nrows()
    }

    /// Number of grid cells.
    pub fn n_cells(&self) -> usize {
        self.values.ncols()
    }

    /// The `(time, cell)` values.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Mutable access to the values. Labels cannot be changed.
    pub fn values_mut(&mut self) -> &mut Array2<f64> {
        &mut self.values
    }

    /// Consumes the series and returns the value array.
    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Calendar year of every time step.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Calendar month of every time step.
    pub fn months(&self) -> &[u8] {
        &self.months
    }

    /// The time series of one cell.
    pub fn cell(&self, cell: usize) -> ArrayView1<'_, f64> {
        self.values.column(cell)
    }

    /// First and last year present.
    pub fn year_range(&self) -> (i32, i32) {
        let first = self.years.iter().copied().min().unwrap_or_default();
        let last = self.years.iter().copied().max().unwrap_or_default();
        (first, last)
    }

    /// Indices of the time steps whose year lies in `first..=last` and whose
    /// month is `month`.
    pub fn rows_in(&self, first: i32, last: i32, month: u8) -> Vec<usize> {
        (0..self.n_time())
            .filter(|&t| self.months[t] == month && (first..=last).contains(&self.years[t]))
            .collect()
    }

    /// Returns the time steps whose year lies in `first..=last`.
    ///
    /// # Errors
    ///
    /// Returns [`QdmError::EmptyData`] if no time step is selected.
    pub fn crop_years(&self, first: i32, last: i32) -> Result<Self, QdmError> {
        let rows: Vec<usize> = (0..self.n_time())
            .filter(|&t| (first..=last).contains(&self.years[t]))
            .collect();
        if rows.is_empty() {
            return Err(QdmError::EmptyData);
        }
        Ok(self.select_rows(&rows))
    }

    pub(crate) fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            values: self.values.select(Axis(0), rows),
            years: rows.iter().map(|&t| self.years[t]).collect(),
            months: rows.iter().map(|&t| self.months[t]).collect(),
        }
    }

    /// Replaces every value at or below the dry threshold with uniform noise.
    /// Returns the number of replaced values.
    pub fn condition_zeros<R: Rng + ?Sized>(&mut self, zero: &ZeroInflation, rng: &mut R) -> usize {
        self.values
            .iter_mut()
            .map(|v| usize::from(condition_value(v, zero, rng)))
            .sum()
    }

    /// Sets every value at or below `threshold` to exactly zero. Returns the
    /// number of changed values.
    pub fn floor_to_zero(&mut self, threshold: f64) -> usize {
        self.values
            .iter_mut()
            .map(|v| usize::from(floor_value(v, threshold)))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small() -> GriddedSeries {
        // 4 time steps, 2 cells
        GriddedSeries::from_flat(
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
            2,
            vec![2000, 2000, 2001, 2002],
            vec![1, 2, 1, 1],
        )
        .unwrap()
    }

    #[test]
    fn from_flat_layout() {
        let s = small();
        assert_eq!((s.n_time(), s.n_cells()), (4, 2));
        assert_eq!(s.values()[[2, 1]], 5.0);
        assert_eq!(s.cell(0).to_vec(), vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn rejects_empty() {
        let r = GriddedSeries::from_flat(vec![], 2, vec![], vec![]);
        assert!(matches!(r, Err(QdmError::EmptyData)));
    }

    #[test]
    fn rejects_label_mismatch() {
        let r = GriddedSeries::from_flat(vec![1.0, 2.0], 1, vec![2000], vec![1, 1]);
        assert!(matches!(r, Err(QdmError::LengthMismatch { .. })));
    }

    #[test]
    fn rejects_ragged_data() {
        let r = GriddedSeries::from_flat(vec![1.0, 2.0, 3.0], 2, vec![2000], vec![1]);
        assert!(matches!(r, Err(QdmError::LengthMismatch { .. })));
    }

    #[test]
    fn rejects_invalid_month() {
        let r = GriddedSeries::from_flat(vec![1.0], 1, vec![2000], vec![13]);
        assert!(matches!(r, Err(QdmError::InvalidMonth { month: 13 })));
    }

    #[test]
    fn rows_and_crop() {
        let s = small();
        assert_eq!(s.rows_in(2000, 2001, 1), vec![0, 2]);
        assert_eq!(s.year_range(), (2000, 2002));

        let c = s.crop_years(2001, 2002).unwrap();
        assert_eq!(c.years(), &[2001, 2002]);
        assert_eq!(c.values()[[0, 0]], 4.0);
        assert!(matches!(s.crop_years(1990, 1995), Err(QdmError::EmptyData)));
    }

    #[test]
    fn condition_and_floor() {
        let mut s = small();
        let mut rng = StdRng::seed_from_u64(1);
        let n = s.condition_zeros(&ZeroInflation::new(), &mut rng);
        assert_eq!(n, 1);
        let v = s.values()[[0, 0]];
        assert!(v > 0.01 && v < 0.05);

        assert_eq!(s.floor_to_zero(0.05), 1);
        assert_eq!(s.values()[[0, 0]], 0.0);
    }
}
