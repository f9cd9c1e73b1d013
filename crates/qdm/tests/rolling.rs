use approx::assert_relative_eq;
use pluvio_qdm::{
    GriddedSeries, IssueKind, QdmConfig, QdmError, SampleRole, WindowPolicy, correct_rolling,
    correct_sample, downscale,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Gamma};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DAYS_PER_MONTH: usize = 28;

/// Builds a `(time, cell)` series of Gamma(shape, scale) draws covering
/// `first..=last` with `DAYS_PER_MONTH` days in every month.
fn synthetic(
    first: i32,
    last: i32,
    n_cells: usize,
    shape: f64,
    scale: f64,
    seed: u64,
) -> GriddedSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Gamma::new(shape, scale).expect("valid gamma params");
    let mut data = Vec::new();
    let mut years = Vec::new();
    let mut months = Vec::new();
    for y in first..=last {
        for m in 1u8..=12 {
            for _ in 0..DAYS_PER_MONTH {
                for _ in 0..n_cells {
                    data.push(dist.sample(&mut rng));
                }
                years.push(y);
                months.push(m);
            }
        }
    }
    GriddedSeries::from_flat(data, n_cells, years, months).expect("valid series")
}

fn scaled(series: &GriddedSeries, factor: f64) -> GriddedSeries {
    let values = series.values().mapv(|v| v * factor);
    GriddedSeries::new(values, series.years().to_vec(), series.months().to_vec()).unwrap()
}

fn column_mean(series: &GriddedSeries, cell: usize) -> f64 {
    let col = series.cell(cell);
    let finite: Vec<f64> = col.iter().copied().filter(|v| v.is_finite()).collect();
    finite.iter().sum::<f64>() / finite.len() as f64
}

// ---------------------------------------------------------------------------
// 1. corrected_mean_tracks_scaled_reference
// ---------------------------------------------------------------------------
#[test]
fn corrected_mean_tracks_scaled_reference() {
    // ~10,000 days per input
    let historical = synthetic(1981, 2010, 1, 2.0, 2.0, 1);
    let reference = scaled(&historical, 1.5);
    let future = scaled(&synthetic(2000, 2100, 1, 2.0, 2.0, 2), 1.2);

    let config = QdmConfig::new();
    let result = correct_rolling(&reference, &historical, &future, &config, |_| {}).unwrap();

    let corrected_mean = column_mean(result.corrected(), 0);
    let expected = 1.2 * column_mean(&reference, 0);
    assert_relative_eq!(corrected_mean, expected, max_relative = 0.05);
    assert!(result.report().summary().is_clean());
}

// ---------------------------------------------------------------------------
// 2. independent_samples_preserve_relative_change
// ---------------------------------------------------------------------------
#[test]
fn independent_samples_preserve_relative_change() {
    let historical = synthetic(1981, 2010, 2, 2.0, 2.0, 11);
    let reference = synthetic(1981, 2010, 2, 2.0, 3.0, 12);
    let future = synthetic(2000, 2100, 2, 2.0, 2.4, 13);

    let config = QdmConfig::new().with_target_years(2040, 2060);
    let result = correct_rolling(&reference, &historical, &future, &config, |_| {}).unwrap();

    for cell in 0..2 {
        let corrected_mean = column_mean(result.corrected(), cell);
        let expected = 1.2 * column_mean(&reference, cell);
        assert_relative_eq!(corrected_mean, expected, max_relative = 0.10);
    }
}

// ---------------------------------------------------------------------------
// 3. output_covers_target_years_only
// ---------------------------------------------------------------------------
#[test]
fn output_covers_target_years_only() {
    let historical = synthetic(1990, 1999, 1, 1.5, 2.0, 3);
    let future = synthetic(2000, 2040, 1, 1.5, 2.0, 4);
    let config = QdmConfig::new()
        .with_nbins(100)
        .with_target_years(2019, 2022);

    let result = correct_rolling(&historical, &historical, &future, &config, |_| {}).unwrap();
    let corrected = result.corrected();
    assert_eq!(corrected.n_time(), 4 * 12 * DAYS_PER_MONTH);
    assert!(corrected.years().iter().all(|y| (2019..=2022).contains(y)));
    assert_eq!(result.report().corrected_years(), &[2019, 2020, 2021, 2022]);
}

// ---------------------------------------------------------------------------
// 4. identity_when_reference_equals_historical
// ---------------------------------------------------------------------------
#[test]
fn identity_when_reference_equals_historical() {
    let historical = synthetic(1990, 2009, 3, 1.5, 5.0, 5);
    let future = synthetic(2000, 2050, 3, 1.5, 6.0, 6);
    let config = QdmConfig::new().with_target_years(2020, 2025);

    let result = correct_rolling(&historical, &historical, &future, &config, |_| {}).unwrap();
    let expected = future.crop_years(2020, 2025).unwrap();
    for (c, f) in result.corrected().values().iter().zip(expected.values()) {
        assert_relative_eq!(*c, *f, max_relative = 1e-9);
    }
}

// ---------------------------------------------------------------------------
// 5. matches_one_dimensional_correction
// ---------------------------------------------------------------------------
#[test]
fn matches_one_dimensional_correction() {
    let reference = synthetic(1981, 2000, 2, 1.2, 3.0, 21);
    let historical = synthetic(1981, 2000, 2, 1.0, 2.5, 22);
    let future = synthetic(2000, 2100, 2, 1.0, 3.0, 23);
    let (cell, month) = (1, 7u8);
    let pick = |s: &GriddedSeries, first: i32, last: i32| -> Vec<f64> {
        s.rows_in(first, last, month)
            .into_iter()
            .map(|t| s.values()[[t, cell]])
            .collect()
    };

    // interior year, then both ends of the record under Truncate
    for (target, (first, last)) in [(2030, (2011, 2049)), (2019, (2000, 2038)), (2100, (2081, 2100))] {
        let config = QdmConfig::new()
            .with_nbins(200)
            .with_target_years(target, target);
        let result = correct_rolling(&reference, &historical, &future, &config, |_| {}).unwrap();
        assert_eq!(
            result.report().windows()[0].span(),
            Some((first, last)),
            "{target}"
        );

        let window_rows = future.rows_in(first, last, month);
        let direct = correct_sample(
            &pick(&reference, i32::MIN, i32::MAX),
            &pick(&historical, i32::MIN, i32::MAX),
            &pick(&future, first, last),
            &config,
        )
        .unwrap();

        let rolled: Vec<f64> = result
            .corrected()
            .rows_in(target, target, month)
            .iter()
            .map(|&t| result.corrected().values()[[t, cell]])
            .collect();
        let direct_target: Vec<f64> = window_rows
            .iter()
            .zip(direct)
            .filter(|(t, _)| future.years()[**t] == target)
            .map(|(_, v)| v)
            .collect();
        assert_eq!(rolled.len(), DAYS_PER_MONTH, "{target}");
        assert_eq!(rolled, direct_target, "{target}");
    }
}

// ---------------------------------------------------------------------------
// 6. exclude_policy_leaves_edge_years_missing
// ---------------------------------------------------------------------------
#[test]
fn exclude_policy_leaves_edge_years_missing() {
    let historical = synthetic(1990, 1999, 1, 1.5, 2.0, 7);
    let future = synthetic(2000, 2030, 1, 1.5, 2.0, 8);
    let config = QdmConfig::new()
        .with_nbins(50)
        .with_half_window(5)
        .with_window_policy(WindowPolicy::Exclude)
        .with_target_years(2020, 2030);

    let result = correct_rolling(&historical, &historical, &future, &config, |_| {}).unwrap();
    let report = result.report();
    assert_eq!(report.excluded_years(), &[2026, 2027, 2028, 2029, 2030]);
    assert_eq!(report.corrected_years().len(), 6);

    let corrected = result.corrected();
    for t in 0..corrected.n_time() {
        let v = corrected.values()[[t, 0]];
        if corrected.years()[t] >= 2026 {
            assert!(v.is_nan());
        } else {
            assert!(v.is_finite());
        }
    }
}

// ---------------------------------------------------------------------------
// 7. progress_reported_per_year
// ---------------------------------------------------------------------------
#[test]
fn progress_reported_per_year() {
    let historical = synthetic(1990, 1994, 1, 1.5, 2.0, 9);
    let future = synthetic(2000, 2025, 1, 1.5, 2.0, 10);
    let config = QdmConfig::new().with_nbins(20).with_target_years(2019, 2023);

    let mut seen = Vec::new();
    correct_rolling(&historical, &historical, &future, &config, |p| {
        seen.push((p.year, p.index, p.total));
    })
    .unwrap();
    assert_eq!(
        seen,
        vec![
            (2019, 0, 5),
            (2020, 1, 5),
            (2021, 2, 5),
            (2022, 3, 5),
            (2023, 4, 5)
        ]
    );
}

// ---------------------------------------------------------------------------
// 8. insufficient_cell_is_reported_not_fatal
// ---------------------------------------------------------------------------
#[test]
fn insufficient_cell_is_reported_not_fatal() {
    let historical = synthetic(1990, 1994, 2, 1.5, 2.0, 14);
    let mut reference = historical.clone();
    reference.values_mut().column_mut(1).fill(f64::NAN);
    let future = synthetic(2000, 2025, 2, 1.5, 2.0, 15);
    let config = QdmConfig::new().with_nbins(20).with_target_years(2020, 2020);

    let result = correct_rolling(&reference, &historical, &future, &config, |_| {}).unwrap();
    let summary = result.report().summary();
    assert_eq!(summary.affected_cells, 1);
    assert_eq!(summary.insufficient_data, 12 * DAYS_PER_MONTH);
    assert!(result.report().issues().iter().all(|i| i.cell == 1
        && i.kind == IssueKind::InsufficientData(SampleRole::Reference)));

    let corrected = result.corrected();
    assert!(corrected.cell(1).iter().all(|v| v.is_nan()));
    assert!(corrected.cell(0).iter().all(|v| v.is_finite()));
}

// ---------------------------------------------------------------------------
// 9. missing_target_year_is_fatal
// ---------------------------------------------------------------------------
#[test]
fn missing_target_year_is_fatal() {
    let historical = synthetic(1990, 1994, 1, 1.5, 2.0, 16);
    let full = synthetic(2000, 2030, 1, 1.5, 2.0, 17);
    let rows: Vec<usize> = (0..full.n_time())
        .filter(|&t| full.years()[t] != 2025)
        .collect();
    let values = full.values().select(ndarray::Axis(0), &rows);
    let years = rows.iter().map(|&t| full.years()[t]).collect();
    let months = rows.iter().map(|&t| full.months()[t]).collect();
    let gappy = GriddedSeries::new(values, years, months).unwrap();

    let config = QdmConfig::new().with_nbins(20).with_target_years(2020, 2030);
    let r = correct_rolling(&historical, &historical, &gappy, &config, |_| {});
    assert!(matches!(
        r,
        Err(QdmError::BoundaryWindow { year: 2025, .. })
    ));
}

// ---------------------------------------------------------------------------
// 10. seeded_downscale_is_reproducible
// ---------------------------------------------------------------------------
#[test]
fn seeded_downscale_is_reproducible() {
    let reference = synthetic(1990, 1999, 2, 0.6, 4.0, 18);
    let historical = synthetic(1990, 1999, 2, 0.6, 3.0, 19);
    let mut future = synthetic(2000, 2030, 2, 0.6, 3.5, 20);
    // make a third of the future dry
    future
        .values_mut()
        .iter_mut()
        .step_by(3)
        .for_each(|v| *v = 0.0);
    let config = QdmConfig::new().with_nbins(100).with_target_years(2019, 2021);

    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        downscale(&reference, &historical, &future, &config, &mut rng, |_| {})
            .unwrap()
            .into_parts()
            .0
    };
    let a = run(77);
    let b = run(77);
    assert_eq!(a.values(), b.values());
    assert!(a.values().iter().all(|&v| v == 0.0 || v > 0.05));
    assert!(a.values().iter().any(|&v| v == 0.0));
}
