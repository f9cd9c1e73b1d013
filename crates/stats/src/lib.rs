//! Statistical helper functions shared by the Pluvio crates.

/// Returns the finite values of `data`, sorted ascending.
///
/// NaN and infinite values are dropped.
pub fn sorted_finite(data: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Fraction of finite values that are `<= threshold`. Returns 0.0 if there
/// are no finite values.
pub fn fraction_at_or_below(data: &[f64], threshold: f64) -> f64 {
    let (n, below) = data
        .iter()
        .filter(|x| x.is_finite())
        .fold((0usize, 0usize), |(n, below), &x| {
            (n + 1, below + usize::from(x <= threshold))
        });
    if n == 0 {
        0.0
    } else {
        below as f64 / n as f64
    }
}

/// Plotting-position sample quantile (Hyndman & Fan continuous family).
///
/// With `m = alphap + p (1 - alphap - betap)` and `aleph = n p + m`, the
/// result interpolates between the order statistics `x[k]` and `x[k+1]`
/// (1-based) where `k = floor(clamp(aleph, 1, n - 1))`. `(0.4, 0.4)` is
/// Cunnane, `(1, 1)` is R's type 7, `(0, 0)` is Weibull.
///
/// Probabilities outside `[0, 1]` are accepted; they clamp to the sample
/// minimum or maximum.
///
/// **Expects pre-sorted input** (caller's responsibility).
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn plotting_position_quantile(sorted: &[f64], p: f64, alphap: f64, betap: f64) -> f64 {
    assert!(
        !sorted.is_empty(),
        "plotting_position_quantile: input must not be empty"
    );
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let nf = n as f64;
    let m = alphap + p * (1.0 - alphap - betap);
    let aleph = nf * p + m;
    let k = aleph.clamp(1.0, nf - 1.0).floor();
    let gamma = (aleph - k).clamp(0.0, 1.0);
    let k = k as usize;
    let (lo, hi) = (sorted[k - 1], sorted[k]);
    // Written as an increment so equal neighbours give exactly `lo`.
    (lo + gamma * (hi - lo)).clamp(lo, hi)
}
