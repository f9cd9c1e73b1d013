//! Correct command: downscale one model run onto the reference grid.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, info_span, warn};

use pluvio_io::{
    GridFile, ReaderConfig, check_same_grid, future_path_for, output_path, read_gridded,
    validate_grid_file, write_gridded,
};
use pluvio_qdm::downscale;

use crate::cli::CorrectArgs;
use crate::config::PluvioConfig;
use crate::convert;

/// Run the correction pipeline for the historical input selected by `--job`.
pub fn run(args: CorrectArgs) -> Result<()> {
    let _cmd = info_span!("correct", job = args.job).entered();

    // 1. Load config and apply CLI overrides
    let mut config = PluvioConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(dir) = args.output_dir {
        config.io.output_dir = dir;
    }

    // 2. Resolve input paths
    let historical_path = select_input(&args.inputs, &config.io.historical, args.job)?;
    let future_path = future_path_for(&historical_path)?;
    let reference_path = config
        .io
        .reference
        .clone()
        .ok_or_else(|| anyhow!("no reference path: set [io].reference in config"))?;

    // 3. Build library configs
    let qdm_cfg = convert::build_qdm_config(&config)?;
    let reference_reader = convert::build_reference_reader(&config.io)?;
    let model_reader = convert::build_model_reader(&config.io)?;

    if config.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build_global()
            .context("failed to configure the thread pool")?;
    }

    // 4. Read and check inputs
    let reference_file = read_input("reference", &reference_path, &reference_reader)?;
    let historical_file = read_input("historical", &historical_path, &model_reader)?;
    let future_file = read_input("future", &future_path, &model_reader)?;
    check_same_grid(&[
        ("reference", &reference_file),
        ("historical", &historical_file),
        ("future", &future_file),
    ])?;

    let (future_start, future_end) = (config.window.future_start, config.window.future_end);
    let reference = convert::to_series(&reference_file)?;
    let historical = convert::to_series(&historical_file)?;
    let future = convert::to_series(&future_file)?
        .crop_years(future_start, future_end)
        .with_context(|| {
            format!("future file has no data in {future_start}..={future_end}")
        })?;
    info!(
        n_cells = reference.n_cells(),
        reference_days = reference.n_time(),
        historical_days = historical.n_time(),
        future_days = future.n_time(),
        "inputs loaded"
    );

    // 5. Correct
    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let started = Instant::now();
    let result = downscale(&reference, &historical, &future, &qdm_cfg, &mut rng, |p| {
        info!(
            year = p.year,
            done = p.index + 1,
            total = p.total,
            elapsed_s = p.elapsed.as_secs_f64(),
            issues = p.n_issues,
            "year corrected"
        );
    })
    .context("correction failed")?;

    let report = result.report();
    if !report.excluded_years().is_empty() {
        warn!(
            years = ?report.excluded_years(),
            "years left uncorrected by the window policy"
        );
    }
    let summary = report.summary();
    if !summary.is_clean() {
        warn!(
            insufficient_data = summary.insufficient_data,
            out_of_domain = summary.out_of_domain,
            degenerate_ratio = summary.degenerate_ratio,
            affected_cells = summary.affected_cells,
            "correction finished with per-cell issues"
        );
    }

    // 6. Write output on the reference grid with the future time axis
    let (first, last) = (qdm_cfg.first_target(), qdm_cfg.last_target());
    let rows = future_file
        .time()
        .indices_in_years(first.max(future_start), last.min(future_end));
    let time = future_file.time().select(&rows);
    let corrected = result.corrected();
    if time.len() != corrected.n_time() {
        bail!(
            "output time axis has {} steps but {} corrected rows",
            time.len(),
            corrected.n_time()
        );
    }
    let data: Vec<f64> = corrected.values().iter().copied().collect();

    std::fs::create_dir_all(&config.io.output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            config.io.output_dir.display()
        )
    })?;
    let out = output_path(&config.io.output_dir, &future_path, first, last)?;
    let history = format!(
        "rolling-window QDM of {} against {}",
        future_path.display(),
        reference_path.display()
    );
    write_gridded(
        &out,
        reference_file.grid(),
        &time,
        &data,
        &convert::build_writer_config(&config.io, &history),
    )
    .with_context(|| format!("failed to write NetCDF: {}", out.display()))?;

    info!(
        path = %out.display(),
        elapsed_s = started.elapsed().as_secs_f64(),
        "correction complete"
    );
    Ok(())
}

/// Pick the historical input for `job`, preferring CLI inputs over config.
fn select_input(cli: &[PathBuf], config: &[PathBuf], job: usize) -> Result<PathBuf> {
    let inputs = if cli.is_empty() { config } else { cli };
    if inputs.is_empty() {
        bail!("no historical inputs: pass paths on the command line or set [io].historical");
    }
    inputs.get(job).cloned().ok_or_else(|| {
        anyhow!(
            "job {job} is out of range: {} historical input(s) given",
            inputs.len()
        )
    })
}

/// Read one input and run the file-level checks on it.
fn read_input(label: &str, path: &Path, reader: &ReaderConfig) -> Result<GridFile> {
    info!(label, path = %path.display(), "reading input");
    let file = read_gridded(path, reader)
        .with_context(|| format!("failed to read {label} NetCDF: {}", path.display()))?;
    validate_grid_file(&file).with_context(|| format!("invalid {label} file: {}", path.display()))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn cli_inputs_take_precedence() {
        let cli = paths(&["cli_historical.nc"]);
        let cfg = paths(&["a_historical.nc", "b_historical.nc"]);
        assert_eq!(
            select_input(&cli, &cfg, 0).unwrap(),
            PathBuf::from("cli_historical.nc")
        );
        assert_eq!(
            select_input(&[], &cfg, 1).unwrap(),
            PathBuf::from("b_historical.nc")
        );
    }

    #[test]
    fn job_out_of_range_is_an_error() {
        let cfg = paths(&["a_historical.nc"]);
        let err = select_input(&[], &cfg, 3).unwrap_err();
        assert!(err.to_string().contains("job 3 is out of range"));
        assert!(select_input(&[], &[], 0).is_err());
    }
}
