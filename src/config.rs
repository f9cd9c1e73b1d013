use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level Pluvio configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PluvioConfig {
    /// Global RNG seed for dry-value conditioning.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Worker threads; 0 lets rayon decide.
    #[serde(default)]
    pub threads: usize,

    /// I/O settings.
    #[serde(default)]
    pub io: IoToml,

    /// Rolling window settings.
    #[serde(default)]
    pub window: WindowToml,

    /// Quantile mapping settings.
    #[serde(default)]
    pub qdm: QdmToml,

    /// Dry-value handling.
    #[serde(default)]
    pub zero: ZeroToml,
}

impl PluvioConfig {
    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoToml {
    /// Reference (observation-like) file, e.g. WRF output.
    pub reference: Option<PathBuf>,
    #[serde(default = "default_reference_var")]
    pub reference_var: String,
    #[serde(default = "default_units")]
    pub reference_units: String,
    #[serde(default)]
    pub reference_factor: Option<f64>,
    /// Model-historical files; `--job N` picks one.
    #[serde(default)]
    pub historical: Vec<PathBuf>,
    #[serde(default = "default_model_var")]
    pub model_var: String,
    #[serde(default = "default_units")]
    pub model_units: String,
    #[serde(default)]
    pub model_factor: Option<f64>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_model_var")]
    pub output_var: String,
}

impl Default for IoToml {
    fn default() -> Self {
        Self {
            reference: None,
            reference_var: default_reference_var(),
            reference_units: default_units(),
            reference_factor: None,
            historical: Vec::new(),
            model_var: default_model_var(),
            model_units: default_units(),
            model_factor: None,
            output_dir: default_output_dir(),
            output_var: default_model_var(),
        }
    }
}

fn default_reference_var() -> String {
    "RAINNC".to_string()
}
fn default_model_var() -> String {
    "pr".to_string()
}
fn default_units() -> String {
    "auto".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowToml {
    #[serde(default = "default_half_window")]
    pub half_window: i32,
    #[serde(default = "default_policy")]
    pub policy: String,
    #[serde(default = "default_first_target")]
    pub first_target: i32,
    #[serde(default = "default_last_target")]
    pub last_target: i32,
    /// First year kept from the future file.
    #[serde(default = "default_future_start")]
    pub future_start: i32,
    /// Last year kept from the future file.
    #[serde(default = "default_last_target")]
    pub future_end: i32,
}

impl Default for WindowToml {
    fn default() -> Self {
        Self {
            half_window: default_half_window(),
            policy: default_policy(),
            first_target: default_first_target(),
            last_target: default_last_target(),
            future_start: default_future_start(),
            future_end: default_last_target(),
        }
    }
}

fn default_half_window() -> i32 {
    19
}
fn default_policy() -> String {
    "truncate".to_string()
}
fn default_first_target() -> i32 {
    2019
}
fn default_last_target() -> i32 {
    2100
}
fn default_future_start() -> i32 {
    2000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QdmToml {
    #[serde(default = "default_nbins")]
    pub nbins: usize,
    #[serde(default = "default_plotting_position")]
    pub plotting_position: String,
    /// Only used with `plotting_position = "custom"`.
    #[serde(default)]
    pub alphap: Option<f64>,
    #[serde(default)]
    pub betap: Option<f64>,
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    #[serde(default = "default_extrapolation")]
    pub extrapolation: String,
    #[serde(default = "default_min_denominator")]
    pub min_denominator: f64,
    #[serde(default = "default_degenerate")]
    pub degenerate: String,
}

impl Default for QdmToml {
    fn default() -> Self {
        Self {
            nbins: default_nbins(),
            plotting_position: default_plotting_position(),
            alphap: None,
            betap: None,
            min_samples: default_min_samples(),
            extrapolation: default_extrapolation(),
            min_denominator: default_min_denominator(),
            degenerate: default_degenerate(),
        }
    }
}

fn default_nbins() -> usize {
    1000
}
fn default_plotting_position() -> String {
    "cunnane".to_string()
}
fn default_min_samples() -> usize {
    2
}
fn default_extrapolation() -> String {
    "clamp".to_string()
}
fn default_min_denominator() -> f64 {
    1e-6
}
fn default_degenerate() -> String {
    "mark_missing".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZeroToml {
    /// Values at or below this are replaced with noise before correction.
    #[serde(default = "default_dry")]
    pub threshold: f64,
    /// Lower bound of the noise.
    #[serde(default = "default_noise_low")]
    pub low: f64,
    /// Corrected values at or below this are set to zero.
    #[serde(default = "default_dry")]
    pub dry_threshold: f64,
}

impl Default for ZeroToml {
    fn default() -> Self {
        Self {
            threshold: default_dry(),
            low: default_noise_low(),
            dry_threshold: default_dry(),
        }
    }
}

fn default_dry() -> f64 {
    0.05
}
fn default_noise_low() -> f64 {
    0.01
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: PluvioConfig = toml::from_str("").unwrap();
        assert_eq!(config.seed, None);
        assert_eq!(config.threads, 0);
        assert_eq!(config.io.reference_var, "RAINNC");
        assert_eq!(config.io.model_var, "pr");
        assert_eq!(config.window.half_window, 19);
        assert_eq!(config.window.first_target, 2019);
        assert_eq!(config.window.future_start, 2000);
        assert_eq!(config.window.future_end, 2100);
        assert_eq!(config.qdm.nbins, 1000);
        assert_eq!(config.qdm.extrapolation, "clamp");
        assert_eq!(config.zero.low, 0.01);
    }

    #[test]
    fn full_file_parses() {
        let text = r#"
            seed = 7
            threads = 4

            [io]
            reference = "/data/wrf.nc"
            historical = ["/m/a_historical.nc", "/m/b_historical.nc"]
            model_factor = 86400.0
            output_dir = "/out"

            [window]
            half_window = 15
            policy = "shift"
            first_target = 2030
            last_target = 2090

            [qdm]
            nbins = 500
            plotting_position = "custom"
            alphap = 0.3
            betap = 0.3
            extrapolation = "linear"

            [zero]
            dry_threshold = 0.1
        "#;
        let config: PluvioConfig = toml::from_str(text).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.threads, 4);
        assert_eq!(config.io.historical.len(), 2);
        assert_eq!(config.io.model_factor, Some(86400.0));
        assert_eq!(config.window.policy, "shift");
        assert_eq!(config.qdm.alphap, Some(0.3));
        assert_eq!(config.zero.dry_threshold, 0.1);
        assert_eq!(config.zero.threshold, 0.05);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let r: Result<PluvioConfig, _> = toml::from_str("[qdm]\nbins = 10\n");
        assert!(r.is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PluvioConfig::load(&dir.path().join("none.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config"));
    }
}
