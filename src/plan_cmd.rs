//! Plan command: print which years feed each target year's window.

use anyhow::{Context, Result};
use tracing::info_span;

use pluvio_qdm::{YearWindow, plan_windows};

use crate::cli::PlanArgs;
use crate::config::PluvioConfig;
use crate::convert;

/// Print the window table for the configured target years, assuming the
/// future record spans `[window].future_start..=future_end`.
pub fn run(args: PlanArgs) -> Result<()> {
    let _cmd = info_span!("plan").entered();
    let config = PluvioConfig::load(&args.config)?;
    let qdm_cfg = convert::build_qdm_config(&config)?;
    let record = (config.window.future_start, config.window.future_end);

    let windows = plan_windows(&qdm_cfg, record).context("cannot plan windows")?;
    for line in render(&windows) {
        println!("{line}");
    }
    Ok(())
}

fn render(windows: &[YearWindow]) -> Vec<String> {
    let mut lines = vec![format!("{:<8}{:<13}{}", "target", "window", "years")];
    for w in windows {
        lines.push(match w.span() {
            Some((a, b)) => format!("{:<8}{:<13}{}", w.target(), format!("{a}-{b}"), w.n_years()),
            None => format!("{:<8}excluded", w.target()),
        });
    }
    lines
}
