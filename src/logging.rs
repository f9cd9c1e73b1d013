use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Workspace crates whose events are shown.
const CRATE_TARGETS: &[&str] = &[
    "pluvio",
    "pluvio_calendar",
    "pluvio_io",
    "pluvio_qdm",
    "pluvio_stats",
];

/// Maps the `-v` count to a level: none -> warn, `-v` -> info, `-vv` ->
/// debug, `-vvv` or more -> trace.
fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn default_directives(verbosity: u8) -> String {
    let level = level_for(verbosity);
    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing on stderr from the CLI verbosity level.
///
/// Stdout is left to command output (the `plan` table). From `-vv` on,
/// span close events report how long each command and file read took.
/// `RUST_LOG` overrides the CLI flag if set.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));
    let span_events = if verbosity >= 2 {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(span_events)
        .with_writer(std::io::stderr)
        .init();
}
