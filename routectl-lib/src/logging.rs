use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub type FileFmtLayer =
    fmt::Layer<tracing_subscriber::Registry, fmt::format::DefaultFields, fmt::format::Format, BoxMakeWriter>;

/// Kept quiet so command output on stdout is not interleaved with log lines.
const DEFAULT_LOG_FILTER: &str = "warn";
pub const ENV_VAR_LOG_FILE: &str = "ROUTECTL_LOG_FILE";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Creates a [`FileFmtLayer`] appending to the file at `log_path`, with ANSI
/// colors disabled.
///
/// # Errors
///
/// Fails if the log file cannot be opened or created.
pub fn make_file_fmt_layer(log_path: &Path) -> io::Result<FileFmtLayer> {
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;
    Ok(fmt::layer().with_writer(BoxMakeWriter::new(file)).with_ansi(false))
}

/// Initializes the global `tracing` subscriber writing to the file at `log_path`.
///
/// Verbosity is read from `RUST_LOG` and defaults to `"warn"`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn setup_log_file(log_path: &Path) -> io::Result<()> {
    let layer = make_file_fmt_layer(log_path)?;
    tracing_subscriber::registry().with(layer).with(env_filter()).init();
    tracing::debug!("logging initialized with file output: {}", log_path.display());
    Ok(())
}

/// Initializes the global `tracing` subscriber writing to stderr.
///
/// Verbosity is read from `RUST_LOG` and defaults to `"warn"`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn setup_stderr() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_ansi(true))
        .with(env_filter())
        .init();
    tracing::debug!("logging initialized with stderr output");
}
