//! Console and file logging for the CLI.
//!
//! Library and CLI code log through `tracing` macros; this module installs the
//! global subscriber once at startup.

use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Environment variable holding an explicit filter directive, e.g.
/// `BANDWAGON_LOG=bandwagon=debug`. It wins over `-v`/`-q`.
pub const LOG_ENV_VAR: &str = "BANDWAGON_LOG";

pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbosity) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    }
}

fn build_filter(verbosity: u8, quiet: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level_for(verbosity, quiet).into()))
}

/// Plain-text layer writing every event, with targets and thread ids, to `path`.
fn file_layer<S>(path: &Path) -> Result<fmt::Layer<S, DefaultFields, Format, File>> {
    let file = File::create(path).map_err(CliError::Io)?;
    Ok(fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true))
}

/// Installs the global subscriber: compact stderr output filtered by
/// verbosity, plus a log file when `log_file` is given.
///
/// # Errors
///
/// Returns [`CliError::Io`] when the log file cannot be created, or
/// [`CliError::Other`] when a global subscriber is already installed.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<impl AsRef<Path>>) -> Result<()> {
    let file_layer = log_file.map(|path| file_layer(path.as_ref())).transpose()?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(build_filter(verbosity, quiet))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::PathBuf;
    use std::sync::Once;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0, false), LevelFilter::WARN);
        assert_eq!(level_for(1, false), LevelFilter::INFO);
        assert_eq!(level_for(2, false), LevelFilter::DEBUG);
        assert_eq!(level_for(7, false), LevelFilter::TRACE);
        assert_eq!(level_for(3, true), LevelFilter::ERROR);
    }

    #[test]
    #[serial]
    fn global_logger_accepts_events() {
        INIT.call_once(|| {
            setup_logging(3, false, None::<PathBuf>).expect("Failed to set up global logger for tests");
        });

        error!("Unknown restriction enzyme 'Foo'");
        warn!("No font found; PNG text is skipped");
        info!("Digesting 2 record(s)");
        debug!(bands = 3, "Annotated digestion bands");
        trace!("Computed tick positions");
    }

    #[test]
    #[serial]
    fn file_layer_writes_events_to_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("bandwagon.log");

        let subscriber = tracing_subscriber::registry().with(file_layer(&log_path).unwrap());
        tracing::subscriber::with_default(subscriber, || {
            debug!("Wrote 1 page(s) to 'report.html'.");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Wrote 1 page(s) to 'report.html'."));
        assert!(content.contains("DEBUG"));
        assert!(content.contains("ThreadId"));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_is_an_io_error() {
        let directory = PathBuf::from("/");
        if cfg!(unix) && directory.is_dir() {
            let result = setup_logging(0, false, Some(&directory));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
