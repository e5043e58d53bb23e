//! Logging setup for imagenotes.
//!
//! All output goes to stderr so that `imgnote render` and `imgnote list` can
//! be piped. `RUST_LOG` replaces the filter derived from the CLI flags.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Target prefix of every event emitted by this crate.
const CRATE_TARGET: &str = "imagenotes";

/// How much the CLI should log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Warnings and errors.
    #[default]
    Normal,
    /// Debug output (`-v`).
    Verbose,
    /// Everything (`-vv` and up).
    Trace,
}

impl Verbosity {
    /// Map the CLI's `-q` and `-v` counters to a verbosity. `-q` wins.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// The most detailed level let through.
    #[must_use]
    pub fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::WARN,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Filter directive scoping [`Verbosity::level`] to this crate.
    #[must_use]
    pub fn directive(self) -> String {
        let name = match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
            Self::Trace => "trace",
        };
        format!("{CRATE_TARGET}={name}")
    }
}

/// Build the event filter: `rust_log` when it parses, else `verbosity`.
fn build_filter(verbosity: Verbosity, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity.directive()))
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed, in which case
/// the existing one is kept.
///
/// # Examples
///
/// ```no_run
/// use imagenotes::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) -> bool {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbosity, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .is_ok()
}

/// Route events to the test harness's captured output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(Verbosity::Verbose.directive())
        .with_test_writer()
        .try_init();
}
