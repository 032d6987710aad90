//! Logging Configuration
//!
//! Installs the `env_logger` backend for the `log` facade and provides a
//! small timer for bootstrap steps.

use std::ffi::OsString;
use std::time::{Duration, Instant};

/// Environment variable holding an `env_logger` filter spec
pub const LOG_ENV: &str = "STRATA_LOG";

/// Install the global logger.
///
/// Level defaults to `warn`, `debug` when `--debug` was given. A filter in
/// `STRATA_LOG` is applied on top. Calling this twice is harmless.
pub fn init(debug: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(if debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr);

    if let Ok(spec) = std::env::var(LOG_ENV) {
        builder.parse_filters(&spec);
    }

    let _ = builder.try_init();
}

/// Whether `--debug` appears in the raw arguments.
///
/// Runs before clap, so it cannot tell a `--debug` given as another flag's
/// value (`--address --debug`) from the switch. Scanning stops at `--`.
pub fn debug_requested(args: &[OsString]) -> bool {
    args.iter()
        .skip(1)
        .take_while(|arg| *arg != "--")
        .any(|arg| arg == "--debug")
}

/// Timer utility for measuring operation duration
pub struct Timer {
    start: Instant,
    operation_name: String,
}

impl Timer {
    /// Start a new timer
    pub fn start(operation_name: &str) -> Self {
        Self {
            start: Instant::now(),
            operation_name: operation_name.to_string(),
        }
    }

    /// Stop the timer, log the elapsed time and return it
    pub fn stop(self, success: bool) -> Duration {
        let duration = self.start.elapsed();
        log::debug!(
            "{} {} in {:?}",
            self.operation_name,
            if success { "finished" } else { "failed" },
            duration
        );
        duration
    }
}
