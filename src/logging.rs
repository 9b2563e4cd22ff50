//! Tracing subscriber setup for the command-line tool.
//!
//! The library itself only emits events; installing a subscriber is left to
//! the binary (or to the embedding application).

use tracing_subscriber::EnvFilter;

/// Environment variable holding an explicit filter directive, e.g.
/// `UPDATE_CONF_LOG=update_conf=debug`.
pub const LOG_ENV: &str = "UPDATE_CONF_LOG";

/// Level used when `UPDATE_CONF_LOG` is unset, from the number of `-v` flags.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr subscriber without timestamps.
///
/// `UPDATE_CONF_LOG` takes precedence over `verbosity`. Calling this more
/// than once is harmless; later calls keep the first subscriber.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
