//! Tracing subscriber setup for the `classsync` binary.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LogFormat};

/// Builds the filter: `RUST_LOG` wins over the configured directive.
fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> anyhow::Result<()> {
    let builder = fmt().with_env_filter(env_filter(config)).with_target(false);
    match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))
}
