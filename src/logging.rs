//! Tracing subscriber setup.
//!
//! Logs go to stderr so command output on stdout stays parseable.
//! `RUST_LOG` takes precedence over `[logging].level`.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` if set, else `<level>` for dependencies
/// and this crate alike.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(format!(
        "{level},umkm_rag={level},tower_http={level}",
        level = config.level
    ))
    .map_err(|e| anyhow!("invalid logging.level '{}': {}", config.level, e))
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))?;

    tracing::debug!(level = %config.level, json = config.json, "logging initialized");
    Ok(())
}
