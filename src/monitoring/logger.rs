use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::MonitoringConfig;

/// Install the global subscriber. `RUST_LOG` wins over the configured level;
/// `verbose` forces debug for this crate.
pub fn init_logging(config: &MonitoringConfig, verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new(format!("{},thetagang_wheel=debug", config.log_level))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if config.json_logs {
        builder
            .json()
            .with_file(true)
            .with_line_number(true)
            .try_init()
    } else {
        builder.compact().try_init()
    }
    .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(())
}
