//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Installs the global subscriber: `RUST_LOG`-style filtering from
/// [`Config::log_level`], human-readable or JSON lines per [`Config::log_format`].
///
/// # Errors
///
/// Fails if the filter directive is invalid or a global subscriber is
/// already installed.
pub fn init(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.log_format == "json" {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    } else {
        builder.try_init().map_err(|e| anyhow::anyhow!(e))?;
    }

    Ok(())
}
