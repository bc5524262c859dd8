//! Logging setup on top of `tracing-subscriber`.
//!
//! `RUST_LOG` takes precedence over the configured level so individual
//! modules can be turned up without editing `config.toml`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

pub fn init_logging(settings: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if settings.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }

    tracing::info!(level = %settings.level, json = settings.json, "Logging initialized");
    Ok(())
}
