use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingSettings;
use crate::error::AppError;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), AppError> {
    let level = settings
        .level
        .parse::<tracing::Level>()
        .map_err(|_| AppError::ConfigError(format!("invalid logging.level: {}", settings.level)))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rwa_lending_core={}", level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match settings.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        "pretty" => registry.with(tracing_subscriber::fmt::layer().pretty()).try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer().compact()).try_init(),
    };
    result.map_err(|e| AppError::InternalError(format!("failed to install tracing subscriber: {}", e)))?;

    tracing::info!(level = %settings.level, format = %settings.format, "Logging initialized");
    Ok(())
}
