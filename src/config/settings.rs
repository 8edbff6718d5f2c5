use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::AppError;
use crate::services::market_data_service::SAMPLE_ACCOUNT;

/// Optional settings file, relative to the working directory (extension resolved by `config`).
pub const CONFIG_FILE: &str = "config/rwa";
/// Prefix of environment overrides, e.g. `RWA__LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "RWA";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub wallet: WalletSettings,
    pub onboarding: OnboardingSettings,
    pub data: DataSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// One of `compact`, `pretty`, `json`.
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletSettings {
    pub connect_delay_ms: u64,
    pub simulated_address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingSettings {
    pub enforce_required_fields: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// JSON market snapshot; the built-in sample catalog is used when unset.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for WalletSettings {
    fn default() -> Self {
        WalletSettings {
            connect_delay_ms: 1500,
            simulated_address: SAMPLE_ACCOUNT.to_string(),
        }
    }
}

impl Settings {
    /// Defaults, overlaid by `config/rwa.*` when present, overlaid by `RWA__*` variables.
    pub fn new() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::load(Some(CONFIG_FILE))
    }

    pub fn load(file: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        match self.logging.format.as_str() {
            "compact" | "pretty" | "json" => {}
            other => {
                return Err(AppError::ConfigError(format!(
                    "logging.format must be compact, pretty or json, got {}",
                    other
                )))
            }
        }
        if self.wallet.simulated_address.trim().is_empty() {
            return Err(AppError::ConfigError("wallet.simulated_address must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.wallet.connect_delay_ms, 1500);
        assert!(!settings.onboarding.enforce_required_fields);
        assert!(settings.data.snapshot_path.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rwa.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[wallet]\nconnect_delay_ms = 10\n\n[onboarding]\nenforce_required_fields = true").unwrap();

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.wallet.connect_delay_ms, 10);
        assert!(settings.onboarding.enforce_required_fields);
        assert_eq!(settings.logging.format, "compact");
    }

    #[test]
    fn test_invalid_format_rejected() {
        let mut settings = Settings::default();
        settings.logging.format = "xml".to_string();
        assert!(matches!(settings.validate(), Err(AppError::ConfigError(_))));
    }
}
