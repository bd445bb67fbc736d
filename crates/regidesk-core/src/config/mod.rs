//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod session;
pub mod storage;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::session::SessionConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session lifecycle settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Durable storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `REGIDESK_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("REGIDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_materialize_without_files() {
        let config = AppConfig::default();
        assert_eq!(config.session.inactivity_timeout_minutes, 30);
        assert_eq!(config.session.warning_window_seconds, 300);
        assert_eq!(config.session.token_poll_interval_seconds, 60);
        assert_eq!(config.storage.data_root, "data");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "session": { "inactivity_timeout_minutes": 10 }
        }))
        .expect("deserialize");
        assert_eq!(config.session.inactivity_timeout_minutes, 10);
        assert_eq!(config.session.warning_window_seconds, 300);
        assert_eq!(config.logging.level, "info");
    }
}
