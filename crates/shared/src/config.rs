//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Leave rules configuration.
    #[serde(default)]
    pub leave: LeaveConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Leave rules configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveConfig {
    /// Applications longer than this many working days need HR sign-off.
    #[serde(default = "default_hr_approval_threshold")]
    pub hr_approval_threshold_days: Decimal,
    /// Accept applications whose start date is already in the past.
    #[serde(default)]
    pub allow_backdated: bool,
}

fn default_hr_approval_threshold() -> Decimal {
    Decimal::from(5)
}

impl Default for LeaveConfig {
    fn default() -> Self {
        Self {
            hr_approval_threshold_days: default_hr_approval_threshold(),
            allow_backdated: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "leavedesk=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("LEAVEDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
