//! Configuration for parto-import

mod database;
mod input;
mod logging;

pub use database::{DatabaseConfig, PASSWORD_ENV_VAR};
pub use input::{InputConfig, DEFAULT_TOP_DESTINATIONS};
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "parto-import.toml";

/// Main configuration for an import run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database connection
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Static input files
    #[serde(default)]
    pub input: InputConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Every problem is collected and reported together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Database validation
        let endpoint = self.database.endpoint.trim();
        if endpoint.is_empty() {
            errors.push("database endpoint must not be empty".to_string());
        } else if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            errors.push(format!(
                "database endpoint must start with http:// or https:// (got '{}')",
                endpoint
            ));
        }
        if self.database.database.trim().is_empty() {
            errors.push("database name must not be empty".to_string());
        }
        if self.database.username.trim().is_empty() {
            errors.push("database username must not be empty".to_string());
        }
        if self.database.batch_size == 0 {
            errors.push("database batch_size must be positive".to_string());
        }
        if self.database.timeout_secs == 0 {
            errors.push("database timeout_secs must be positive".to_string());
        }

        // Input validation
        if self.input.base_path.as_os_str().is_empty() {
            errors.push("input base_path must not be empty".to_string());
        }
        if self.input.hotel_shard_filter.is_empty() {
            errors.push("input hotel_shard_filter must not be empty".to_string());
        }
        if self.input.facility_shard_filter.is_empty() {
            errors.push("input facility_shard_filter must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }

    /// Commented template written by `parto-import init`
    pub fn template() -> String {
        let config = Config::default();
        let top = config
            .input
            .top_destinations
            .iter()
            .map(|d| format!("\"{}\"", d))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"# parto-import configuration

[database]
endpoint = "{endpoint}"
database = "{database}"
username = "{username}"
# password = "secret"  # or set {env}
timeout_secs = {timeout}
batch_size = {batch}
# Commit each entity batch and its lookup batch in one stream transaction
transactional = {transactional}

[input]
# Directory containing Country.json, PropertyCity.json, Property_*.json, ...
base_path = "{base_path}"
hotel_shard_filter = "{hotel_filter}"
facility_shard_filter = "{facility_filter}"
top_destinations = [{top}]

[logging]
level = "info"
format = "text"
"#,
            endpoint = config.database.endpoint,
            database = config.database.database,
            username = config.database.username,
            env = PASSWORD_ENV_VAR,
            timeout = config.database.timeout_secs,
            batch = config.database.batch_size,
            transactional = config.database.transactional,
            base_path = config.input.base_path.display(),
            hotel_filter = config.input.hotel_shard_filter,
            facility_filter = config.input.facility_shard_filter,
            top = top,
        )
    }
}
