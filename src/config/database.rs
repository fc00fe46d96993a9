//! Database connection configuration

use serde::{Deserialize, Serialize};

/// Environment variable consulted when no password is configured
pub const PASSWORD_ENV_VAR: &str = "PARTO_DB_PASSWORD";

/// ArangoDB connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Server endpoint (e.g., "http://localhost:8529")
    pub endpoint: String,
    /// Database name
    pub database: String,
    /// Basic-auth user
    pub username: String,
    /// Basic-auth password (falls back to PARTO_DB_PASSWORD)
    pub password: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum documents sent per insert request
    pub batch_size: usize,
    /// Wrap each entity/lookup insert pair in a stream transaction
    pub transactional: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8529".to_string(),
            database: "yiata".to_string(),
            username: "root".to_string(),
            password: None,
            timeout_secs: 30,
            batch_size: 5000,
            transactional: true,
        }
    }
}

impl DatabaseConfig {
    /// Configured password, or the value of `PARTO_DB_PASSWORD`
    pub fn resolve_password(&self) -> Option<String> {
        self.password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV_VAR).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_password_wins_over_environment() {
        let cfg = DatabaseConfig {
            password: Some("from-config".to_string()),
            ..DatabaseConfig::default()
        };
        assert_eq!(cfg.resolve_password().as_deref(), Some("from-config"));
    }

    #[test]
    fn default_database_values() {
        let cfg = DatabaseConfig::default();
        assert_eq!(cfg.endpoint, "http://localhost:8529");
        assert_eq!(cfg.database, "yiata");
        assert_eq!(cfg.username, "root");
        assert_eq!(cfg.batch_size, 5000);
        assert!(cfg.transactional);
    }
}
