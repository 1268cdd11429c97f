//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Check run policy configuration.
    #[serde(default)]
    pub check_run: CheckRunConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Check run policy configuration.
///
/// These values are fixed per deployment; changing them between a run and
/// its reprint changes the printed output, so treat them as audit-relevant.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CheckRunConfig {
    /// Bank routing number the MICR line is bound to.
    #[serde(default = "default_bank_routing_number")]
    pub bank_routing_number: String,
    /// Maximum number of reprints allowed for a single run.
    #[serde(default = "default_max_reprint_count")]
    pub max_reprint_count: i32,
    /// Maximum width of the payable name field, in characters.
    #[serde(default = "default_max_payable_name_length")]
    pub max_payable_name_length: usize,
    /// Placeholder used when a distribution has no usable payee name.
    #[serde(default = "default_payable_name")]
    pub default_payable_name: String,
}

fn default_bank_routing_number() -> String {
    "026004297".to_string()
}

fn default_max_reprint_count() -> i32 {
    2
}

fn default_max_payable_name_length() -> usize {
    84
}

fn default_payable_name() -> String {
    "PAYEE".to_string()
}

impl Default for CheckRunConfig {
    fn default() -> Self {
        Self {
            bank_routing_number: default_bank_routing_number(),
            max_reprint_count: default_max_reprint_count(),
            max_payable_name_length: default_max_payable_name_length(),
            default_payable_name: default_payable_name(),
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
                config::Environment::with_prefix("CHECKRUN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_run_defaults() {
        let config = CheckRunConfig::default();
        assert_eq!(config.bank_routing_number, "026004297");
        assert_eq!(config.max_reprint_count, 2);
        assert_eq!(config.max_payable_name_length, 84);
        assert_eq!(config.default_payable_name, "PAYEE");
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("CHECKRUN__DATABASE__URL", Some("postgres://localhost/checks")),
                ("CHECKRUN__CHECK_RUN__MAX_REPRINT_COUNT", Some("3")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/checks");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.check_run.max_reprint_count, 3);
                assert_eq!(config.check_run.bank_routing_number, "026004297");
            },
        );
    }

    #[test]
    fn test_load_without_database_url_fails() {
        temp_env::with_vars([("CHECKRUN__DATABASE__URL", None::<&str>)], || {
            assert!(AppConfig::load().is_err());
        });
    }
}
