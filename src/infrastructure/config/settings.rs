//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all ledger settings.
//! Configuration is loaded from a TOML file; the database path can be
//! overridden with `ODDSLEDGER_DATABASE`.
//!
//! # Example
//!
//! ```no_run
//! use oddsledger::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("oddsledger.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::ledger::LedgerConfig;
use super::logging::LoggingConfig;
use super::roles::RolesConfig;
use crate::domain::money::MAX_FEE_BPS;
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`Config::database`].
pub const DATABASE_ENV: &str = "ODDSLEDGER_DATABASE";

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Fee, recipient and pause defaults.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Accounts allowed to administer, make markets, set odds or resolve.
    #[serde(default)]
    pub roles: RolesConfig,

    /// Path to SQLite database file.
    ///
    /// Defaults to "oddsledger.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,
}

fn default_database_path() -> String {
    "oddsledger.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            ledger: LedgerConfig::default(),
            roles: RolesConfig::default(),
            database: default_database_path(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - Validation fails (e.g., a fee above the cap)
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(database) = std::env::var(DATABASE_ENV) {
            if !database.is_empty() {
                config.database = database;
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.ledger.fee_bps > MAX_FEE_BPS {
            return Err(ConfigError::InvalidValue {
                field: "fee_bps",
                reason: format!("must be at most {MAX_FEE_BPS}"),
            }
            .into());
        }
        if self.ledger.min_stake < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "min_stake",
                reason: "must be 0 or greater".to_string(),
            }
            .into());
        }
        if self.ledger.fee_recipient.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "fee_recipient",
            }
            .into());
        }
        if self.roles.all().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "roles",
                reason: "account names must not be empty".to_string(),
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
