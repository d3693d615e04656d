//! # Configuration Management for relstore
//!
//! This crate provides the configuration structures consumed by the connection
//! registry: whether the database layer is enabled, which aliases to register and
//! the connection block for each alias.
//!
//! ## TOML File Configuration
//! ```toml
//! [db]
//! enable = true
//! alias = "default,backup"
//!
//! [db.default]
//! host = "127.0.0.1"
//! port = "3306"
//! user = "root"
//! password = "secret"
//! name = "app"
//! timezone = "Asia/Shanghai"
//! maxIdle = 10
//! maxConnections = 100
//! maxLifeTime = 3600
//! debug = true
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from relstore.toml (or the path in RELSTORE_CONFIG)
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./relstore.toml";
const CONFIG_PATH_ENV: &str = "RELSTORE_CONFIG";
const ENABLE_ENV: &str = "RELSTORE_DB_ENABLE";

/// Port used when an alias block leaves `port` empty
pub const DEFAULT_DB_PORT: &str = "3306";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub db: DatabaseSettings,
}

/// The `[db]` block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub enable: bool,
    /// Comma separated alias list, e.g. `"default,backup"`
    #[serde(default)]
    pub alias: String,
    /// Defer physical connections until a pool is first used
    #[serde(default)]
    pub lazy: bool,
    /// Per-alias connection blocks (`[db.<alias>]`)
    #[serde(flatten)]
    pub connections: BTreeMap<String, ConnectionSettings>,
}

/// Connection block for one alias
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSettings {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub max_idle: u32,
    /// 0 falls back to the registry default
    #[serde(default)]
    pub max_connections: u32,
    /// Seconds; 0 means connections are never retired by age
    #[serde(default)]
    pub max_life_time: u64,
    /// Seconds; 0 falls back to the pool default
    #[serde(default)]
    pub idle_timeout: u64,
    /// Seconds; 0 falls back to the pool default
    #[serde(default)]
    pub acquire_timeout: u64,
    #[serde(default)]
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from the TOML file named in `.env`/the environment, or the default path
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let mut config = if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            Self::read_file(&config_path)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::read_file(DEFAULT_CONFIG_PATH)?
        } else {
            return Err(ConfigError::Invalid(format!(
                "Config path must be specified as {} or provided in {}",
                CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH
            )));
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply `RELSTORE_DB_ENABLE` and `RELSTORE_DB_<ALIAS>_PASSWORD` on top of file values
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(enable) = lookup(ENABLE_ENV) {
            match enable.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.db.enable = true,
                "0" | "false" | "no" | "off" => self.db.enable = false,
                _ => {}
            }
        }

        for (alias, settings) in self.db.connections.iter_mut() {
            let key = format!("RELSTORE_DB_{}_PASSWORD", alias.to_ascii_uppercase());
            if let Some(password) = lookup(&key) {
                settings.password = password;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.db.validate()
    }
}

impl DatabaseSettings {
    /// Aliases listed in `db.alias`, trimmed, empty entries dropped
    pub fn aliases(&self) -> Vec<String> {
        self.alias
            .split(',')
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Connection block for an alias
    pub fn connection(&self, alias: &str) -> Option<&ConnectionSettings> {
        self.connections.get(alias)
    }

    /// Validate the block. A disabled block is always valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enable {
            return Ok(());
        }

        let aliases = self.aliases();
        if aliases.is_empty() {
            return Err(ConfigError::Invalid(
                "db.alias must list at least one alias when db.enable is true".to_string(),
            ));
        }

        for alias in &aliases {
            let settings = self.connection(alias).ok_or_else(|| {
                ConfigError::Invalid(format!("Missing [db.{}] block for alias '{}'", alias, alias))
            })?;
            settings.validate(alias)?;
        }

        Ok(())
    }
}

impl ConnectionSettings {
    /// Create a connection block with pool limits
    pub fn new(
        host: impl Into<String>,
        port: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        max_idle: u32,
        max_connections: u32,
        max_life_time: u64,
    ) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            user: user.into(),
            password: password.into(),
            name: name.into(),
            max_idle,
            max_connections,
            max_life_time,
            ..Self::default()
        }
    }

    /// Configured port, or the MySQL default when empty
    pub fn port_or_default(&self) -> &str {
        if self.port.trim().is_empty() {
            DEFAULT_DB_PORT
        } else {
            self.port.trim()
        }
    }

    /// Build the DSN: `user:password@tcp(host:port)/name?charset=utf8mb4[&loc=<tz>]`
    pub fn dsn(&self) -> String {
        let mut dsn = format!(
            "{}:{}@tcp({}:{})/{}?charset=utf8mb4",
            self.user,
            self.password,
            self.host,
            self.port_or_default(),
            self.name
        );

        if let Some(timezone) = self.timezone.as_deref().filter(|tz| !tz.is_empty()) {
            dsn.push_str("&loc=");
            dsn.extend(url::form_urlencoded::byte_serialize(timezone.as_bytes()));
        }

        dsn
    }

    fn validate(&self, alias: &str) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "db.{}.host cannot be empty",
                alias
            )));
        }
        if self.port_or_default().parse::<u16>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "db.{}.port '{}' is not a valid port",
                alias, self.port
            )));
        }
        if self.name.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "db.{}.name cannot be empty",
                alias
            )));
        }
        Ok(())
    }
}
