//! Configuration loading and typed config structures for busboard.
//!
//! The configuration lives in `busboard.yaml` in the working directory (or
//! wherever `BUSBOARD_CONFIG` points). Every field has a default, so the
//! file is optional and an empty file is valid. Environment variables are
//! applied on top of the file by [`BoardConfig::load_from`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "BUSBOARD_CONFIG";

/// Configuration file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "busboard.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value (usually from the environment) is not acceptable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level busboard configuration.
///
/// Mirrors the structure of `busboard.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BoardConfig {
    /// HTTP listener and static asset settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Where the schedule is read from.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Time zone used for every "now".
    #[serde(default)]
    pub time: TimeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BoardConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// The configuration file for this process: `BUSBOARD_CONFIG`, or
    /// `busboard.yaml` when unset.
    pub fn path_from_env() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }

    /// Load configuration from `path`, then apply environment overrides.
    ///
    /// A missing file yields the defaults. This runs before logging is
    /// initialized, so it does not log.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be parsed, or
    /// an override has an invalid value.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file_or_default(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Read `path` if it exists, otherwise return the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Override settings with environment variables when set.
    ///
    /// - `BUSBOARD_HOST` overrides `server.host`
    /// - `BUSBOARD_PORT` overrides `server.port`
    /// - `BUSBOARD_STATIC_DIR` overrides `server.static_dir`
    /// - `BUSBOARD_SCHEDULE` overrides `schedule.path`
    /// - `BUSBOARD_TIMEZONE` overrides `time.zone`
    /// - `BUSBOARD_LOG` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `BUSBOARD_PORT` is not a port
    /// number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the port override is not a port
    /// number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("BUSBOARD_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("BUSBOARD_PORT") {
            self.server.port = val.parse().map_err(|e| ConfigError::Invalid {
                reason: format!("BUSBOARD_PORT={val:?} is not a port number: {e}"),
            })?;
        }
        if let Some(val) = lookup("BUSBOARD_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("BUSBOARD_SCHEDULE") {
            self.schedule.path = PathBuf::from(val);
        }
        if let Some(val) = lookup("BUSBOARD_TIMEZONE") {
            self.time.zone = val;
        }
        if let Some(val) = lookup("BUSBOARD_LOG") {
            self.logging.level = val;
        }
        Ok(())
    }
}

/// HTTP listener and static asset settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for every path that is not an API route.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Schedule source settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Path of the JSON schedule file, re-read on every cycle.
    #[serde(default = "default_schedule_path")]
    pub path: PathBuf,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            path: default_schedule_path(),
        }
    }
}

/// Time zone settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeConfig {
    /// IANA zone name all departures are computed in.
    #[serde(default = "default_zone")]
    pub zone: String,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            zone: default_zone(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive (e.g. `info`, `busboard=debug`).
    ///
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_schedule_path() -> PathBuf {
    PathBuf::from("buses.json")
}

fn default_zone() -> String {
    "UTC".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}
