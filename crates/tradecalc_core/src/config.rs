//! Application configuration.
//!
//! # Responsibility
//! - Define the tunables for storage namespace, latency, journal size and
//!   logging.
//! - Layer sources: defaults, then an optional JSON file, then
//!   `TRADECALC_*` environment variables.
//!
//! # Invariants
//! - A config returned by [`AppConfig::load`] has passed [`AppConfig::validate`].

use crate::journal::log_store::DEFAULT_MAX_LOG_ENTRIES;
use crate::service::mock_api::DEFAULT_LATENCY;
use crate::storage::namespacer::DEFAULT_NAMESPACE_PREFIX;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "TRADECALC_";

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config JSON: {err}"),
            Self::InvalidValue { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Runtime settings for one application context.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Prepended to every storage key.
    pub namespace_prefix: String,
    /// Artificial delay of the mock remote service.
    pub latency_ms: u64,
    /// Journal capacity.
    pub max_log_entries: usize,
    /// SQLite file for persistent storage; in-memory when unset.
    pub db_path: Option<PathBuf>,
    /// Process log level (`trace|debug|info|warn|error`).
    pub log_level: Option<String>,
    /// Absolute directory for rolling process logs; file logging is off
    /// when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace_prefix: DEFAULT_NAMESPACE_PREFIX.to_string(),
            latency_ms: DEFAULT_LATENCY.as_millis() as u64,
            max_log_entries: DEFAULT_MAX_LOG_ENTRIES,
            db_path: None,
            log_level: None,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Defaults, optional JSON file, then environment overrides; validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses a JSON object; missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Applies `TRADECALC_*` overrides obtained through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let read = |suffix: &str| {
            lookup(&format!("{ENV_PREFIX}{suffix}"))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(prefix) = read("NAMESPACE_PREFIX") {
            self.namespace_prefix = prefix;
        }
        if let Some(value) = read("LATENCY_MS") {
            self.latency_ms = parse_number("latency_ms", &value)?;
        }
        if let Some(value) = read("MAX_LOG_ENTRIES") {
            self.max_log_entries = parse_number("max_log_entries", &value)?;
        }
        if let Some(path) = read("DB_PATH") {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = read("LOG_LEVEL") {
            self.log_level = Some(level);
        }
        if let Some(dir) = read("LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace_prefix.is_empty() {
            return Err(invalid(
                "namespace_prefix",
                "must not be empty; an empty prefix would make clear_all wipe foreign keys",
            ));
        }
        if self.max_log_entries == 0 {
            return Err(invalid("max_log_entries", "must be at least 1"));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(invalid(
                    "log_dir",
                    format!("must be an absolute path, got `{}`", dir.display()),
                ));
            }
        }
        Ok(())
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    value
        .parse()
        .map_err(|err: T::Err| invalid(field, format!("`{value}` is not a number: {err}")))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}
