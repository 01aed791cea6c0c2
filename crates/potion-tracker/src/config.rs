use potion_core::model::rules::GameRules;
use potion_core::stats::StorageKeys;
use potion_core::stats::schema::DEFAULT_NAMESPACE;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_STORE_PATH: &str = "love-potion-stats.json";
const NAMESPACE_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-";
const MAX_STARTING_HP: u32 = 99;
const MAX_STARTING_ENERGY: u32 = 99;

/// Root tracker configuration loaded from YAML. Every block is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TrackerConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrackerConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: TrackerConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.storage.validate()?;
        self.session.validate()?;
        self.logging.normalize();
        Ok(())
    }

    pub fn rules(&self) -> GameRules {
        GameRules {
            starting_hp: self.session.starting_hp,
            starting_energy: self.session.starting_energy,
        }
    }
}

/// Where statistics are persisted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            namespace: default_namespace(),
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "storage.path".to_string(),
                message: "path must not be empty".to_string(),
            });
        }

        if self.namespace.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "storage.namespace".to_string(),
                message: "namespace must not be empty".to_string(),
            });
        }

        if !self.namespace.chars().all(|c| NAMESPACE_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: "storage.namespace".to_string(),
                message: "namespace may only contain alphanumeric characters, '_' or '-'"
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn keys(&self) -> StorageKeys {
        StorageKeys::new(&self.namespace)
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// Starting values for each new game.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_starting_hp")]
    pub starting_hp: u32,
    #[serde(default = "default_starting_energy")]
    pub starting_energy: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_hp: default_starting_hp(),
            starting_energy: default_starting_energy(),
        }
    }
}

impl SessionConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.starting_hp == 0 || self.starting_hp > MAX_STARTING_HP {
            return Err(ValidationError::InvalidField {
                field: "session.starting_hp".to_string(),
                message: format!("starting HP must be between 1 and {MAX_STARTING_HP}"),
            });
        }
        if self.starting_energy > MAX_STARTING_ENERGY {
            return Err(ValidationError::InvalidField {
                field: "session.starting_energy".to_string(),
                message: format!("starting energy must be at most {MAX_STARTING_ENERGY}"),
            });
        }
        Ok(())
    }
}

fn default_starting_hp() -> u32 {
    GameRules::standard().starting_hp
}

fn default_starting_energy() -> u32 {
    GameRules::standard().starting_energy
}

/// Logging defaults to plain warnings on stderr.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            log_file: None,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "warn".to_string()
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
