use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn default_batch_size() -> usize {
    6
}

fn default_fetch_threshold() -> usize {
    10
}

fn default_refill_count() -> usize {
    20
}

fn default_initial_prefetch() -> usize {
    36
}

fn default_item_width() -> f32 {
    200.0
}

fn default_item_height() -> f32 {
    250.0
}

fn default_item_padding() -> f32 {
    4.0
}

/// Tuning for incremental grid loading.
///
/// The fetch constants are empirical: small batches keep each unit of background work
/// short, and the threshold/refill pair keeps a lookahead buffer below the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Records requested from the iterator per call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Rows from the end of the loaded prefix at which another fetch is triggered
    #[serde(default = "default_fetch_threshold")]
    pub fetch_threshold: usize,
    /// Records fetched per trigger once the view nears the end
    #[serde(default = "default_refill_count")]
    pub refill_count: usize,
    /// Records fetched when a streaming view is created or reset
    #[serde(default = "default_initial_prefetch")]
    pub initial_prefetch: usize,
    #[serde(default = "default_item_width")]
    pub item_width: f32,
    #[serde(default = "default_item_height")]
    pub item_height: f32,
    #[serde(default = "default_item_padding")]
    pub item_padding: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            fetch_threshold: default_fetch_threshold(),
            refill_count: default_refill_count(),
            initial_prefetch: default_initial_prefetch(),
            item_width: default_item_width(),
            item_height: default_item_height(),
            item_padding: default_item_padding(),
        }
    }
}

impl GridConfig {
    /// Load configuration.
    ///
    /// In dev mode (`GRIDFEED_DEV_MODE` set, or a `.env` file found) values come from
    /// `GRIDFEED_*` environment variables. Otherwise `~/.gridfeed/config.yaml` is read,
    /// falling back to defaults when it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let dev_mode = std::env::var("GRIDFEED_DEV_MODE").is_ok() || dotenvy::dotenv().is_ok();
        let config = if dev_mode {
            info!("Dev mode activated - loading grid config from environment");
            Self::from_env()?
        } else {
            match Self::default_config_path() {
                Some(path) if path.exists() => {
                    info!("Loading grid config from {}", path.display());
                    Self::from_yaml_file(&path)?
                }
                _ => Self::default(),
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// `~/.gridfeed/config.yaml`, if a home directory is known.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".gridfeed").join("config.yaml"))
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            batch_size: env_or("GRIDFEED_BATCH_SIZE", defaults.batch_size)?,
            fetch_threshold: env_or("GRIDFEED_FETCH_THRESHOLD", defaults.fetch_threshold)?,
            refill_count: env_or("GRIDFEED_REFILL_COUNT", defaults.refill_count)?,
            initial_prefetch: env_or("GRIDFEED_INITIAL_PREFETCH", defaults.initial_prefetch)?,
            item_width: env_or("GRIDFEED_ITEM_WIDTH", defaults.item_width)?,
            item_height: env_or("GRIDFEED_ITEM_HEIGHT", defaults.item_height)?,
            item_padding: env_or("GRIDFEED_ITEM_PADDING", defaults.item_padding)?,
        })
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn save_to_yaml(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml =
            serde_yaml::to_string(self).map_err(|e| ConfigError::Serialization(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.item_width <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "item_width must be positive, got {}",
                self.item_width
            )));
        }
        if self.item_padding < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "item_padding must not be negative, got {}",
                self.item_padding
            )));
        }
        if self.item_height + self.item_padding <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "item_height plus item_padding must be positive, got {}",
                self.item_height + self.item_padding
            )));
        }
        if self.refill_count == 0 {
            warn!("refill_count is 0; scrolling near the end will not load more items");
        }
        Ok(())
    }
}

/// Read `key` from the environment, falling back to `default` when unset or empty.
fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key).ok().filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("{key}={raw}: {e}"))),
        None => Ok(default),
    }
}
