//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "MVOL_CONFIG";

/// Prefix for environment overrides, e.g. `MVOL_STORAGE__DATA_DIR`.
pub const ENV_PREFIX: &str = "MVOL";

/// Where the three text files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding all data files. Default: current directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Market records, one line per market.
    #[serde(default = "default_markets_file")]
    pub markets_file: String,
    /// The nine ranking lists.
    #[serde(default = "default_rankings_file")]
    pub rankings_file: String,
    /// National benchmark sequences (read-only).
    #[serde(default = "default_national_file")]
    pub national_file: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_markets_file() -> String {
    "Markets.txt".to_string()
}

fn default_rankings_file() -> String {
    "Rankings.txt".to_string()
}

fn default_national_file() -> String {
    "National.txt".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            markets_file: default_markets_file(),
            rankings_file: default_rankings_file(),
            national_file: default_national_file(),
        }
    }
}

impl StorageConfig {
    /// Storage rooted at `data_dir` with default file names.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn markets_path(&self) -> PathBuf {
        self.data_dir.join(&self.markets_file)
    }

    pub fn rankings_path(&self) -> PathBuf {
        self.data_dir.join(&self.rankings_file)
    }

    pub fn national_path(&self) -> PathBuf {
        self.data_dir.join(&self.national_file)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Config path: CLI arg > `MVOL_CONFIG` > `config/default.toml`.
    pub fn resolve_path(cli: Option<String>) -> String {
        cli.or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load from an optional TOML file, then apply `MVOL_*` overrides.
    ///
    /// A missing file is not an error: every field has a default.
    pub fn load(path: &str) -> AppResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| AppError::Config(format!("Failed to load config: {e}")))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document directly.
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to render config: {e}")))
    }

    /// File names must be set and must not collide.
    pub fn validate(&self) -> AppResult<()> {
        let s = &self.storage;
        let names = [&s.markets_file, &s.rankings_file, &s.national_file];
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(AppError::Config("storage file names cannot be empty".to_string()));
        }
        if s.markets_file == s.rankings_file
            || s.markets_file == s.national_file
            || s.rankings_file == s.national_file
        {
            return Err(AppError::Config("storage file names must be distinct".to_string()));
        }
        Ok(())
    }
}
