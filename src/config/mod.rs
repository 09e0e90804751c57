use crate::error::Error;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the listening port
pub const PORT_ENV: &str = "PORT";

/// Environment variable pointing at an optional config file
pub const CONFIG_PATH_ENV: &str = "MONITOR_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// API server address
    #[serde(default = "default_address")]
    pub address: String,
    /// API server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Daily log file storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding one file per calendar day
    #[serde(default = "default_logs_directory")]
    pub logs_directory: PathBuf,
    /// Extension of the daily files, without the dot
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_logs_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_file_extension() -> String {
    "jsonl".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            logs_directory: default_logs_directory(),
            file_extension: default_file_extension(),
        }
    }
}

impl Config {
    /// Apply a `PORT` style override on top of the loaded configuration
    pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<()> {
        if let Some(raw) = port {
            self.api.port = raw
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("Invalid {} value {:?}: {}", PORT_ENV, raw, e)))?;
        }
        Ok(())
    }
}

/// Load configuration from a file or use default
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => {
            let config_str = std::fs::read_to_string(path)
                .context(format!("Failed to read config file: {:?}", path))?;

            let config = if path.extension().map_or(false, |ext| ext == "json") {
                serde_json::from_str(&config_str).context("Failed to parse JSON config")?
            } else if path.extension().map_or(false, |ext| ext == "toml") {
                toml::from_str(&config_str).context("Failed to parse TOML config")?
            } else {
                return Err(anyhow::anyhow!("Unsupported config file format"));
            };

            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// Load configuration the way the binary does: optional file from
/// `MONITOR_CONFIG`, then the `PORT` override.
pub fn load_from_env() -> Result<Config> {
    load_with(|key| std::env::var(key).ok())
}

/// Same as [`load_from_env`] with variables resolved through `lookup`
pub fn load_with<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let path = lookup(CONFIG_PATH_ENV).map(PathBuf::from);
    let mut config = load_config(path.as_deref())?;
    config.apply_port_override(lookup(PORT_ENV).as_deref())?;
    Ok(config)
}
