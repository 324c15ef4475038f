use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{error::ConfigError, model::Query};

/// Environment variable consulted when `--api-key` is not given.
pub const API_KEY_ENV: &str = "NUMBEO_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://www.numbeo.com/api";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from the platform config directory, or an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(cfg)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "city-prices", "city-prices")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }
}

/// Values supplied on the command line. `None` means the flag was omitted.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub city: String,
    pub country: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub query: Query,
    pub base_url: String,
    pub timeout: Duration,
}

impl Settings {
    /// Merge flags, the environment and the config file.
    ///
    /// The API key comes from the flag, then `env_api_key`, then the file.
    /// Base URL and timeout come from the flag, then the file, then the defaults.
    pub fn resolve(
        overrides: Overrides,
        env_api_key: Option<String>,
        file: &Config,
    ) -> std::result::Result<Self, ConfigError> {
        let city = non_empty(overrides.city, "city")?;
        let country = non_empty(overrides.country, "country")?;

        let api_key = [overrides.api_key, env_api_key, file.api_key.clone()]
            .into_iter()
            .flatten()
            .map(|k| k.trim().to_string())
            .find(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey { env: API_KEY_ENV })?;

        let base_url = match overrides.base_url.or_else(|| file.base_url.clone()) {
            Some(url) => non_empty(url, "base url")?,
            None => DEFAULT_BASE_URL.to_string(),
        };

        let timeout = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self { query: Query { city, country, api_key }, base_url, timeout })
    }
}

fn non_empty(value: String, field: &'static str) -> std::result::Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ConfigError::EmptyField(field))
    } else {
        Ok(trimmed.to_string())
    }
}
