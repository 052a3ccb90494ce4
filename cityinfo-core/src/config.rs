use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_WEATHER_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_GEODB_ENDPOINT: &str = "https://wft-geo-db.p.rapidapi.com/v1/geo/cities";
pub const DEFAULT_GEODB_HOST: &str = "wft-geo-db.p.rapidapi.com";
pub const DEFAULT_LANGUAGE: &str = "ru";
pub const DEFAULT_LAST_CITY_FILE: &str = "last_city.json";

/// Telegram access.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: String,
    /// Optional Bot API server, e.g. a local `telegram-bot-api` instance.
    pub api_url: Option<String>,
}

/// OpenWeatherMap current weather endpoint and key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: String,
    pub endpoint: String,
    /// Display language passed as `lang`.
    pub language: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_WEATHER_ENDPOINT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// GeoDB Cities (RapidAPI) endpoint and key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeographyConfig {
    pub api_key: String,
    pub endpoint: String,
    /// Value of the `X-RapidAPI-Host` header.
    pub host: String,
}

impl Default for GeographyConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_GEODB_ENDPOINT.to_string(),
            host: DEFAULT_GEODB_HOST.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub last_city_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { last_city_file: PathBuf::from(DEFAULT_LAST_CITY_FILE) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// When set, log output is also appended to this file.
    pub file: Option<PathBuf>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [telegram]
/// token = "123:ABC"
///
/// [weather]
/// api_key = "..."
///
/// [geography]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub weather: WeatherConfig,
    pub geography: GeographyConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from `path` (or the platform default), or return defaults if it doesn't exist yet.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_file_path()?,
        };

        if !path.exists() {
            // First run: no config file, rely on defaults and env.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path` (or the platform default), creating parent directories as needed.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_file_path()?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityinfo", "cityinfo-bot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override values with environment variables. `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("CITYINFO_TELEGRAM_TOKEN").or_else(|| get("TELOXIDE_TOKEN")) {
            self.telegram.token = token;
        }
        if let Some(url) = get("CITYINFO_TELEGRAM_API_URL") {
            self.telegram.api_url = Some(url);
        }
        if let Some(key) = get("CITYINFO_WEATHER_API_KEY") {
            self.weather.api_key = key;
        }
        if let Some(endpoint) = get("CITYINFO_WEATHER_ENDPOINT") {
            self.weather.endpoint = endpoint;
        }
        if let Some(key) = get("CITYINFO_GEODB_API_KEY") {
            self.geography.api_key = key;
        }
        if let Some(endpoint) = get("CITYINFO_GEODB_ENDPOINT") {
            self.geography.endpoint = endpoint;
        }
        if let Some(file) = get("CITYINFO_LAST_CITY_FILE") {
            self.storage.last_city_file = PathBuf::from(file);
        }
    }

    /// Check that the secrets the lookup APIs need are present.
    pub fn validate_lookup(&self) -> Result<()> {
        Self::check(&self.missing_lookup_secrets())
    }

    /// Check that everything needed to run the bot is present.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.telegram.token.trim().is_empty() {
            missing.push("telegram.token");
        }
        missing.extend(self.missing_lookup_secrets());
        Self::check(&missing)
    }

    fn missing_lookup_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.weather.api_key.trim().is_empty() {
            missing.push("weather.api_key");
        }
        if self.weather.endpoint.trim().is_empty() {
            missing.push("weather.endpoint");
        }
        if self.geography.api_key.trim().is_empty() {
            missing.push("geography.api_key");
        }
        if self.geography.endpoint.trim().is_empty() {
            missing.push("geography.endpoint");
        }
        missing
    }

    fn check(missing: &[&str]) -> Result<()> {
        if missing.is_empty() {
            return Ok(());
        }
        Err(anyhow!(
            "Missing configuration: {}.\n\
             Hint: run `cityinfo configure` or set the CITYINFO_* environment variables.",
            missing.join(", ")
        ))
    }
}
