//! Configuration management for `tempmap`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TempMapError;
use crate::registry::{CityCoordinate, CityRegistry, RegistryKind};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for `tempmap`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TempMapConfig {
    /// Weather API configuration
    pub weather: WeatherConfig,
    /// Table cache configuration
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Which cities to fetch
    pub registry: RegistryConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL for the Open-Meteo API
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u32,
    /// IANA timezone for observation times (e.g. "Asia/Tokyo"); UTC when unset
    pub timezone: Option<String>,
}

/// Table cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a fetched table is reused, in seconds
    pub ttl_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// City registry selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Built-in registry used when `cities` is empty
    pub preset: RegistryKind,
    /// Deployment-specific city list; replaces the preset when non-empty
    pub cities: Vec<CityCoordinate>,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_cache_ttl() -> u64 {
    600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            timezone: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl WeatherConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl RegistryConfig {
    /// The registry this deployment fetches
    pub fn build(&self) -> std::result::Result<CityRegistry, TempMapError> {
        if self.cities.is_empty() {
            Ok(self.preset.registry())
        } else {
            CityRegistry::new("custom", self.cities.clone())
        }
    }
}

impl TempMapConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TEMPMAP__CACHE__TTL_SECONDS=60
        builder = builder.add_source(
            Environment::with_prefix("TEMPMAP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TempMapConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tempmap").join("config.toml"))
    }

    /// Replace empty strings with their defaults
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self
            .weather
            .timezone
            .as_deref()
            .is_some_and(|tz| tz.trim().is_empty())
        {
            self.weather.timezone = None;
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.registry.build()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(TempMapError::config("Weather API timeout cannot exceed 300 seconds").into());
        }

        if self.cache.ttl_seconds > 86_400 {
            return Err(TempMapError::config("Cache TTL cannot exceed 86400 seconds (1 day)").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TempMapError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TempMapError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(TempMapError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if let Some(tz) = &self.weather.timezone {
            if tz.chars().any(|c| c.is_whitespace() || c == '&' || c == '?' || c == '#') {
                return Err(TempMapError::config(format!("Invalid timezone '{tz}'")).into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = TempMapConfig::default();
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.cache.ttl(), Duration::from_secs(600));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.registry.preset, RegistryKind::Kyushu);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TempMapConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TempMapConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = TempMapConfig::default();
        config.cache.ttl_seconds = 100_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = TempMapConfig::default();
        config.weather.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = TempMapConfig::default();
        config.weather.base_url.clear();
        config.weather.timeout_seconds = 0;
        config.weather.timezone = Some("  ".to_string());
        config.logging.level.clear();
        config.apply_defaults();

        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.weather.timezone, None);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
[weather]
timezone = "Asia/Tokyo"

[cache]
ttl_seconds = 60

[registry]
preset = "japan"
"#,
        );

        let config = TempMapConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.weather.timezone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.registry.build().unwrap().len(), 47);
    }

    #[test]
    fn test_load_custom_registry() {
        let file = write_config(
            r#"
[[registry.cities]]
city_id = "CityA"
latitude = 35.0
longitude = 135.0

[[registry.cities]]
city_id = "CityB"
latitude = 36.5
longitude = 137.25
"#,
        );

        let config = TempMapConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        let registry = config.registry.build().unwrap();
        assert_eq!(registry.name(), "custom");
        let ids: Vec<&str> = registry.iter().map(|c| c.city_id.as_str()).collect();
        assert_eq!(ids, ["CityA", "CityB"]);
    }

    #[test]
    fn test_load_rejects_malformed_registry() {
        let file = write_config(
            r#"
[[registry.cities]]
city_id = "CityA"
latitude = 35.0
longitude = 135.0

[[registry.cities]]
city_id = "CityA"
latitude = 95.0
longitude = 135.0
"#,
        );

        let result = TempMapConfig::load_from_path(Some(file.path().to_path_buf()));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            TempMapConfig::load_from_path(Some(dir.path().join("does-not-exist.toml"))).unwrap();
        assert_eq!(config.cache.ttl_seconds, 600);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = TempMapConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("tempmap"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
