//! `tempmap` - current temperature tables for fixed city registries
//!
//! This library fetches the current temperature of every city in a registry
//! from the Open-Meteo forecast API and assembles the readings into a table
//! that is reused for a fixed time-to-live.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod registry;
pub mod telemetry;

// Re-export core types for public API
pub use api::{CurrentConditions, CurrentConditionsSource, OpenMeteoClient};
pub use cache::TimedCache;
pub use config::TempMapConfig;
pub use error::{FetchError, TempMapError};
pub use fetcher::WeatherFetcher;
pub use models::{CityFailure, FetchReport, WeatherReading, WeatherTable, elevation_for};
pub use registry::{CityCoordinate, CityRegistry, RegistryKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TempMapError>;

/// Build a fetcher for the configured registry backed by Open-Meteo
pub fn fetcher_from_config(config: &TempMapConfig) -> Result<WeatherFetcher<OpenMeteoClient>> {
    let registry = config.registry.build()?;
    let client = OpenMeteoClient::new(&config.weather)?;
    Ok(WeatherFetcher::new(registry, client, config.cache.ttl()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_fetcher_from_default_config() {
        let fetcher = fetcher_from_config(&TempMapConfig::default()).unwrap();
        assert_eq!(fetcher.registry().name(), "kyushu");
        assert_eq!(fetcher.ttl(), std::time::Duration::from_secs(600));
    }
}
