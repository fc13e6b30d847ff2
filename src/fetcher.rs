//! Fetch-and-cache routine that turns a city registry into a weather table

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::api::CurrentConditionsSource;
use crate::cache::TimedCache;
use crate::error::FetchError;
use crate::models::{CityFailure, FetchReport, WeatherReading, WeatherTable};
use crate::registry::{CityCoordinate, CityRegistry};

/// Default reuse window of a fetched table
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Outcome of fetching one registered city
#[derive(Debug)]
pub struct CityOutcome<'a> {
    pub city: &'a CityCoordinate,
    pub result: Result<WeatherReading, FetchError>,
}

/// Builds [`WeatherTable`]s from a registry and a conditions source, reusing
/// the last table for the configured TTL.
#[derive(Debug)]
pub struct WeatherFetcher<S> {
    registry: CityRegistry,
    source: S,
    cache: TimedCache<FetchReport>,
}

impl<S: CurrentConditionsSource> WeatherFetcher<S> {
    #[must_use]
    pub fn new(registry: CityRegistry, source: S, ttl: Duration) -> Self {
        Self {
            registry,
            source,
            cache: TimedCache::new(ttl),
        }
    }

    #[must_use]
    pub fn with_default_ttl(registry: CityRegistry, source: S) -> Self {
        Self::new(registry, source, DEFAULT_TTL)
    }

    #[must_use]
    pub fn registry(&self) -> &CityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Age of the cached table, if one is held
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache.age()
    }

    /// Current table; served from cache while younger than the TTL.
    pub fn fetch_weather_table(&self) -> WeatherTable {
        self.fetch_weather_report().table
    }

    /// Current table plus the cities the producing cycle had to skip.
    #[instrument(skip(self), fields(registry = self.registry.name()))]
    pub fn fetch_weather_report(&self) -> FetchReport {
        if let Some(report) = self.cache.get() {
            debug!("Serving cached weather table ({} rows)", report.table.len());
            return report;
        }

        let report = self.fetch_uncached();
        self.cache.insert(report.clone());
        report
    }

    /// Drop the cached table so the next fetch re-requests every city.
    pub fn invalidate_cache(&self) {
        info!("Weather table cache invalidated");
        self.cache.clear();
    }

    /// Manual refresh: invalidate, then fetch.
    pub fn refresh(&self) -> FetchReport {
        self.invalidate_cache();
        self.fetch_weather_report()
    }

    /// Run one fetch cycle without reading or writing the cache.
    #[instrument(skip(self), fields(registry = self.registry.name(), cities = self.registry.len()))]
    pub fn fetch_uncached(&self) -> FetchReport {
        let start_time = Instant::now();
        let mut report = FetchReport::default();

        for outcome in self.fetch_each() {
            match outcome.result {
                Ok(reading) => report.table.push(reading),
                Err(error) => report.failures.push(CityFailure {
                    city_id: outcome.city.city_id.clone(),
                    error,
                }),
            }
        }

        info!(
            "Fetched {}/{} cities in {:.3}s",
            report.table.len(),
            self.registry.len(),
            start_time.elapsed().as_secs_f64()
        );
        report
    }

    /// Fetch every registered city in registry order, one request at a time.
    pub fn fetch_each(&self) -> Vec<CityOutcome<'_>> {
        self.registry
            .iter()
            .map(|city| CityOutcome {
                city,
                result: self.fetch_city(city),
            })
            .collect()
    }

    fn fetch_city(&self, city: &CityCoordinate) -> Result<WeatherReading, FetchError> {
        match self
            .source
            .current_conditions(city.latitude, city.longitude)
        {
            Ok(conditions) => {
                debug!(
                    "{}: {:.1}°C",
                    city.city_id, conditions.temperature_celsius
                );
                Ok(WeatherReading::for_city(
                    city,
                    conditions.temperature_celsius,
                    conditions.observed_at,
                ))
            }
            Err(error) => {
                warn!(city = %city.city_id, "Error fetching {}: {}", city.city_id, error);
                Err(error)
            }
        }
    }
}
