//! Current temperature reading for a single registered city

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::registry::CityCoordinate;

/// Height units per degree Celsius used by the column and scatter views
pub const ELEVATION_SCALE: f64 = 3000.0;

/// Scale a temperature into a visual height.
///
/// Visualization only; not a physical elevation.
#[must_use]
pub fn elevation_for(temperature_celsius: f64) -> f64 {
    temperature_celsius * ELEVATION_SCALE
}

/// One successfully fetched row of a [`super::WeatherTable`]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherReading {
    pub city_id: String,
    /// Latitude in decimal degrees, copied from the registry entry
    pub latitude: f64,
    /// Longitude in decimal degrees, copied from the registry entry
    pub longitude: f64,
    /// Temperature 2 m above ground in Celsius
    pub temperature_celsius: f64,
    /// Observation time reported by the provider, in the provider's offset
    pub observed_at: Option<DateTime<FixedOffset>>,
}

impl WeatherReading {
    /// Build a reading for `city`, so coordinates always match the registry
    #[must_use]
    pub fn for_city(
        city: &CityCoordinate,
        temperature_celsius: f64,
        observed_at: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            city_id: city.city_id.clone(),
            latitude: city.latitude,
            longitude: city.longitude,
            temperature_celsius,
            observed_at,
        }
    }

    #[must_use]
    pub fn elevation(&self) -> f64 {
        elevation_for(self.temperature_celsius)
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature_celsius)
    }

    /// Format observation time, or "-" when the provider sent none
    #[must_use]
    pub fn format_observed_at(&self) -> String {
        self.observed_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M %:z").to_string())
    }
}
