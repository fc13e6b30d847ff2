//! Weather API client for the `OpenMeteo` forecast endpoint
//!
//! One blocking GET per city. No retries and no rate limiting: a failed
//! request is reported back to the fetcher as a [`FetchError`].

use crate::config::WeatherConfig;
use crate::error::FetchError;
use crate::models::open_meteo::ForecastResponse;
use crate::TempMapError;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use reqwest::blocking::Client;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Field selector sent as the `current` query parameter
pub const CURRENT_FIELDS: &str = "temperature_2m";

/// Current conditions at one coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature_celsius: f64,
    pub observed_at: Option<DateTime<FixedOffset>>,
}

/// Anything that can report the current temperature at a coordinate
pub trait CurrentConditionsSource {
    fn current_conditions(&self, latitude: f64, longitude: f64)
    -> Result<CurrentConditions, FetchError>;
}

/// Blocking client for `GET {base_url}/forecast`
#[derive(Debug)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    timezone: Option<String>,
}

impl OpenMeteoClient {
    /// Create a new client from the weather configuration
    pub fn new(config: &WeatherConfig) -> Result<Self, TempMapError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("tempmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TempMapError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timezone: config.timezone.clone(),
        })
    }

    /// URL of the current-conditions request for one coordinate
    #[must_use]
    pub fn forecast_url(&self, latitude: f64, longitude: f64) -> String {
        let mut url = format!(
            "{}/forecast?latitude={latitude}&longitude={longitude}&current={CURRENT_FIELDS}",
            self.base_url
        );
        if let Some(tz) = &self.timezone {
            url.push_str("&timezone=");
            url.push_str(&urlencoding::encode(tz));
        }
        url
    }

    /// Extract the current conditions from a response body
    pub fn parse_current(body: &str) -> Result<CurrentConditions, FetchError> {
        let response: ForecastResponse =
            serde_json::from_str(body).map_err(|e| FetchError::malformed(e.to_string()))?;

        let current = response
            .current
            .ok_or_else(|| FetchError::malformed("missing `current` object"))?;

        let temperature_celsius = current
            .temperature
            .ok_or_else(|| FetchError::malformed("missing `current.temperature_2m`"))?;

        let observed_at = current
            .time
            .as_deref()
            .map(|time| parse_observation_time(time, response.utc_offset_seconds))
            .transpose()?;

        Ok(CurrentConditions {
            temperature_celsius,
            observed_at,
        })
    }
}

/// Parse Open-Meteo's local "YYYY-MM-DDTHH:MM" with the response's UTC offset
fn parse_observation_time(
    time: &str,
    utc_offset_seconds: i32,
) -> Result<DateTime<FixedOffset>, FetchError> {
    let offset = FixedOffset::east_opt(utc_offset_seconds).ok_or_else(|| {
        FetchError::malformed(format!("invalid utc_offset_seconds: {utc_offset_seconds}"))
    })?;

    let naive = NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| FetchError::malformed(format!("invalid observation time '{time}': {e}")))?;

    naive
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| FetchError::malformed(format!("ambiguous observation time '{time}'")))
}

impl CurrentConditionsSource for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = latitude, lon = longitude))]
    fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, FetchError> {
        let url = self.forecast_url(latitude, longitude);
        debug!("OpenMeteo API request URL: {}", url);
        let start_time = Instant::now();

        let response = self.client.get(&url).send()?;

        let status = response.status();
        if !status.is_success() {
            debug!("HTTP error response: {}", status);
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        let conditions = Self::parse_current(&body)?;

        let total_duration = start_time.elapsed();
        debug!(
            "Retrieved current conditions in {:.3}s",
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow API response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(timezone: Option<&str>) -> OpenMeteoClient {
        let config = WeatherConfig {
            base_url: "https://api.open-meteo.com/v1/".to_string(),
            timezone: timezone.map(str::to_string),
            ..WeatherConfig::default()
        };
        OpenMeteoClient::new(&config).unwrap()
    }

    #[test]
    fn test_forecast_url() {
        let url = client(None).forecast_url(33.5904, 130.4017);
        assert_eq!(
            url,
            "https://api.open-meteo.com/v1/forecast?latitude=33.5904&longitude=130.4017&current=temperature_2m"
        );
    }

    #[test]
    fn test_forecast_url_with_timezone() {
        let url = client(Some("Asia/Tokyo")).forecast_url(31.56, 130.558);
        assert!(url.ends_with("&current=temperature_2m&timezone=Asia%2FTokyo"));
    }

    #[test]
    fn test_forecast_url_encodes_timezone_offset() {
        let url = client(Some("Etc/GMT+9")).forecast_url(31.56, 130.558);
        assert!(url.ends_with("&timezone=Etc%2FGMT%2B9"), "{url}");
    }

    #[test]
    fn test_parse_current_with_time() {
        let body = r#"{
            "latitude": 33.6,
            "longitude": 130.4,
            "utc_offset_seconds": 32400,
            "timezone": "Asia/Tokyo",
            "current_units": {"time": "iso8601", "temperature_2m": "°C"},
            "current": {"time": "2025-01-15T12:00", "interval": 900, "temperature_2m": 8.4}
        }"#;

        let conditions = OpenMeteoClient::parse_current(body).unwrap();
        assert_eq!(conditions.temperature_celsius, 8.4);
        let observed = conditions.observed_at.unwrap();
        assert_eq!(observed.to_rfc3339(), "2025-01-15T12:00:00+09:00");
    }

    #[test]
    fn test_parse_current_without_time() {
        let body = r#"{"current": {"temperature_2m": -3.5}}"#;
        let conditions = OpenMeteoClient::parse_current(body).unwrap();
        assert_eq!(conditions.temperature_celsius, -3.5);
        assert_eq!(conditions.observed_at, None);
    }

    #[test]
    fn test_parse_missing_current() {
        let body = r#"{"latitude": 33.6, "longitude": 130.4}"#;
        let err = OpenMeteoClient::parse_current(body).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_missing_temperature() {
        let body = r#"{"current": {"time": "2025-01-15T12:00"}}"#;
        let err = OpenMeteoClient::parse_current(body).unwrap_err();
        assert_eq!(
            err,
            FetchError::malformed("missing `current.temperature_2m`")
        );
    }

    #[test]
    fn test_parse_non_numeric_temperature() {
        let body = r#"{"current": {"temperature_2m": "warm"}}"#;
        assert!(matches!(
            OpenMeteoClient::parse_current(body),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            OpenMeteoClient::parse_current("<html>Bad Gateway</html>"),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_invalid_time() {
        let body = r#"{"current": {"time": "yesterday", "temperature_2m": 1.0}}"#;
        assert!(matches!(
            OpenMeteoClient::parse_current(body),
            Err(FetchError::MalformedResponse(_))
        ));
    }
}
