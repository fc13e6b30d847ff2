//! `OpenMeteo` forecast endpoint response structures

use serde::Deserialize;

/// Response of `GET /v1/forecast?...&current=temperature_2m`
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Offset of the `time` fields from UTC; 0 unless a timezone was requested
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub timezone: Option<String>,
    pub current: Option<CurrentData>,
}

/// Current conditions block
#[derive(Debug, Deserialize)]
pub struct CurrentData {
    /// Local observation time, e.g. "2025-01-15T12:00"
    pub time: Option<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Option<f64>,
}
