//! Data models for tempmap
//!
//! This module contains the core domain models organized by concern:
//! - Reading: one city's current temperature
//! - Table: the ordered result of one fetch cycle and its failures
//! - Open-Meteo: wire types of the forecast endpoint

pub mod open_meteo;
pub mod reading;
pub mod table;

// Re-export all public types for convenient access
pub use reading::{ELEVATION_SCALE, WeatherReading, elevation_for};
pub use table::{CityFailure, FetchReport, WeatherTable};
