//! City registry: the fixed, ordered set of cities a table is built from
//!
//! Two registries are compiled in (`kyushu` and `japan`); a deployment may
//! also configure its own list, which is validated once at start-up.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TempMapError;

/// Geographic position of a registered city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CityCoordinate {
    /// Unique key within a registry
    pub city_id: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl CityCoordinate {
    #[must_use]
    pub fn new(city_id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            city_id: city_id.into(),
            latitude,
            longitude,
        }
    }

    /// Format as "lat, lon" with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    fn validate(&self) -> Result<(), TempMapError> {
        if self.city_id.trim().is_empty() {
            return Err(TempMapError::config("City id cannot be empty"));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(TempMapError::config(format!(
                "Latitude of '{}' must be between -90 and 90, got: {}",
                self.city_id, self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(TempMapError::config(format!(
                "Longitude of '{}' must be between -180 and 180, got: {}",
                self.city_id, self.longitude
            )));
        }
        Ok(())
    }
}

/// Built-in registries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    /// The seven prefectural capitals of Kyushu
    #[default]
    Kyushu,
    /// All 47 prefectural capitals of Japan
    Japan,
}

impl RegistryKind {
    #[must_use]
    pub fn registry(self) -> CityRegistry {
        match self {
            Self::Kyushu => CityRegistry::kyushu(),
            Self::Japan => CityRegistry::japan(),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kyushu => "kyushu",
            Self::Japan => "japan",
        }
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistryKind {
    type Err = TempMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kyushu" => Ok(Self::Kyushu),
            "japan" => Ok(Self::Japan),
            other => Err(TempMapError::validation(format!(
                "Unknown registry '{other}'. Must be one of: kyushu, japan"
            ))),
        }
    }
}

const KYUSHU_CAPITALS: &[(&str, f64, f64)] = &[
    ("Fukuoka", 33.5904, 130.4017),
    ("Saga", 33.2494, 130.2974),
    ("Nagasaki", 32.7450, 129.8739),
    ("Kumamoto", 32.7900, 130.7420),
    ("Oita", 33.2381, 131.6119),
    ("Miyazaki", 31.9110, 131.4240),
    ("Kagoshima", 31.5600, 130.5580),
];

const JAPAN_CAPITALS: &[(&str, f64, f64)] = &[
    ("Sapporo", 43.0642, 141.3469),
    ("Aomori", 40.8244, 140.7400),
    ("Morioka", 39.7036, 141.1527),
    ("Sendai", 38.2682, 140.8694),
    ("Akita", 39.7186, 140.1024),
    ("Yamagata", 38.2404, 140.3633),
    ("Fukushima", 37.7503, 140.4676),
    ("Mito", 36.3418, 140.4468),
    ("Utsunomiya", 36.5657, 139.8836),
    ("Maebashi", 36.3911, 139.0608),
    ("Saitama", 35.8569, 139.6489),
    ("Chiba", 35.6051, 140.1233),
    ("Tokyo", 35.6895, 139.6917),
    ("Yokohama", 35.4478, 139.6425),
    ("Niigata", 37.9026, 139.0236),
    ("Toyama", 36.6953, 137.2113),
    ("Kanazawa", 36.5947, 136.6256),
    ("Fukui", 36.0652, 136.2216),
    ("Kofu", 35.6642, 138.5684),
    ("Nagano", 36.6513, 138.1810),
    ("Gifu", 35.3912, 136.7223),
    ("Shizuoka", 34.9769, 138.3831),
    ("Nagoya", 35.1802, 136.9066),
    ("Tsu", 34.7303, 136.5086),
    ("Otsu", 35.0045, 135.8686),
    ("Kyoto", 35.0212, 135.7556),
    ("Osaka", 34.6863, 135.5200),
    ("Kobe", 34.6913, 135.1830),
    ("Nara", 34.6851, 135.8329),
    ("Wakayama", 34.2260, 135.1675),
    ("Tottori", 35.5036, 134.2383),
    ("Matsue", 35.4723, 133.0505),
    ("Okayama", 34.6618, 133.9344),
    ("Hiroshima", 34.3966, 132.4596),
    ("Yamaguchi", 34.1859, 131.4714),
    ("Tokushima", 34.0658, 134.5593),
    ("Takamatsu", 34.3401, 134.0434),
    ("Matsuyama", 33.8416, 132.7657),
    ("Kochi", 33.5597, 133.5311),
    ("Fukuoka", 33.5904, 130.4017),
    ("Saga", 33.2494, 130.2974),
    ("Nagasaki", 32.7450, 129.8739),
    ("Kumamoto", 32.7900, 130.7420),
    ("Oita", 33.2381, 131.6119),
    ("Miyazaki", 31.9110, 131.4240),
    ("Kagoshima", 31.5600, 130.5580),
    ("Naha", 26.2124, 127.6809),
];

/// Read-only, ordered mapping from city id to coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct CityRegistry {
    name: String,
    cities: Vec<CityCoordinate>,
}

impl CityRegistry {
    /// Build a registry from a configured city list.
    ///
    /// Fails on an empty list, a blank or duplicate id, or out-of-range
    /// coordinates.
    pub fn new(name: impl Into<String>, cities: Vec<CityCoordinate>) -> Result<Self, TempMapError> {
        let name = name.into();
        if cities.is_empty() {
            return Err(TempMapError::config(format!(
                "Registry '{name}' must contain at least one city"
            )));
        }

        let mut seen = HashSet::with_capacity(cities.len());
        for city in &cities {
            city.validate()?;
            if !seen.insert(city.city_id.as_str()) {
                return Err(TempMapError::config(format!(
                    "Duplicate city id '{}' in registry '{name}'",
                    city.city_id
                )));
            }
        }

        Ok(Self { name, cities })
    }

    fn from_static(name: &str, entries: &[(&str, f64, f64)]) -> Self {
        Self {
            name: name.to_string(),
            cities: entries
                .iter()
                .map(|&(id, lat, lon)| CityCoordinate::new(id, lat, lon))
                .collect(),
        }
    }

    #[must_use]
    pub fn kyushu() -> Self {
        Self::from_static(RegistryKind::Kyushu.as_str(), KYUSHU_CAPITALS)
    }

    #[must_use]
    pub fn japan() -> Self {
        Self::from_static(RegistryKind::Japan.as_str(), JAPAN_CAPITALS)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn iter(&self) -> impl Iterator<Item = &CityCoordinate> {
        self.cities.iter()
    }

    #[must_use]
    pub fn get(&self, city_id: &str) -> Option<&CityCoordinate> {
        self.cities.iter().find(|c| c.city_id == city_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

impl<'a> IntoIterator for &'a CityRegistry {
    type Item = &'a CityCoordinate;
    type IntoIter = std::slice::Iter<'a, CityCoordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.cities.iter()
    }
}
