//! Result of one fetch cycle

use serde::{Deserialize, Serialize};

use super::WeatherReading;
use crate::error::FetchError;

/// Ordered readings of one fetch cycle, in registry order.
///
/// Cities whose fetch failed have no row at all.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct WeatherTable {
    rows: Vec<WeatherReading>,
}

impl WeatherTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row. Callers iterate a registry, so ids are unique.
    pub(crate) fn push(&mut self, reading: WeatherReading) {
        debug_assert!(
            self.get(&reading.city_id).is_none(),
            "duplicate city id {}",
            reading.city_id
        );
        self.rows.push(reading);
    }

    #[must_use]
    pub fn rows(&self) -> &[WeatherReading] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeatherReading> {
        self.rows.iter()
    }

    #[must_use]
    pub fn get(&self, city_id: &str) -> Option<&WeatherReading> {
        self.rows.iter().find(|r| r.city_id == city_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lowest and highest temperature in the table
    #[must_use]
    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        self.rows.iter().map(|r| r.temperature_celsius).fold(None, |acc, t| match acc {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        })
    }

    /// Derived visual height per city, in table order
    #[must_use]
    pub fn elevations(&self) -> Vec<(&str, f64)> {
        self.rows
            .iter()
            .map(|r| (r.city_id.as_str(), r.elevation()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a WeatherTable {
    type Item = &'a WeatherReading;
    type IntoIter = std::slice::Iter<'a, WeatherReading>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// A city that was skipped during a fetch cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CityFailure {
    pub city_id: String,
    pub error: FetchError,
}

/// Table of one fetch cycle together with the cities it had to skip
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchReport {
    pub table: WeatherTable,
    pub failures: Vec<CityFailure>,
}

impl FetchReport {
    /// True when every registered city produced a row
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failed_city_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.city_id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CityCoordinate;

    fn table(temps: &[(&str, f64)]) -> WeatherTable {
        let mut table = WeatherTable::new();
        for (i, &(id, t)) in temps.iter().enumerate() {
            let city = CityCoordinate::new(id, 30.0 + i as f64, 130.0);
            table.push(WeatherReading::for_city(&city, t, None));
        }
        table
    }

    #[test]
    fn test_empty_table() {
        let table = WeatherTable::new();
        assert!(table.is_empty());
        assert_eq!(table.temperature_range(), None);
        assert!(table.elevations().is_empty());
    }

    #[test]
    fn test_temperature_range() {
        let table = table(&[("Saga", 12.5), ("Oita", -1.0), ("Naha", 21.0)]);
        assert_eq!(table.temperature_range(), Some((-1.0, 21.0)));
    }

    #[test]
    fn test_elevations_follow_row_order() {
        let table = table(&[("CityA", 20.0), ("CityB", 1.5)]);
        assert_eq!(table.elevations(), vec![("CityA", 60000.0), ("CityB", 4500.0)]);
        for row in &table {
            assert_eq!(row.elevation(), row.temperature_celsius * 3000.0);
        }
    }

    #[test]
    fn test_lookup_by_city_id() {
        let table = table(&[("Saga", 12.5), ("Oita", 9.0)]);
        assert_eq!(table.get("Oita").map(|r| r.temperature_celsius), Some(9.0));
        assert!(table.get("Kyoto").is_none());
    }

    #[test]
    fn test_report_failures() {
        let report = FetchReport {
            table: table(&[("CityA", 20.0)]),
            failures: vec![CityFailure {
                city_id: "CityB".to_string(),
                error: FetchError::timeout("timed out"),
            }],
        };
        assert!(!report.is_complete());
        assert_eq!(report.failed_city_ids(), vec!["CityB"]);
    }
}
