//! NEXRAD radar stations and nearest-station lookup.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub callsign: String,
    pub city: String,
    pub location: Coordinate,
}

impl Station {
    pub fn new(callsign: impl Into<String>, city: impl Into<String>, location: Coordinate) -> Self {
        Self {
            callsign: callsign.into(),
            city: city.into(),
            location,
        }
    }
}

pub trait StationLocator: Send + Sync + Debug {
    /// The station nearest to `coordinate`. Always yields a station.
    fn find_closest(&self, coordinate: &Coordinate) -> Station;
}

#[derive(Debug, thiserror::Error)]
#[error("a station catalog needs at least one station")]
pub struct EmptyCatalog;

/// Fixed list of stations searched by great-circle distance.
#[derive(Debug, Clone)]
pub struct StationCatalog {
    stations: Vec<Station>,
}

impl StationCatalog {
    pub fn new(stations: Vec<Station>) -> Result<Self, EmptyCatalog> {
        if stations.is_empty() {
            return Err(EmptyCatalog);
        }
        Ok(Self { stations })
    }

    /// WSR-88D sites covering the major US metro areas.
    pub fn builtin() -> Self {
        let stations = BUILTIN_STATIONS
            .iter()
            .map(|(callsign, city, lat, lon)| Station::new(*callsign, *city, Coordinate::new(*lat, *lon)))
            .collect();
        Self { stations }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }
}

impl StationLocator for StationCatalog {
    fn find_closest(&self, coordinate: &Coordinate) -> Station {
        let mut best = &self.stations[0];
        let mut best_distance = best.location.distance_to(coordinate);
        for station in &self.stations[1..] {
            let distance = station.location.distance_to(coordinate);
            if distance < best_distance {
                best = station;
                best_distance = distance;
            }
        }
        best.clone()
    }
}

const BUILTIN_STATIONS: &[(&str, &str, f64, f64)] = &[
    ("KATX", "Seattle", 48.1946, -122.4957),
    ("KRTX", "Portland", 45.7150, -122.9650),
    ("KMUX", "San Francisco", 37.1552, -121.8984),
    ("KVTX", "Los Angeles", 34.4116, -119.1795),
    ("KNKX", "San Diego", 32.9189, -117.0419),
    ("KESX", "Las Vegas", 35.7013, -114.8914),
    ("KIWA", "Phoenix", 33.2891, -111.6700),
    ("KMTX", "Salt Lake City", 41.2628, -112.4480),
    ("KFTG", "Denver", 39.7866, -104.5458),
    ("KFWS", "Dallas", 32.5730, -97.3031),
    ("KHGX", "Houston", 29.4719, -95.0792),
    ("KMPX", "Minneapolis", 44.8489, -93.5655),
    ("KLSX", "St. Louis", 38.6989, -90.6828),
    ("KLOT", "Chicago", 41.6045, -88.0847),
    ("KDTX", "Detroit", 42.6999, -83.4718),
    ("KFFC", "Atlanta", 33.3636, -84.5658),
    ("KAMX", "Miami", 25.6111, -80.4128),
    ("KLWX", "Washington", 38.9753, -77.4778),
    ("KOKX", "New York", 40.8655, -72.8638),
    ("KBOX", "Boston", 41.9559, -71.1370),
];
