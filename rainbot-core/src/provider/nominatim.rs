use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::geo::Coordinate;

use super::{LocationResolver, ResolveError, truncate_body};

const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// OpenStreetMap Nominatim search. Needs no key, but does require an
/// identifying user agent.
#[derive(Debug, Clone)]
pub struct NominatimLocationResolver {
    http: Client,
}

impl NominatimLocationResolver {
    pub fn new() -> Self {
        let http = Client::builder()
            .user_agent(concat!("rainbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http }
    }
}

impl Default for NominatimLocationResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Nominatim reports coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

fn first_coordinate(places: Vec<NominatimPlace>, place: &str) -> Result<Coordinate, ResolveError> {
    let first = places
        .into_iter()
        .next()
        .ok_or_else(|| ResolveError::NotFound(place.to_string()))?;

    let latitude: f64 = first
        .lat
        .parse()
        .map_err(|_| ResolveError::Service(format!("Invalid latitude '{}'", first.lat)))?;
    let longitude: f64 = first
        .lon
        .parse()
        .map_err(|_| ResolveError::Service(format!("Invalid longitude '{}'", first.lon)))?;

    debug!(place, name = ?first.display_name, "nominatim resolved location");
    Ok(Coordinate::new(latitude, longitude))
}

#[async_trait]
impl LocationResolver for NominatimLocationResolver {
    async fn resolve(&self, place: &str) -> Result<Coordinate, ResolveError> {
        let res = self
            .http
            .get(SEARCH_URL)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|err| ResolveError::Service(format!("Failed to reach Nominatim: {err}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|err| {
            ResolveError::Service(format!("Failed to read Nominatim response body: {err}"))
        })?;

        if !status.is_success() {
            return Err(ResolveError::Service(format!(
                "Nominatim request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let places: Vec<NominatimPlace> = serde_json::from_str(&body).map_err(|err| {
            ResolveError::Service(format!("Failed to parse Nominatim JSON: {err}"))
        })?;

        first_coordinate(places, place)
    }
}
