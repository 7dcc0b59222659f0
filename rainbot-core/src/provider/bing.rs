use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::geo::Coordinate;

use super::{LocationResolver, ResolveError, truncate_body};

const LOCATIONS_URL: &str = "https://dev.virtualearth.net/REST/v1/Locations";

/// Bing Maps REST Locations API.
#[derive(Debug, Clone)]
pub struct BingLocationResolver {
    api_key: String,
    http: Client,
}

impl BingLocationResolver {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BingPoint {
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct BingResource {
    name: Option<String>,
    point: BingPoint,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResourceSet {
    resources: Vec<BingResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResponse {
    resource_sets: Vec<BingResourceSet>,
}

fn first_coordinate(parsed: BingResponse, place: &str) -> Result<Coordinate, ResolveError> {
    let resource = parsed
        .resource_sets
        .into_iter()
        .flat_map(|set| set.resources)
        .next()
        .ok_or_else(|| ResolveError::NotFound(place.to_string()))?;

    match resource.point.coordinates.as_slice() {
        [latitude, longitude, ..] => {
            debug!(place, name = ?resource.name, "bing resolved location");
            Ok(Coordinate::new(*latitude, *longitude))
        }
        _ => Err(ResolveError::Service(
            "Bing Maps returned a point without coordinates".to_string(),
        )),
    }
}

#[async_trait]
impl LocationResolver for BingLocationResolver {
    async fn resolve(&self, place: &str) -> Result<Coordinate, ResolveError> {
        let res = self
            .http
            .get(LOCATIONS_URL)
            .query(&[("q", place), ("maxResults", "1"), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|err| ResolveError::Service(format!("Failed to reach Bing Maps: {err}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|err| {
            ResolveError::Service(format!("Failed to read Bing Maps response body: {err}"))
        })?;

        if !status.is_success() {
            return Err(ResolveError::Service(format!(
                "Bing Maps request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: BingResponse = serde_json::from_str(&body).map_err(|err| {
            ResolveError::Service(format!("Failed to parse Bing Maps JSON: {err}"))
        })?;

        first_coordinate(parsed, place)
    }
}
