use crate::{
    Config,
    geo::Coordinate,
    provider::{bing::BingLocationResolver, nominatim::NominatimLocationResolver},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod bing;
pub mod nominatim;

/// Geocoding services that can turn a place name into a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeocoderId {
    Bing,
    Nominatim,
}

impl GeocoderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocoderId::Bing => "bing",
            GeocoderId::Nominatim => "nominatim",
        }
    }

    pub const fn all() -> &'static [GeocoderId] {
        &[GeocoderId::Bing, GeocoderId::Nominatim]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, GeocoderId::Bing)
    }
}

impl std::fmt::Display for GeocoderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GeocoderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "bing" => Ok(GeocoderId::Bing),
            "nominatim" | "osm" => Ok(GeocoderId::Nominatim),
            _ => Err(anyhow::anyhow!(
                "Unknown geocoder '{value}'. Supported geocoders: bing, nominatim."
            )),
        }
    }
}

/// Failure to turn free text into a coordinate. The message is shown to users.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Could not find a location matching '{0}'")]
    NotFound(String),

    #[error("Location lookup failed: {0}")]
    Service(String),
}

#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    async fn resolve(&self, place: &str) -> Result<Coordinate, ResolveError>;
}

/// Construct a resolver from config and explicit GeocoderId.
pub fn resolver_from_config(
    id: GeocoderId,
    config: &Config,
) -> anyhow::Result<Box<dyn LocationResolver>> {
    let boxed: Box<dyn LocationResolver> = match id {
        GeocoderId::Bing => {
            let api_key = config.geocoder_api_key(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for geocoder '{id}'.\n\
                     Hint: run `rainbot configure {id}` and enter your API key."
                )
            })?;
            Box::new(BingLocationResolver::new(api_key.to_owned()))
        }
        GeocoderId::Nominatim => Box::new(NominatimLocationResolver::new()),
    };

    Ok(boxed)
}

/// Construct the default resolver from config, using the `geocoder` field.
pub fn default_resolver_from_config(config: &Config) -> anyhow::Result<Box<dyn LocationResolver>> {
    let id = config.default_geocoder_id()?;
    resolver_from_config(id, config)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
