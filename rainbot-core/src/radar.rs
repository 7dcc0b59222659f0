//! Radar imagery for a station and layer stack.
//!
//! Pixel compositing happens downstream. The retriever produces a manifest
//! listing one overlay image per layer in rendering order, caches it in the
//! image container, and hands back an attachment pointing at it.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::{
    layers::LayerType,
    model::AttachmentResponse,
    state::WeatherSettings,
    store::{Store, StoreError},
};

pub const MANIFEST_CONTENT_TYPE: &str = "application/json";

const GOES_CONUS_GEOCOLOR: &str =
    "https://cdn.star.nesdis.noaa.gov/GOES16/ABI/CONUS/GEOCOLOR/latest.jpg";

#[derive(Debug, thiserror::Error)]
pub enum RadarError {
    #[error("no station selected")]
    NoStation,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode radar manifest: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait RadarImageRetriever: Send + Sync + Debug {
    /// Imagery for the settings' station and layers. Cached renders older
    /// than `max_age` are rebuilt.
    async fn get_image(
        &self,
        settings: &WeatherSettings,
        store: &dyn Store,
        container: &str,
        max_age: Duration,
    ) -> Result<AttachmentResponse, RadarError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayImage {
    pub layer: LayerType,
    pub url: String,
}

/// Overlay list for one station, bottom layer first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarManifest {
    pub station: String,
    pub overlays: Vec<OverlayImage>,
    pub rendered_at: DateTime<Utc>,
}

/// Builds overlay URLs following the NWS RIDGE image layout.
#[derive(Debug, Clone)]
pub struct RidgeRadarRetriever {
    base_url: String,
}

impl RidgeRadarRetriever {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// RIDGE paths use the site id without the leading "K".
    fn site_id(callsign: &str) -> &str {
        match callsign.strip_prefix('K') {
            Some(site) if site.len() == 3 => site,
            _ => callsign,
        }
    }

    pub fn overlay_url(&self, layer: LayerType, callsign: &str) -> Option<String> {
        let base = &self.base_url;
        let site = Self::site_id(callsign);
        let url = match layer {
            LayerType::Topography => format!("{base}/Overlays/Topo/Short/{site}_Topo_Short.jpg"),
            LayerType::Radar => format!("{base}/RadarImg/N0R/{site}_N0R_0.gif"),
            LayerType::Satellite => GOES_CONUS_GEOCOLOR.to_string(),
            LayerType::Counties => format!("{base}/Overlays/County/Short/{site}_County_Short.gif"),
            LayerType::Rivers => format!("{base}/Overlays/Rivers/Short/{site}_Rivers_Short.gif"),
            LayerType::Highways => {
                format!("{base}/Overlays/Highways/Short/{site}_Highways_Short.gif")
            }
            LayerType::Cities => format!("{base}/Overlays/Cities/Short/{site}_City_Short.gif"),
            LayerType::Warnings => format!("{base}/Warnings/Short/{site}_Warnings_0.gif"),
            LayerType::Legend => format!("{base}/Legend/N0R/{site}_N0R_Legend_0.gif"),
            LayerType::Unknown => return None,
        };
        Some(url)
    }

    /// An empty stack renders the base radar layer alone.
    fn layers_to_render(settings: &WeatherSettings) -> Vec<LayerType> {
        if settings.layers.is_empty() {
            vec![LayerType::Radar]
        } else {
            settings.layers.radar_layers().to_vec()
        }
    }

    fn manifest_key(callsign: &str, layers: &[LayerType]) -> String {
        let mut key = callsign.to_string();
        for layer in layers {
            key.push('-');
            key.push_str(&layer.friendly_name().to_lowercase());
        }
        key
    }

    pub fn build_manifest(&self, callsign: &str, layers: &[LayerType], now: DateTime<Utc>) -> RadarManifest {
        let overlays = layers
            .iter()
            .filter_map(|layer| {
                self.overlay_url(*layer, callsign).map(|url| OverlayImage { layer: *layer, url })
            })
            .collect();

        RadarManifest {
            station: callsign.to_string(),
            overlays,
            rendered_at: now,
        }
    }

    pub async fn get_image_at(
        &self,
        settings: &WeatherSettings,
        store: &dyn Store,
        container: &str,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Result<AttachmentResponse, RadarError> {
        let callsign = settings.station.as_deref().ok_or(RadarError::NoStation)?;
        let layers = Self::layers_to_render(settings);
        let key = Self::manifest_key(callsign, &layers);

        let cached = match store.get(container, &key).await? {
            Some(bytes) => match serde_json::from_slice::<RadarManifest>(&bytes) {
                Ok(manifest) => Some(manifest),
                Err(err) => {
                    warn!(key = %key, error = %err, "discarding unreadable radar manifest");
                    None
                }
            },
            None => None,
        };

        match cached {
            Some(manifest) if now - manifest.rendered_at <= max_age => {
                debug!(key = %key, "reusing cached radar manifest");
            }
            _ => {
                let manifest = self.build_manifest(callsign, &layers, now);
                store.put(container, &key, serde_json::to_vec(&manifest)?).await?;
                debug!(key = %key, overlays = manifest.overlays.len(), "rendered radar manifest");
            }
        }

        Ok(AttachmentResponse {
            content_url: store.locate(container, &key),
            content_type: MANIFEST_CONTENT_TYPE.to_string(),
            name: Some(format!("{callsign} radar")),
        })
    }
}

#[async_trait]
impl RadarImageRetriever for RidgeRadarRetriever {
    async fn get_image(
        &self,
        settings: &WeatherSettings,
        store: &dyn Store,
        container: &str,
        max_age: Duration,
    ) -> Result<AttachmentResponse, RadarError> {
        self.get_image_at(settings, store, container, max_age, Utc::now())
            .await
    }
}
