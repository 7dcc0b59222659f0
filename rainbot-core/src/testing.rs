//! Collaborator fakes shared by the unit tests.

use async_trait::async_trait;
use chrono::Duration;
use std::{collections::HashMap, sync::Mutex};

use crate::{
    geo::Coordinate,
    model::AttachmentResponse,
    provider::{LocationResolver, ResolveError},
    radar::{RadarError, RadarImageRetriever},
    state::WeatherSettings,
    store::{Store, StoreError},
};

/// A store whose every operation fails.
#[derive(Debug)]
pub struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn get(&self, _container: &str, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Backend("store offline".into()))
    }

    async fn put(&self, _container: &str, _key: &str, _value: Vec<u8>) -> Result<(), StoreError> {
        Err(StoreError::Backend("store offline".into()))
    }

    async fn delete(&self, _container: &str, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("store offline".into()))
    }

    fn locate(&self, container: &str, key: &str) -> String {
        format!("offline://{container}/{key}")
    }
}

/// Resolves only the places it was given.
#[derive(Debug, Default)]
pub struct FakeResolver {
    places: HashMap<String, Coordinate>,
    pub lookups: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn with_place(mut self, place: &str, coordinate: Coordinate) -> Self {
        self.places.insert(place.to_string(), coordinate);
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocationResolver for FakeResolver {
    async fn resolve(&self, place: &str) -> Result<Coordinate, ResolveError> {
        self.lookups.lock().unwrap().push(place.to_string());
        self.places
            .get(place)
            .copied()
            .ok_or_else(|| ResolveError::NotFound(place.to_string()))
    }
}

/// Returns a synthetic attachment describing what was asked for.
#[derive(Debug, Default)]
pub struct RecordingRadar {
    pub requests: Mutex<Vec<(WeatherSettings, String, Duration)>>,
}

impl RecordingRadar {
    pub fn requests(&self) -> Vec<(WeatherSettings, String, Duration)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RadarImageRetriever for RecordingRadar {
    async fn get_image(
        &self,
        settings: &WeatherSettings,
        _store: &dyn Store,
        container: &str,
        max_age: Duration,
    ) -> Result<AttachmentResponse, RadarError> {
        self.requests
            .lock()
            .unwrap()
            .push((settings.clone(), container.to_string(), max_age));

        let station = settings.station.as_deref().ok_or(RadarError::NoStation)?;
        let layers: Vec<_> = settings
            .layers
            .radar_layers()
            .iter()
            .map(|l| l.friendly_name())
            .collect();

        Ok(AttachmentResponse {
            content_url: format!("radar://{station}/{}", layers.join("+")),
            content_type: "image/gif".to_string(),
            name: Some(format!("{station} radar")),
        })
    }
}
