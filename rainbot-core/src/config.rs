use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::provider::GeocoderId;

/// Credentials for a single geocoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub api_key: String,
}

/// Where conversation state and rendered radar manifests are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Overrides the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub conversation_container: String,
    pub image_container: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            conversation_container: "weather".to_string(),
            image_container: "weather-images".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub base_url: String,
    /// How long a rendered manifest is reused before being rebuilt.
    pub max_age_days: i64,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            base_url: "https://radar.weather.gov/ridge".to_string(),
            max_age_days: 90,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default geocoder id, "bing" or "nominatim".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geocoder: Option<String>,

    /// Example TOML:
    /// [geocoders.bing]
    /// api_key = "..."
    #[serde(default)]
    pub geocoders: HashMap<String, GeocoderConfig>,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub radar: RadarConfig,
}

impl Config {
    /// The configured geocoder, falling back to Nominatim which needs no key.
    pub fn default_geocoder_id(&self) -> Result<GeocoderId> {
        match self.geocoder.as_deref() {
            Some(id) => GeocoderId::try_from(id),
            None => Ok(GeocoderId::Nominatim),
        }
    }

    pub fn set_default_geocoder(&mut self, id: GeocoderId) {
        self.geocoder = Some(id.as_str().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.radar_max_age()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "rainbot", "rainbot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Root directory of the blob store.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.store.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("store")),
        }
    }

    pub fn radar_max_age(&self) -> Result<chrono::Duration> {
        let days = self.radar.max_age_days;
        if days < 0 {
            return Err(anyhow!("radar.max_age_days must not be negative, got {days}"));
        }
        chrono::Duration::try_days(days)
            .ok_or_else(|| anyhow!("radar.max_age_days is out of range, got {days}"))
    }

    /// Set/replace a geocoder API key, making it the default if none is set.
    pub fn upsert_geocoder_api_key(&mut self, id: GeocoderId, api_key: String) {
        self.geocoders.insert(id.as_str().to_string(), GeocoderConfig { api_key });

        if self.geocoder.is_none() {
            self.geocoder = Some(id.to_string());
        }
    }

    pub fn geocoder_api_key(&self, id: GeocoderId) -> Option<&str> {
        self.geocoders.get(id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_geocoder_configured(&self, id: GeocoderId) -> bool {
        !id.requires_api_key() || self.geocoder_api_key(id).is_some()
    }
}
