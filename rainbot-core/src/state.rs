use serde::{Deserialize, Serialize};

use crate::layers::LayerStack;

/// Persisted per-conversation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSettings {
    /// Callsign of the last resolved station, if any lookup has succeeded.
    #[serde(default)]
    pub station: Option<String>,

    #[serde(default)]
    pub layers: LayerStack,
}
