//! Radar overlay identifiers and the name registry used to parse and
//! display them.

use serde::{Deserialize, Serialize};

pub mod stack;

pub use stack::LayerStack;

/// A radar overlay that can be stacked for composite rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerType {
    Topography,
    Radar,
    Satellite,
    Counties,
    Rivers,
    Highways,
    Cities,
    Warnings,
    Legend,
    /// Sentinel for tokens that match no known overlay. Never stored.
    Unknown,
}

impl LayerType {
    /// Every real overlay, in the order they are listed to users.
    pub const fn all() -> &'static [LayerType] {
        &[
            LayerType::Topography,
            LayerType::Radar,
            LayerType::Satellite,
            LayerType::Counties,
            LayerType::Rivers,
            LayerType::Highways,
            LayerType::Cities,
            LayerType::Warnings,
            LayerType::Legend,
        ]
    }

    pub fn friendly_name(&self) -> &'static str {
        match self {
            LayerType::Topography => "Topography",
            LayerType::Radar => "Radar",
            LayerType::Satellite => "Satellite",
            LayerType::Counties => "Counties",
            LayerType::Rivers => "Rivers",
            LayerType::Highways => "Highways",
            LayerType::Cities => "Cities",
            LayerType::Warnings => "Warnings",
            LayerType::Legend => "Legend",
            LayerType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.friendly_name())
    }
}

/// Parse a user token into a layer. Unrecognized tokens yield
/// [`LayerType::Unknown`].
pub fn get_layer(token: &str) -> LayerType {
    match token.trim().to_lowercase().as_str() {
        "topography" | "topo" | "terrain" => LayerType::Topography,
        "radar" | "reflectivity" | "precipitation" => LayerType::Radar,
        "satellite" => LayerType::Satellite,
        "counties" | "county" => LayerType::Counties,
        "rivers" | "river" => LayerType::Rivers,
        "highways" | "highway" | "roads" => LayerType::Highways,
        "cities" | "city" => LayerType::Cities,
        "warnings" | "warning" | "alerts" => LayerType::Warnings,
        "legend" => LayerType::Legend,
        _ => LayerType::Unknown,
    }
}

pub fn friendly_name(layer: LayerType) -> &'static str {
    layer.friendly_name()
}

/// Display names of every recognized layer, in a fixed order.
pub fn all_layer_names() -> Vec<&'static str> {
    LayerType::all().iter().map(LayerType::friendly_name).collect()
}
