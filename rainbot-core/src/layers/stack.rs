use serde::{Deserialize, Serialize};

use super::LayerType;

/// Ordered radar overlays, bottom to top. A layer appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LayerType>", into = "Vec<LayerType>")]
pub struct LayerStack {
    layers: Vec<LayerType>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers in rendering order, bottom first.
    pub fn radar_layers(&self) -> &[LayerType] {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn contains(&self, layer: LayerType) -> bool {
        self.layers.contains(&layer)
    }

    /// Put `layer` on top. Returns a remark, or an empty string when none is needed.
    pub fn add_layer(&mut self, layer: LayerType) -> String {
        if layer == LayerType::Unknown {
            return unknown_remark();
        }
        if self.contains(layer) {
            return format!("The {layer} layer is already present.");
        }

        self.layers.push(layer);
        String::new()
    }

    pub fn remove_layer(&mut self, layer: LayerType) -> String {
        match self.position(layer) {
            Some(index) => {
                self.layers.remove(index);
                String::new()
            }
            None => not_present_remark(layer),
        }
    }

    /// Swap `layer` with the one directly above it.
    pub fn promote_layer(&mut self, layer: LayerType) -> String {
        let Some(index) = self.position(layer) else {
            return not_present_remark(layer);
        };
        if index + 1 == self.layers.len() {
            return format!("The {layer} layer is already the topmost layer.");
        }

        self.layers.swap(index, index + 1);
        String::new()
    }

    /// Swap `layer` with the one directly below it.
    pub fn demote_layer(&mut self, layer: LayerType) -> String {
        let Some(index) = self.position(layer) else {
            return not_present_remark(layer);
        };
        if index == 0 {
            return format!("The {layer} layer is already the bottommost layer.");
        }

        self.layers.swap(index, index - 1);
        String::new()
    }

    fn position(&self, layer: LayerType) -> Option<usize> {
        if layer == LayerType::Unknown {
            return None;
        }
        self.layers.iter().position(|l| *l == layer)
    }
}

fn not_present_remark(layer: LayerType) -> String {
    if layer == LayerType::Unknown {
        return unknown_remark();
    }
    format!("The {layer} layer is not present.")
}

fn unknown_remark() -> String {
    "That is not a valid layer.".to_string()
}

impl TryFrom<Vec<LayerType>> for LayerStack {
    type Error = String;

    fn try_from(layers: Vec<LayerType>) -> Result<Self, Self::Error> {
        let mut stack = LayerStack::new();
        for layer in layers {
            let remark = stack.add_layer(layer);
            if !remark.is_empty() {
                return Err(format!("invalid layer stack: {remark}"));
            }
        }
        Ok(stack)
    }
}

impl From<LayerStack> for Vec<LayerType> {
    fn from(stack: LayerStack) -> Self {
        stack.layers
    }
}
