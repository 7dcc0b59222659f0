//! Core library for the RainBot weather assistant.
//!
//! This crate defines:
//! - The generic conversation shell (load state, start or continue, persist)
//! - The weather command interpreter and its radar layer stack
//! - Collaborators: geocoders, station lookup, radar imagery, blob storage
//! - Configuration & credentials handling
//!
//! It is used by `rainbot-cli`, but can also sit behind any other transport.

pub mod config;
pub mod conversation;
pub mod geo;
pub mod interpreter;
pub mod layers;
pub mod model;
pub mod provider;
pub mod radar;
pub mod state;
pub mod station;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, GeocoderConfig, RadarConfig, StoreConfig};
pub use conversation::{ConversationHandler, ConversationProcessor, Turn, TurnError};
pub use interpreter::WeatherInterpreter;
pub use layers::{LayerStack, LayerType};
pub use model::{AttachmentRequest, AttachmentResponse, Request, Response};
pub use provider::{GeocoderId, LocationResolver};
pub use state::WeatherSettings;
pub use store::{FileStore, MemoryStore, Store};

/// The weather bot's turn processor.
pub type WeatherProcessor = ConversationProcessor<WeatherInterpreter>;
