//! The weather bot's command language.
//!
//! Matching is by keyword containment on the lowercased message, in a fixed
//! precedence: `quit`, then `weather`, then `layers`/`layer`. Inside the
//! layer family the sub-commands are tried as `add`, `remove`, `promote`,
//! `demote`.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    conversation::{ConversationHandler, Turn},
    geo::display_distance_km,
    layers::{self, LayerStack, LayerType},
    model::{AttachmentResponse, Request, Response},
    provider::LocationResolver,
    radar::RadarImageRetriever,
    state::WeatherSettings,
    station::StationLocator,
    store::Store,
};

/// Separator between reply paragraphs.
pub const PARAGRAPH: &str = "\n\n";

pub const DEFAULT_IMAGE_CONTAINER: &str = "weather-images";

const HELP_LINES: &[&str] = &[
    "To get the current weather, send in 'weather LOCATION'. For example, 'weather Seattle, WA'.",
    "The weather command will return the weather from the nearest NOAA station to your provided location.",
    "If you omit the location, the 'weather' command will use the last-returned location.",
    "Layers can be added, removed, or rearranged. To see the current list of layers, type in 'layers'.",
    "To add or remove layers, type in 'layers add LAYER' or 'layers remove LAYER'",
    "To promote or demote layers (rearranging them), type in 'layers promote LAYER' or 'layers demote LAYER'",
];

pub fn help_text() -> String {
    HELP_LINES.join(PARAGRAPH)
}

pub fn welcome_text() -> String {
    format!("RainBot (Weather).{PARAGRAPH}{}", help_text())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerAction {
    Add,
    Remove,
    Promote,
    Demote,
}

impl LayerAction {
    /// Sub-commands in matching precedence.
    pub const fn all() -> &'static [LayerAction] {
        &[
            LayerAction::Add,
            LayerAction::Remove,
            LayerAction::Promote,
            LayerAction::Demote,
        ]
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            LayerAction::Add => "add",
            LayerAction::Remove => "remove",
            LayerAction::Promote => "promote",
            LayerAction::Demote => "demote",
        }
    }

    pub fn apply(&self, stack: &mut LayerStack, layer: LayerType) -> String {
        match self {
            LayerAction::Add => stack.add_layer(layer),
            LayerAction::Remove => stack.remove_layer(layer),
            LayerAction::Promote => stack.promote_layer(layer),
            LayerAction::Demote => stack.demote_layer(layer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// `None` reuses the stored station.
    Weather { location: Option<String> },
    /// `None` lists the sub-commands and current layers.
    Layers(Option<(LayerAction, String)>),
    Unknown,
}

fn strip(text: &str, keyword: &str) -> String {
    text.replace(keyword, "").trim().to_string()
}

pub fn parse_command(text: &str) -> Command {
    let input = text.trim().to_lowercase();

    if input.contains("quit") {
        return Command::Quit;
    }

    if input.contains("weather") {
        let rest = strip(&input, "weather");
        let location = (!rest.is_empty()).then_some(rest);
        return Command::Weather { location };
    }

    // "layer" also covers "layers".
    if input.contains("layer") {
        let rest = strip(&input.replace("layers", ""), "layer");
        let action = LayerAction::all()
            .iter()
            .find(|action| rest.contains(action.keyword()))
            .map(|action| (*action, strip(&rest, action.keyword())));
        return Command::Layers(action);
    }

    Command::Unknown
}

/// Turn handler for the weather bot.
#[derive(Debug)]
pub struct WeatherInterpreter {
    resolver: Arc<dyn LocationResolver>,
    stations: Arc<dyn StationLocator>,
    radar: Arc<dyn RadarImageRetriever>,
    images: Arc<dyn Store>,
    image_container: String,
    max_age: Duration,
}

impl WeatherInterpreter {
    pub fn new(
        resolver: Arc<dyn LocationResolver>,
        stations: Arc<dyn StationLocator>,
        radar: Arc<dyn RadarImageRetriever>,
        images: Arc<dyn Store>,
    ) -> Self {
        Self {
            resolver,
            stations,
            radar,
            images,
            image_container: DEFAULT_IMAGE_CONTAINER.to_string(),
            max_age: Duration::days(3 * 30),
        }
    }

    pub fn with_image_container(mut self, container: impl Into<String>) -> Self {
        self.image_container = container.into();
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    async fn weather(
        &self,
        location: Option<&str>,
        settings: &mut WeatherSettings,
        lines: &mut Vec<String>,
    ) -> anyhow::Result<Vec<AttachmentResponse>> {
        if let Some(place) = location {
            self.select_station(place, settings, lines).await;
        }

        if settings.station.is_none() {
            lines.push(
                "No station is selected yet. Send 'weather LOCATION' first, for example 'weather Seattle, WA'."
                    .to_string(),
            );
            return Ok(Vec::new());
        }

        let image = self
            .radar
            .get_image(settings, self.images.as_ref(), &self.image_container, self.max_age)
            .await
            .context("failed to retrieve radar image")?;
        Ok(vec![image])
    }

    /// Resolution failures become a reply line; the turn goes on.
    async fn select_station(&self, place: &str, settings: &mut WeatherSettings, lines: &mut Vec<String>) {
        let coordinate = match self.resolver.resolve(place).await {
            Ok(coordinate) => coordinate,
            Err(err) => {
                warn!(place, error = %err, "location lookup failed");
                lines.push(err.to_string());
                return;
            }
        };

        let closest = self.stations.find_closest(&coordinate);
        let km = display_distance_km(closest.location.distance_to(&coordinate));
        debug!(place, %coordinate, station = %closest.callsign, km, "closest station");

        if settings.station.as_deref() == Some(closest.callsign.as_str()) {
            lines.push(format!(
                "{}, the currently-selected station, is still the closest NOAA station, {km} km away.",
                closest.callsign
            ));
        } else {
            lines.push(format!(
                "Using {} near {}, {km} km away.",
                closest.callsign, closest.city
            ));
            info!(station = %closest.callsign, "station changed");
            settings.station = Some(closest.callsign);
        }
    }

    fn layers(&self, command: Option<(LayerAction, String)>, settings: &mut WeatherSettings, lines: &mut Vec<String>) {
        let Some((action, name)) = command else {
            lines.push("Valid layer commands are 'add', 'remove', 'promote', or 'demote'".to_string());
            output_valid_layers(lines);
            output_current_layers(&settings.layers, lines);
            return;
        };

        let layer = layers::get_layer(&name);
        if layer == LayerType::Unknown {
            lines.push(format!("unknown layer '{name}'"));
            output_valid_layers(lines);
            return;
        }

        let remark = action.apply(&mut settings.layers, layer);
        if !remark.is_empty() {
            lines.push(remark);
        }
        output_current_layers(&settings.layers, lines);
    }
}

fn output_current_layers(stack: &LayerStack, lines: &mut Vec<String>) {
    lines.push("The following layers will be rendered from bottom to top:".to_string());
    if stack.is_empty() {
        lines.push("  (none)".to_string());
    }
    for layer in stack.radar_layers() {
        lines.push(format!("  {}", layers::friendly_name(*layer)));
    }
}

fn output_valid_layers(lines: &mut Vec<String>) {
    lines.push("The following layers are valid layers:".to_string());
    lines.push(format!("  {}", layers::all_layer_names().join(", ")));
}

#[async_trait]
impl ConversationHandler for WeatherInterpreter {
    type State = WeatherSettings;

    async fn on_start(&self, _request: &Request) -> anyhow::Result<(WeatherSettings, Response)> {
        Ok((WeatherSettings::default(), Response::text(welcome_text())))
    }

    async fn on_continue(
        &self,
        request: &Request,
        mut settings: WeatherSettings,
    ) -> anyhow::Result<Turn<WeatherSettings>> {
        let command = parse_command(&request.text);
        debug!(?command, "parsed command");

        let mut lines = Vec::new();
        let mut attachments = Vec::new();

        match command {
            Command::Quit => {
                return Ok(Turn::reset(Response::text(
                    "Conversation reset. Send any message to start over.",
                )));
            }
            Command::Weather { location } => {
                attachments = self.weather(location.as_deref(), &mut settings, &mut lines).await?;
            }
            Command::Layers(action) => self.layers(action, &mut settings, &mut lines),
            Command::Unknown => {
                lines.push("Unknown command!".to_string());
                lines.push(help_text());
            }
        }

        Ok(Turn::keep(
            settings,
            Response::with_attachments(lines.join(PARAGRAPH), attachments),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        conversation::ConversationProcessor,
        geo::Coordinate,
        station::{Station, StationCatalog},
        store::MemoryStore,
        testing::{FailingStore, FakeResolver, RecordingRadar},
    };

    const SEATTLE: Coordinate = Coordinate::new(47.6062, -122.3321);
    const PORTLAND: Coordinate = Coordinate::new(45.5152, -122.6784);

    struct Fixture {
        resolver: Arc<FakeResolver>,
        radar: Arc<RecordingRadar>,
        interpreter: WeatherInterpreter,
    }

    fn fixture() -> Fixture {
        let resolver = Arc::new(
            FakeResolver::default()
                .with_place("seattle", SEATTLE)
                .with_place("tacoma", Coordinate::new(47.2529, -122.4443))
                .with_place("portland, or", PORTLAND),
        );
        let stations = Arc::new(
            StationCatalog::new(vec![
                Station::new("KSEA", "Seattle", Coordinate::new(47.4447, -122.3136)),
                Station::new("KPDX", "Portland", Coordinate::new(45.5887, -122.5975)),
            ])
            .unwrap(),
        );
        let radar = Arc::new(RecordingRadar::default());
        let interpreter = WeatherInterpreter::new(
            resolver.clone(),
            stations,
            radar.clone(),
            Arc::new(MemoryStore::new()),
        );

        Fixture {
            resolver,
            radar,
            interpreter,
        }
    }

    fn settings_with(station: Option<&str>, layers: &[LayerType]) -> WeatherSettings {
        let mut settings = WeatherSettings {
            station: station.map(str::to_string),
            ..Default::default()
        };
        for layer in layers {
            settings.layers.add_layer(*layer);
        }
        settings
    }

    async fn turn(fixture: &Fixture, text: &str, settings: WeatherSettings) -> Turn<WeatherSettings> {
        fixture
            .interpreter
            .on_continue(&Request::new(text, "ann", "c1"), settings)
            .await
            .unwrap()
    }

    #[test]
    fn parse_precedence() {
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("Quit the weather layers"), Command::Quit);
        assert_eq!(
            parse_command("weather layers"),
            Command::Weather {
                location: Some("layers".into())
            }
        );
        assert_eq!(parse_command("  WEATHER  "), Command::Weather { location: None });
        assert_eq!(parse_command("hello"), Command::Unknown);
    }

    #[test]
    fn parse_layer_sub_commands() {
        assert_eq!(
            parse_command("layers add Radar"),
            Command::Layers(Some((LayerAction::Add, "radar".into())))
        );
        assert_eq!(
            parse_command("layer demote cities"),
            Command::Layers(Some((LayerAction::Demote, "cities".into())))
        );
        assert_eq!(parse_command("layers"), Command::Layers(None));
        assert_eq!(parse_command("layers shuffle"), Command::Layers(None));
        // add wins over remove when both appear.
        assert_eq!(
            parse_command("layers remove add radar"),
            Command::Layers(Some((LayerAction::Add, "remove  radar".into())))
        );
    }

    #[tokio::test]
    async fn start_returns_welcome_and_empty_settings() {
        let fixture = fixture();
        let (settings, response) = fixture
            .interpreter
            .on_start(&Request::new("weather seattle", "ann", "c1"))
            .await
            .unwrap();

        assert_eq!(settings, WeatherSettings::default());
        assert!(response.text.starts_with("RainBot (Weather)."));
        assert!(response.text.contains(&help_text()));
        assert!(response.attachments.is_empty());
        assert!(fixture.resolver.lookups().is_empty());
    }

    #[tokio::test]
    async fn weather_with_location_selects_station() {
        let fixture = fixture();
        let turn = turn(&fixture, "weather Seattle", WeatherSettings::default()).await;

        let settings = turn.state.unwrap();
        assert_eq!(settings.station.as_deref(), Some("KSEA"));
        assert!(turn.response.text.starts_with("Using KSEA near Seattle, "));
        assert!(turn.response.text.contains(" km away."));
        assert_eq!(turn.response.attachments.len(), 1);
        assert_eq!(turn.response.attachments[0].content_url, "radar://KSEA/");
        assert_eq!(fixture.resolver.lookups(), vec!["seattle".to_string()]);
    }

    #[tokio::test]
    async fn weather_reports_truncated_distance() {
        let fixture = fixture();
        let turn = turn(&fixture, "weather seattle", WeatherSettings::default()).await;

        let station = Coordinate::new(47.4447, -122.3136);
        let km = display_distance_km(station.distance_to(&SEATTLE));
        assert!(turn.response.text.contains(&format!(", {km} km away.")));
    }

    #[tokio::test]
    async fn weather_with_same_station_reports_still_closest() {
        let fixture = fixture();
        let turn = turn(&fixture, "weather tacoma", settings_with(Some("KSEA"), &[])).await;

        assert_eq!(turn.state.unwrap().station.as_deref(), Some("KSEA"));
        assert!(
            turn.response
                .text
                .starts_with("KSEA, the currently-selected station, is still the closest NOAA station, ")
        );
    }

    #[tokio::test]
    async fn weather_switches_station_when_closer_one_found() {
        let fixture = fixture();
        let turn = turn(&fixture, "weather portland, or", settings_with(Some("KSEA"), &[])).await;

        assert_eq!(turn.state.unwrap().station.as_deref(), Some("KPDX"));
        assert!(turn.response.text.starts_with("Using KPDX near Portland"));
        assert_eq!(turn.response.attachments[0].content_url, "radar://KPDX/");
    }

    #[tokio::test]
    async fn bare_weather_reuses_stored_station() {
        let fixture = fixture();
        let prior = settings_with(Some("KSEA"), &[LayerType::Radar]);
        let turn = turn(&fixture, "weather", prior.clone()).await;

        assert_eq!(turn.state.unwrap(), prior);
        assert!(fixture.resolver.lookups().is_empty());
        assert_eq!(turn.response.attachments.len(), 1);
        assert_eq!(turn.response.attachments[0].content_url, "radar://KSEA/Radar");

        let requests = fixture.radar.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1, DEFAULT_IMAGE_CONTAINER);
        assert_eq!(requests[0].2, Duration::days(90));
    }

    #[tokio::test]
    async fn bare_weather_without_station_asks_for_location() {
        let fixture = fixture();
        let turn = turn(&fixture, "weather", WeatherSettings::default()).await;

        assert!(turn.response.text.contains("No station is selected yet"));
        assert!(turn.response.attachments.is_empty());
        assert!(fixture.radar.requests().is_empty());
    }

    #[tokio::test]
    async fn unresolvable_location_is_reported_and_turn_continues() {
        let fixture = fixture();
        let prior = settings_with(Some("KSEA"), &[]);
        let turn = turn(&fixture, "weather atlantis", prior.clone()).await;

        assert_eq!(turn.state.unwrap(), prior);
        assert!(turn.response.text.contains("Could not find a location matching 'atlantis'"));
        assert_eq!(turn.response.attachments[0].content_url, "radar://KSEA/");
    }

    #[tokio::test]
    async fn radar_failure_fails_the_turn() {
        let fixture = fixture();
        let interpreter = WeatherInterpreter::new(
            fixture.resolver.clone(),
            Arc::new(StationCatalog::builtin()),
            Arc::new(crate::radar::RidgeRadarRetriever::new("https://radar.example")),
            Arc::new(FailingStore),
        );

        let result = interpreter
            .on_continue(&Request::new("weather", "ann", "c1"), settings_with(Some("KATX"), &[]))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn layers_add_appends_and_lists() {
        let fixture = fixture();
        let turn = turn(&fixture, "layers add satellite", settings_with(None, &[LayerType::Radar])).await;

        let settings = turn.state.unwrap();
        assert_eq!(settings.layers.radar_layers(), &[LayerType::Radar, LayerType::Satellite]);
        assert_eq!(
            turn.response.text,
            [
                "The following layers will be rendered from bottom to top:",
                "  Radar",
                "  Satellite",
            ]
            .join(PARAGRAPH)
        );
        assert!(turn.response.attachments.is_empty());
    }

    #[tokio::test]
    async fn layers_add_duplicate_reports_remark() {
        let fixture = fixture();
        let prior = settings_with(None, &[LayerType::Radar]);
        let turn = turn(&fixture, "layers add radar", prior.clone()).await;

        assert_eq!(turn.state.unwrap(), prior);
        assert!(turn.response.text.starts_with("The Radar layer is already present."));
    }

    #[tokio::test]
    async fn layers_add_unknown_lists_valid_names() {
        let fixture = fixture();
        let prior = settings_with(None, &[LayerType::Radar]);
        let turn = turn(&fixture, "layers add bogus", prior.clone()).await;

        assert_eq!(turn.state.unwrap(), prior);
        assert!(turn.response.text.contains("unknown layer 'bogus'"));
        assert!(turn.response.text.contains("The following layers are valid layers:"));
        assert!(turn.response.text.contains(&layers::all_layer_names().join(", ")));
    }

    #[tokio::test]
    async fn layers_remove_promote_demote() {
        let fixture = fixture();
        let start = settings_with(None, &[LayerType::Radar, LayerType::Satellite, LayerType::Cities]);

        let promoted = turn(&fixture, "layers promote radar", start).await.state.unwrap();
        assert_eq!(
            promoted.layers.radar_layers(),
            &[LayerType::Satellite, LayerType::Radar, LayerType::Cities]
        );

        let demoted = turn(&fixture, "layer demote cities", promoted).await.state.unwrap();
        assert_eq!(
            demoted.layers.radar_layers(),
            &[LayerType::Satellite, LayerType::Cities, LayerType::Radar]
        );

        let removed = turn(&fixture, "layers remove satellite", demoted).await.state.unwrap();
        assert_eq!(removed.layers.radar_layers(), &[LayerType::Cities, LayerType::Radar]);
    }

    #[tokio::test]
    async fn layers_promote_topmost_reports_boundary() {
        let fixture = fixture();
        let prior = settings_with(None, &[LayerType::Radar, LayerType::Satellite]);
        let turn = turn(&fixture, "layers promote satellite", prior.clone()).await;

        assert_eq!(turn.state.unwrap(), prior);
        assert!(turn.response.text.contains("already the topmost layer"));
    }

    #[tokio::test]
    async fn bare_layers_lists_commands_and_layers() {
        let fixture = fixture();
        let turn = turn(&fixture, "layers", settings_with(None, &[LayerType::Legend])).await;

        let text = turn.response.text;
        assert!(text.starts_with("Valid layer commands are 'add', 'remove', 'promote', or 'demote'"));
        assert!(text.contains("The following layers are valid layers:"));
        assert!(text.ends_with("The following layers will be rendered from bottom to top:\n\n  Legend"));
    }

    #[tokio::test]
    async fn unknown_command_shows_help() {
        let fixture = fixture();
        let prior = settings_with(Some("KSEA"), &[LayerType::Radar]);
        let turn = turn(&fixture, "what's up", prior.clone()).await;

        assert_eq!(turn.state.unwrap(), prior);
        assert_eq!(
            turn.response.text,
            format!("Unknown command!{PARAGRAPH}{}", help_text())
        );
    }

    #[tokio::test]
    async fn quit_resets() {
        let fixture = fixture();
        let turn = turn(&fixture, "QUIT", settings_with(Some("KSEA"), &[LayerType::Radar])).await;

        assert!(turn.state.is_none());
        assert!(turn.response.text.contains("reset"));
        assert!(fixture.radar.requests().is_empty());
    }

    #[tokio::test]
    async fn stored_stack_with_duplicates_restarts_conversation() {
        let fixture = fixture();
        let store = Arc::new(MemoryStore::new());
        store
            .put(
                "weather",
                "c1",
                br#"{"station":"KSEA","layers":["radar","radar"]}"#.to_vec(),
            )
            .await
            .unwrap();
        let processor = ConversationProcessor::new(fixture.interpreter, store.clone(), "weather");

        let reply = processor.handle_turn(&Request::new("quit", "ann", "c1")).await.unwrap();
        assert_eq!(reply.text, welcome_text());

        let bytes = store.get("weather", "c1").await.unwrap().unwrap();
        let saved: WeatherSettings = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(saved, WeatherSettings::default());
    }

    #[tokio::test]
    async fn full_conversation_through_processor() {
        let fixture = fixture();
        let store = Arc::new(MemoryStore::new());
        let processor = ConversationProcessor::new(fixture.interpreter, store.clone(), "weather");
        let say = |text: &str| Request::new(text, "ann", "29:conversation");

        let welcome = processor.handle_turn(&say("hi")).await.unwrap();
        assert_eq!(welcome.text, welcome_text());

        processor.handle_turn(&say("weather seattle")).await.unwrap();
        processor.handle_turn(&say("layers add radar")).await.unwrap();
        processor.handle_turn(&say("layers add cities")).await.unwrap();

        let bytes = store.get("weather", "29:conversation").await.unwrap().unwrap();
        let saved: WeatherSettings = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(saved.station.as_deref(), Some("KSEA"));
        assert_eq!(saved.layers.radar_layers(), &[LayerType::Radar, LayerType::Cities]);

        let weather = processor.handle_turn(&say("weather")).await.unwrap();
        assert_eq!(weather.attachments[0].content_url, "radar://KSEA/Radar+Cities");

        processor.handle_turn(&say("quit")).await.unwrap();
        assert_eq!(store.get("weather", "29:conversation").await.unwrap(), None);

        let again = processor.handle_turn(&say("weather")).await.unwrap();
        assert_eq!(again.text, welcome_text());
        assert!(again.attachments.is_empty());
    }
}
