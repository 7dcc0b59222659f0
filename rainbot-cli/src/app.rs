use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use rainbot_core::{
    Config, FileStore, Response, Store, WeatherInterpreter, WeatherProcessor,
    provider::default_resolver_from_config, radar::RidgeRadarRetriever, station::StationCatalog,
};

/// Build the processor and every collaborator it needs from `config`.
pub fn build_processor(config: &Config) -> Result<WeatherProcessor> {
    let data_dir = config.data_dir()?;
    info!(data_dir = %data_dir.display(), "opening store");
    let store: Arc<dyn Store> = Arc::new(FileStore::new(data_dir));

    let resolver = default_resolver_from_config(config).context("Failed to set up geocoder")?;

    let interpreter = WeatherInterpreter::new(
        Arc::from(resolver),
        Arc::new(StationCatalog::builtin()),
        Arc::new(RidgeRadarRetriever::new(config.radar.base_url.clone())),
        store.clone(),
    )
    .with_image_container(config.store.image_container.clone())
    .with_max_age(config.radar_max_age()?);

    Ok(WeatherProcessor::new(
        interpreter,
        store,
        config.store.conversation_container.clone(),
    ))
}

/// Human-readable rendering of a reply.
pub fn render(response: &Response) -> String {
    let mut out = response.text.clone();
    for attachment in &response.attachments {
        let name = attachment.name.as_deref().unwrap_or("attachment");
        out.push_str(&format!(
            "\n[{name}] {} ({})",
            attachment.content_url, attachment.content_type
        ));
    }
    out
}
