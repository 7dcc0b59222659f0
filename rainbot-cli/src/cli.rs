use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Text};
use tracing::error;

use rainbot_core::{Config, GeocoderId, Request, WeatherProcessor};

use crate::app::{build_processor, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "rainbot", version, about = "RainBot weather assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a geocoder and make it the default.
    Configure {
        /// Geocoder short name, "bing" or "nominatim".
        geocoder: String,
    },

    /// Send a single message and print the reply.
    Send {
        /// Conversation identity; state is kept per conversation.
        #[arg(long, short, default_value = "local")]
        conversation: String,

        /// Sender name.
        #[arg(long, default_value = "me")]
        from: String,

        /// Mark the message as coming from a group conversation.
        #[arg(long)]
        group: bool,

        /// Message text, e.g. `weather Seattle, WA`.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Chat interactively; an empty line ends the session.
    Chat {
        #[arg(long, short, default_value = "local")]
        conversation: String,

        #[arg(long, default_value = "me")]
        from: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { geocoder } => configure(&geocoder),
            Command::Send {
                conversation,
                from,
                group,
                text,
            } => {
                let processor = build_processor(&Config::load()?)?;
                let request = Request::new(text.join(" "), from, conversation).in_group(group);
                let response = processor
                    .handle_turn(&request)
                    .await
                    .context("Sorry, that message could not be processed")?;
                println!("{}", render(&response));
                Ok(())
            }
            Command::Chat { conversation, from } => {
                let processor = build_processor(&Config::load()?)?;
                chat(&processor, &conversation, &from).await
            }
        }
    }
}

fn configure(geocoder: &str) -> Result<()> {
    let id = GeocoderId::try_from(geocoder)?;
    let mut config = Config::load()?;

    if id.requires_api_key() {
        if config.is_geocoder_configured(id) {
            println!("Replacing the existing API key for '{id}'.");
        }
        let api_key = Password::new(&format!("API key for {id}:"))
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;
        config.upsert_geocoder_api_key(id, api_key.trim().to_string());
    }
    config.set_default_geocoder(id);
    config.save()?;

    println!(
        "Geocoder '{id}' configured. Config saved to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

async fn chat(processor: &WeatherProcessor, conversation: &str, from: &str) -> Result<()> {
    loop {
        let line = match Text::new(">").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        };
        if line.trim().is_empty() {
            break;
        }

        let request = Request::new(line, from, conversation);
        match processor.handle_turn(&request).await {
            Ok(response) => println!("{}\n", render(&response)),
            // A failed turn leaves stored state untouched; keep chatting.
            Err(err) => {
                error!(error = %err, "turn failed");
                println!("Sorry, something went wrong: {err}\n");
            }
        }
    }

    Ok(())
}
