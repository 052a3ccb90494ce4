use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cityinfo_core::{CityInfoResolver, Config, LastCityStore, Resolution};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::info;

use crate::{bot, logging, texts};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityinfo", version, about = "Telegram bot with weather and population for any city")]
pub struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the Telegram bot (long polling).
    Run,

    /// Interactively store API credentials in the config file.
    Configure,

    /// Look up one city and print the report.
    Lookup {
        /// City name, passed to the weather API as is.
        city: String,
    },

    /// Print the most recently queried city.
    Last,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(self.config.as_deref()),
            Command::Run => {
                let config = load_config(self.config.as_deref())?;
                config.validate()?;
                logging::init_tracing(config.logging.file.as_deref())?;
                bot::run(&config).await
            }
            Command::Lookup { city } => {
                let config = load_config(self.config.as_deref())?;
                config.validate_lookup()?;
                logging::init_tracing(None)?;

                match CityInfoResolver::from_config(&config).resolve(&city).await {
                    Resolution::Report(report) => {
                        println!("{report}");
                        Ok(())
                    }
                    Resolution::Failure(failure) => Err(failure.into()),
                }
            }
            Command::Last => {
                let config = load_config(self.config.as_deref())?;
                let store = LastCityStore::new(&config.storage.last_city_file);
                match store.load() {
                    Some(city) => println!("{city}"),
                    None => println!("{}", texts::NO_LAST_CITY),
                }
                Ok(())
            }
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let mut config = Config::load(path)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

fn configure(path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let mut config = Config::load(path)?;

    if let Some(token) = prompt_secret("Telegram bot token", &config.telegram.token)? {
        config.telegram.token = token;
    }
    if let Some(key) = prompt_secret("OpenWeatherMap API key", &config.weather.api_key)? {
        config.weather.api_key = key;
    }
    config.weather.endpoint = Text::new("OpenWeatherMap endpoint:")
        .with_default(&config.weather.endpoint)
        .prompt()
        .context("Failed to read weather endpoint")?;
    if let Some(key) = prompt_secret("GeoDB (RapidAPI) key", &config.geography.api_key)? {
        config.geography.api_key = key;
    }
    config.geography.endpoint = Text::new("GeoDB endpoint:")
        .with_default(&config.geography.endpoint)
        .prompt()
        .context("Failed to read GeoDB endpoint")?;

    let saved = config.save(path)?;
    info!(path = %saved.display(), "Configuration saved");
    println!("Configuration saved to {}", saved.display());
    Ok(())
}

/// `None` when the user leaves the field empty and a value already exists.
fn prompt_secret(label: &str, current: &str) -> anyhow::Result<Option<String>> {
    let help = if current.is_empty() {
        "required"
    } else {
        "leave empty to keep the current value"
    };

    let value = Password::new(&format!("{label}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message(help)
        .prompt()
        .with_context(|| format!("Failed to read {label}"))?;

    let value = value.trim().to_string();
    if value.is_empty() && !current.is_empty() {
        return Ok(None);
    }
    Ok(Some(value))
}
