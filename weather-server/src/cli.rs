use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use weather_core::{Config, WeatherService, provider_from_settings};

use crate::{logging, server};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather recommendation HTTP service")]
pub struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        /// Listen address, overrides the config file and WEATHER_ADDR.
        #[arg(long)]
        addr: Option<SocketAddr>,
    },

    /// Interactively store the API token, provider key and listen address.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Serve { addr } => serve(&path, addr).await,
            Command::Configure => configure(&path),
        }
    }
}

async fn serve(path: &Path, addr: Option<SocketAddr>) -> Result<()> {
    let mut config = Config::load_from(path)?;
    config.apply_env()?;
    if let Some(addr) = addr {
        config.server.addr = addr;
    }

    logging::init(&config.logging);
    tracing::info!(config = %path.display(), "Configuration loaded");

    let settings = config.service_settings()?;
    let provider = provider_from_settings(&settings)?;
    let service = WeatherService::new(settings.api_token, Arc::from(provider));

    server::run(config.server.addr, service).await
}

fn configure(path: &Path) -> Result<()> {
    let mut config = Config::load_from(path)?;

    let token = prompt_secret("Inbound API token (callers send it as `token`):", config.api_token.as_deref())?;
    config.api_token = Some(token);

    let key = prompt_secret("Visual Crossing API key:", config.provider.api_key.as_deref())?;
    config.provider.api_key = Some(key);

    config.server.addr = CustomType::<SocketAddr>::new("Listen address:")
        .with_default(config.server.addr)
        .with_error_message("Please enter an address like 127.0.0.1:8000")
        .prompt()
        .context("Failed to read listen address")?;

    config.save_to(path)?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

/// Empty input keeps the current value when there is one.
fn prompt_secret(message: &str, current: Option<&str>) -> Result<String> {
    loop {
        let help = if current.is_some() { "Leave empty to keep the current value" } else { "Required" };

        let input = Password::new(message)
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .with_help_message(help)
            .prompt()
            .with_context(|| format!("Failed to read input for '{message}'"))?;

        match (input.trim(), current) {
            ("", Some(existing)) => return Ok(existing.to_string()),
            ("", None) => println!("A value is required."),
            (value, _) => return Ok(value.to_string()),
        }
    }
}
