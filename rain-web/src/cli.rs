use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use tracing::info;

use rain_core::{
    Config, ForecastResult, Location, get_rain_forecast, get_raining_cities,
    provider::{forecast_provider_from_config, radar_provider_from_config},
};
use rain_web::{AppState, create_router};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "rain-web", version, about = "Rain forecast web app")]
pub struct Cli {
    /// Config file to use instead of the one in the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server.
    Serve {
        /// Bind host; overrides config and the HOST variable.
        #[arg(long)]
        host: Option<String>,

        /// Bind port; overrides config and the PORT variable.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print today's forecast and the cities where it is raining now.
    Check,

    /// Print the latest radar frame.
    Radar,

    /// Interactively set the home location.
    Configure,

    /// Print the config file location.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command {
            Command::Serve { host, port } => {
                config.apply_env_overrides()?;
                if let Some(host) = host {
                    config.server.host = host;
                }
                if let Some(port) = port {
                    config.server.port = port;
                }
                config.validate()?;
                serve(config).await
            }
            Command::Check => {
                config.validate()?;
                check(&config).await
            }
            Command::Radar => radar(&config).await,
            Command::Configure => configure(config, self.config),
            Command::ConfigPath => {
                let path = match self.config {
                    Some(path) => path,
                    None => Config::config_file_path()?,
                };
                println!("{}", path.display());
                Ok(())
            }
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    info!(
        home = %state.home.name,
        cities = state.cities.len(),
        timeout_secs = config.request_timeout_secs,
        "Application state initialized"
    );

    let app = create_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
        })
        .await?;

    Ok(())
}

async fn check(config: &Config) -> anyhow::Result<()> {
    let provider = forecast_provider_from_config(config)?;

    let (forecast, raining) = tokio::join!(
        get_rain_forecast(provider.as_ref(), &config.home),
        get_raining_cities(provider.as_ref(), &config.cities),
    );

    println!("{}:", config.home.name);
    match forecast {
        ForecastResult::Forecast { rain_sum, probability, will_rain } => {
            let verdict = if will_rain { "It might rain today!" } else { "Likely no rain today." };
            println!("  {verdict}");
            println!("  Precipitation probability: {probability}%");
            println!("  Expected rain: {rain_sum:.1} mm");
        }
        ForecastResult::Error { error } => println!("  Error fetching weather data: {error}"),
    }

    println!();
    if raining.is_empty() {
        println!("No rain detected in other major cities right now.");
    } else {
        println!("Raining now:");
        for city in raining {
            println!("  {:<16} {:.1} mm", city.location.name, city.rain_amount);
        }
    }

    Ok(())
}

async fn radar(config: &Config) -> anyhow::Result<()> {
    let provider = radar_provider_from_config(config)?;
    let frame = provider.latest_frame().await?;

    println!("path: {}", frame.path);
    match frame.observed_at() {
        Some(at) => {
            let age = Utc::now() - at;
            println!("time: {} ({} min ago)", at.to_rfc3339(), age.num_minutes());
        }
        None => println!("time: {}", frame.time),
    }

    Ok(())
}

fn configure(mut config: Config, path: Option<PathBuf>) -> anyhow::Result<()> {
    let name = Text::new("Home location name:").with_default(&config.home.name).prompt()?;

    let latitude = CustomType::<f64>::new("Latitude:")
        .with_default(config.home.latitude)
        .with_error_message("Please enter a number")
        .prompt()?;

    let longitude = CustomType::<f64>::new("Longitude:")
        .with_default(config.home.longitude)
        .with_error_message("Please enter a number")
        .prompt()?;

    config.home = Location::new(name, latitude, longitude);
    config.validate()?;

    let saved_to = match path {
        Some(path) => {
            config.save_to(&path)?;
            path
        }
        None => config.save()?,
    };

    println!("Saved configuration to {}", saved_to.display());
    Ok(())
}
