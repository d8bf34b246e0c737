use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{model::Location, provider::ProviderId};

/// Host the browser fetches radar tiles from; frame paths are appended to it.
pub const DEFAULT_RADAR_TILE_HOST: &str = "https://tilecache.rainviewer.com";

/// Override for a single upstream provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
}

/// Address the HTTP server binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Top-level configuration stored on disk. Every field has a default, so an
/// empty or partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timeout applied to every upstream request.
    pub request_timeout_secs: u64,

    /// Prefix for radar tile URLs built client-side from `/radar-timestamp` paths.
    pub radar_tile_host: String,

    pub server: ServerConfig,

    /// Location the daily forecast is shown for.
    pub home: Location,

    /// Cities scanned for current rain.
    pub cities: Vec<Location>,

    /// Example TOML:
    /// [providers.openmeteo]
    /// base_url = "http://localhost:9000"
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            radar_tile_host: DEFAULT_RADAR_TILE_HOST.to_string(),
            server: ServerConfig::default(),
            home: Location::new("Tel Aviv", 32.0853, 34.7818),
            cities: default_cities(),
            providers: HashMap::new(),
        }
    }
}

fn default_cities() -> Vec<Location> {
    vec![
        Location::new("London", 51.5074, -0.1278),
        Location::new("New York", 40.7128, -74.0060),
        Location::new("Paris", 48.8566, 2.3522),
        Location::new("Berlin", 52.5200, 13.4050),
        Location::new("Tokyo", 35.6762, 139.6503),
        Location::new("Moscow", 55.7558, 37.6173),
        Location::new("Mumbai", 19.0760, 72.8777),
        Location::new("Sydney", -33.8688, 151.2093),
        Location::new("São Paulo", -23.5505, -46.6333),
        Location::new("Singapore", 1.3521, 103.8198),
    ]
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL for a provider: the configured override, or its public endpoint.
    pub fn provider_base_url(&self, id: ProviderId) -> &str {
        self.providers
            .get(id.as_str())
            .map(|cfg| cfg.base_url.as_str())
            .unwrap_or_else(|| id.default_base_url())
    }

    pub fn set_provider_base_url(&mut self, id: ProviderId, base_url: String) {
        self.providers.insert(id.as_str().to_string(), ProviderConfig { base_url });
    }

    /// Load config from the default location, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or return defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "rain-forecast", "rain-web")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `HOST` / `PORT` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid PORT value '{port}'"))?;
        }

        Ok(())
    }

    /// Reject values that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }

        if self.home.name.trim().is_empty() {
            bail!(
                "Home location has no name.\n\
                 Hint: run `rain-web configure` to set it."
            );
        }

        if !(self.radar_tile_host.starts_with("https://")
            || self.radar_tile_host.starts_with("http://"))
        {
            bail!(
                "radar_tile_host '{}' must be an http(s) URL, e.g. \"{DEFAULT_RADAR_TILE_HOST}\"",
                self.radar_tile_host
            );
        }

        for location in std::iter::once(&self.home).chain(&self.cities) {
            check_coordinates(location)?;
        }

        for key in self.providers.keys() {
            let id = ProviderId::try_from(key.as_str())
                .with_context(|| format!("Invalid [providers.{key}] section"))?;
            if id.as_str() != key {
                bail!(
                    "Invalid [providers.{key}] section: provider keys are lowercase, use [providers.{id}]"
                );
            }
        }

        Ok(())
    }
}

fn check_coordinates(location: &Location) -> Result<()> {
    if !(-90.0..=90.0).contains(&location.latitude) {
        bail!("Latitude {} of '{}' is out of range [-90, 90]", location.latitude, location.name);
    }

    if !(-180.0..=180.0).contains(&location.longitude) {
        bail!(
            "Longitude {} of '{}' is out of range [-180, 180]",
            location.longitude,
            location.name
        );
    }

    Ok(())
}
