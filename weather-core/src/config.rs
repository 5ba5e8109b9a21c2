use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_BASE_URL: &str = "https://weather.visualcrossing.com";

/// Outbound provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Visual Crossing API key.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Whole-request timeout for the provider call.
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: SocketAddr::from(([127, 0, 0, 1], 8000)) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "weather_core=debug".
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_token = "..."
///
/// [provider]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Token callers must present in the `token` field.
    pub api_token: Option<String>,
    pub provider: ProviderConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Immutable settings the request handler and provider client are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub api_token: String,
    pub provider_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    /// Load config from the default location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
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
        let dirs = ProjectDirs::from("dev", "weather-advisor", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay `WEATHER_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::apply_env`] with an arbitrary variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(token) = lookup("WEATHER_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(key) = lookup("WEATHER_PROVIDER_KEY") {
            self.provider.api_key = Some(key);
        }
        if let Some(url) = lookup("WEATHER_PROVIDER_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(addr) = lookup("WEATHER_ADDR") {
            self.server.addr = addr
                .parse()
                .with_context(|| format!("WEATHER_ADDR is not a socket address: {addr}"))?;
        }
        if let Some(level) = lookup("WEATHER_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Resolve the secrets and provider settings, failing on anything unusable.
    pub fn service_settings(&self) -> Result<ServiceSettings> {
        let api_token = non_blank(self.api_token.as_deref()).ok_or_else(|| {
            anyhow!(
                "No inbound API token configured.\n\
                 Hint: run `weather-server configure` or set WEATHER_API_TOKEN."
            )
        })?;

        let provider_key = non_blank(self.provider.api_key.as_deref()).ok_or_else(|| {
            anyhow!(
                "No weather provider key configured.\n\
                 Hint: run `weather-server configure` or set WEATHER_PROVIDER_KEY."
            )
        })?;

        let base_url = self.provider.base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!("Provider base URL must be an HTTP or HTTPS URL, got '{base_url}'");
        }

        if self.provider.timeout_seconds == 0 {
            bail!("Provider timeout must be at least one second");
        }

        Ok(ServiceSettings {
            api_token: api_token.to_string(),
            provider_key: provider_key.to_string(),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(self.provider.timeout_seconds),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
