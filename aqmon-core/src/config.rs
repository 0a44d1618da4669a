use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::{City, DashboardError, city::DEFAULT_CITY, provider::openweather::DEFAULT_BASE_URL};

pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_PORT: &str = "PORT";
pub const ENV_CITY: &str = "AQMON_CITY";

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind(), port: default_port() }
    }
}

/// Provider endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_secs: default_timeout_secs() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "bengaluru"
///
/// [server]
/// port = 3000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeatherMap API key.
    pub api_key: Option<String>,

    /// City key used when a request does not name one.
    pub default_city: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// [`Config::load`] followed by process environment overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_env(|name| std::env::var(name).ok())?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "aqmon", "aqmon")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override fields from environment variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.api_key = Some(key);
        }

        if let Some(port) = non_empty(ENV_PORT) {
            self.server.port = port
                .parse()
                .with_context(|| format!("{ENV_PORT} must be a port number, got '{port}'"))?;
        }

        if let Some(city) = non_empty(ENV_CITY) {
            self.default_city = Some(city);
        }

        Ok(())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Returns the API key, if present and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn set_default_city(&mut self, city: &City) {
        self.default_city = Some(city.key.to_string());
    }

    /// The configured default city, falling back to Bengaluru.
    pub fn default_city(&self) -> Result<&'static City, DashboardError> {
        City::lookup(self.default_city.as_deref().unwrap_or(DEFAULT_CITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn default_config_is_unconfigured() {
        let cfg = Config::default();

        assert!(!cfg.is_configured());
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.upstream.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.default_city().unwrap().key, "bengaluru");
    }

    #[test]
    fn blank_api_key_is_not_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());

        assert_eq!(cfg.api_key(), None);
        assert!(!cfg.is_configured());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.apply_env(env(&[(ENV_API_KEY, "ENV_KEY"), (ENV_PORT, "8080"), (ENV_CITY, "pune")]))
            .expect("valid env");

        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.default_city().unwrap().name, "Pune");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.apply_env(env(&[(ENV_API_KEY, ""), (ENV_PORT, " ")])).expect("valid env");

        assert_eq!(cfg.api_key(), Some("FILE_KEY"));
        assert_eq!(cfg.server.port, 3000);
    }

    #[test]
    fn invalid_port_is_reported() {
        let mut cfg = Config::default();
        let err = cfg.apply_env(env(&[(ENV_PORT, "http")])).unwrap_err();

        assert!(err.to_string().contains("PORT must be a port number"));
    }

    #[test]
    fn unknown_default_city_errors() {
        let cfg = Config { default_city: Some("gotham".into()), ..Default::default() };
        let err = cfg.default_city().unwrap_err();

        assert!(err.to_string().contains("Unknown city 'gotham'"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "KEY"

            [server]
            port = 9000
            "#,
        )
        .expect("parses");

        assert_eq!(cfg.api_key(), Some("KEY"));
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.bind, "0.0.0.0");
        assert_eq!(cfg.upstream.timeout_secs, 10);
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.set_default_city(City::lookup("delhi").unwrap());

        let text = toml::to_string_pretty(&cfg).expect("serializes");
        let back: Config = toml::from_str(&text).expect("parses");
        assert_eq!(back, cfg);
    }
}
