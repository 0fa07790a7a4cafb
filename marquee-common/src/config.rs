//! Configuration loading and override resolution
//!
//! Bootstrap configuration comes from a single TOML file. Values are resolved in
//! priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables (`MARQUEE_*`)
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is never fatal: the resolver logs a warning and
//! continues with defaults. An unreadable or unparsable file that was asked for
//! explicitly is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const ENV_CONFIG_PATH: &str = "MARQUEE_CONFIG";
pub const ENV_HOST: &str = "MARQUEE_HOST";
pub const ENV_PORT: &str = "MARQUEE_PORT";
pub const ENV_LOG_LEVEL: &str = "MARQUEE_LOG_LEVEL";
pub const ENV_RATINGS_API_KEY: &str = "MARQUEE_OMDB_API_KEY";
pub const ENV_AGGREGATOR_API_KEY: &str = "MARQUEE_TMDB_API_KEY";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Interface the HTTP service binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    ///
    /// Default: 5780
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Upstream endpoints, credentials and the per-adapter timeout
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Alternate-title region preference
    #[serde(default)]
    pub regions: RegionPreference,

    /// Additions to the built-in decoration tables
    #[serde(default)]
    pub decorations: DecorationOverrides,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logging: LoggingConfig::default(),
            upstream: UpstreamConfig::default(),
            regions: RegionPreference::default(),
            decorations: DecorationOverrides::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Upstream API configuration
///
/// An empty API key disables the adapter that needs it; the resolver then
/// treats that source like any other failed enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Full details endpoint of the primary source (queried with `?tt=<id>`)
    pub primary_url: String,
    /// Base URL of the fallback source (titles, credits, AKAs, search)
    pub fallback_url: String,
    /// Ratings service endpoint (queried with `?i=<id>&apikey=<key>`)
    pub ratings_url: String,
    /// Aggregator API base URL
    pub aggregator_url: String,
    /// Prefix prepended to aggregator poster paths
    pub aggregator_image_url: String,
    pub ratings_api_key: String,
    pub aggregator_api_key: String,
    /// Independent timeout applied to every adapter call
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            primary_url: "https://imdb.iamidiotareyoutoo.com/search".to_string(),
            fallback_url: "https://api.imdbapi.dev".to_string(),
            ratings_url: "https://www.omdbapi.com/".to_string(),
            aggregator_url: "https://api.themoviedb.org/3".to_string(),
            aggregator_image_url: "https://image.tmdb.org/t/p/original".to_string(),
            ratings_api_key: String::new(),
            aggregator_api_key: String::new(),
            timeout_secs: 5,
            user_agent: format!("marquee/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// "Opposite market" preference used to pick a display alternate title
///
/// When a work originates in one of `home_countries`, an alternate title tagged
/// with `away_region` is preferred; otherwise one tagged with `home_region`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionPreference {
    /// Country names that count as the primary market
    pub home_countries: Vec<String>,
    /// Region code of the primary market
    pub home_region: String,
    /// Region code of the designated secondary market
    pub away_region: String,
}

impl Default for RegionPreference {
    fn default() -> Self {
        Self {
            home_countries: vec!["United States".to_string()],
            home_region: "US".to_string(),
            away_region: "IN".to_string(),
        }
    }
}

impl RegionPreference {
    /// Region code whose alternate title should be preferred for a work
    /// produced in `origin_countries`
    pub fn target_region(&self, origin_countries: &[String]) -> &str {
        let from_home_market = origin_countries
            .iter()
            .any(|c| self.home_countries.iter().any(|h| h == c));

        if from_home_market {
            &self.away_region
        } else {
            &self.home_region
        }
    }
}

/// User-supplied decoration entries, merged over the built-in tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationOverrides {
    /// Genre name → emoji (or "-")
    pub genres: BTreeMap<String, String>,
    /// Country name or code → flag text
    pub countries: BTreeMap<String, String>,
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `MARQUEE_*` environment variables using the given lookup
    ///
    /// Unparsable values are ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid {}: {:?}", ENV_PORT, port),
            }
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(key) = lookup(ENV_RATINGS_API_KEY) {
            self.upstream.ratings_api_key = key;
        }
        if let Some(key) = lookup(ENV_AGGREGATOR_API_KEY) {
            self.upstream.aggregator_api_key = key;
        }
    }

    /// Apply command-line overrides (highest priority)
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
    }
}

/// Default configuration file location (`<config_dir>/marquee/marquee.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("marquee").join("marquee.toml"))
}

/// Resolve the full configuration from CLI, environment, file and defaults
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<TomlConfig> {
    resolve_config_with(overrides, |key| std::env::var(key).ok())
}

/// [`resolve_config`] with an injectable environment lookup
pub fn resolve_config_with<F>(overrides: &ConfigOverrides, lookup: F) -> Result<TomlConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let explicit = overrides
        .config_path
        .clone()
        .or_else(|| lookup(ENV_CONFIG_PATH).map(PathBuf::from));

    let mut config = match explicit {
        Some(path) => {
            let config = TomlConfig::from_file(&path)?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => match default_config_path() {
            Some(path) if path.exists() => {
                let config = TomlConfig::from_file(&path)?;
                info!("Loaded configuration from {}", path.display());
                config
            }
            _ => {
                warn!("No configuration file found, using defaults");
                TomlConfig::default()
            }
        },
    };

    config.apply_env(&lookup);
    config.apply_overrides(overrides);

    Ok(config)
}
