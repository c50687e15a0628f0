/// Service configuration loader - parses raindar.toml
///
/// Keeps the provider endpoints, municipal settings and reference-table path
/// out of the code so the service can be pointed at another city without
/// recompiling. Every field has a default; the file only needs to carry what
/// differs.
///
/// The forecast API key is never read from the file. It comes from the
/// environment (optionally via `.env`), under the variable named by
/// `forecast.api_key_env`.

use chrono::FixedOffset;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::model::Coordinate;

pub const DEFAULT_CONFIG_PATH: &str = "raindar.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid utc_offset_hours {0}: must be within -23..=23")]
    InvalidOffset(i32),
}

// ---------------------------------------------------------------------------
// Configuration sections
// ---------------------------------------------------------------------------

/// Root of raindar.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub forecast: ForecastConfig,
    pub municipality: MunicipalityConfig,
    pub flood_points: FloodPointsConfig,
    pub geocoding: GeocodingConfig,
}

/// OpenWeatherMap 5 day / 3 hour forecast settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Provider location query, "City,CC"
    pub location: String,
    pub base_url: String,
    pub units: String,
    pub lang: String,
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            location: "Araraquara,BR".to_string(),
            base_url: "https://api.openweathermap.org/data/2.5/forecast".to_string(),
            units: "metric".to_string(),
            lang: "pt_br".to_string(),
            timeout_secs: 10,
            api_key_env: "OPENWEATHER_API_KEY".to_string(),
        }
    }
}

impl ForecastConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Looks up the API key in the environment. Empty values count as unset.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env).ok().filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MunicipalityConfig {
    /// Human-readable label shown alongside the local time
    pub name: String,
    /// Fixed offset from UTC used for display and day grouping.
    /// Araraquara (America/Sao_Paulo) has observed no DST since 2019.
    pub utc_offset_hours: i32,
    pub center_latitude: f64,
    pub center_longitude: f64,
}

impl Default for MunicipalityConfig {
    fn default() -> Self {
        Self {
            name: "Araraquara, São Paulo, Brasil".to_string(),
            utc_offset_hours: -3,
            center_latitude: -21.7945,
            center_longitude: -48.1752,
        }
    }
}

impl MunicipalityConfig {
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        if !(-23..=23).contains(&self.utc_offset_hours) {
            return Err(ConfigError::InvalidOffset(self.utc_offset_hours));
        }
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .ok_or(ConfigError::InvalidOffset(self.utc_offset_hours))
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.center_latitude, self.center_longitude)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FloodPointsConfig {
    pub path: String,
}

impl Default for FloodPointsConfig {
    fn default() -> Self {
        Self {
            path: "data/pontos_alagamento.csv".to_string(),
        }
    }
}

/// Nominatim free-text address lookup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Appended to every query to keep results inside the municipality
    pub address_suffix: String,
    pub timeout_secs: u64,
    /// Fixed pause before each request, and before the single retry
    pub backoff_ms: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: "radar_alagamentos".to_string(),
            address_suffix: ", Araraquara, Brasil".to_string(),
            timeout_secs: 10,
            backoff_ms: 1000,
        }
    }
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str, path: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;
    config.municipality.offset()?;
    Ok(config)
}

/// Loads configuration from `path`.
///
/// A missing file is not an error: the built-in Araraquara defaults are used
/// and a warning is logged. An unreadable or malformed file is.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let path_label = path.display().to_string();

    match fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents, &path_label),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path_label, "config file not found, using defaults");
            Ok(Config::default())
        }
        Err(source) => Err(ConfigError::Read {
            path: path_label,
            source,
        }),
    }
}
