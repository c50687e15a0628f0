/// OpenWeatherMap 5 day / 3 hour forecast client.
///
/// Handles URL construction and JSON response parsing for:
///   https://api.openweathermap.org/data/2.5/forecast
///
/// Failure policy: every failure (transport, non-success status, body that
/// is not JSON, payload without `list`) collapses to an empty series at the
/// `WeatherProvider` boundary. `try_fetch` keeps the typed error for callers
/// that want to log or test it. No retries, no caching: each call is one
/// round trip bounded by the configured timeout.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::config::ForecastConfig;
use crate::ingest::WeatherProvider;
use crate::model::{ForecastRecord, ForecastSeries};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("forecast API key not configured")]
    MissingApiKey,
    #[error("forecast request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("forecast API returned status {0}")]
    Status(u16),
    #[error("forecast payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("forecast payload has no `list` field")]
    MissingList,
}

// ---------------------------------------------------------------------------
// Serde structures
// ---------------------------------------------------------------------------

/// Entries stay as raw values so one malformed bucket can be dropped
/// without losing the rest of the list.
#[derive(Deserialize)]
struct ForecastResponse {
    list: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct ForecastEntry {
    dt: Option<i64>,
    dt_txt: Option<String>,
    main: MainBlock,
    wind: WindBlock,
    #[serde(default)]
    rain: Option<RainBlock>,
}

#[derive(Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Deserialize)]
struct WindBlock {
    speed: f64,
}

#[derive(Deserialize)]
struct RainBlock {
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds a forecast URL for `location` ("City,CC"). All query values are
/// percent-encoded.
///
/// # Example
/// ```
/// use raindar_service::ingest::openweather::build_forecast_url;
///
/// let url = build_forecast_url(
///     "https://api.openweathermap.org/data/2.5/forecast",
///     "Araraquara,BR",
///     "KEY",
///     "metric",
///     "pt_br",
/// );
/// assert!(url.contains("q=Araraquara%2CBR"));
/// ```
pub fn build_forecast_url(
    base_url: &str,
    location: &str,
    api_key: &str,
    units: &str,
    lang: &str,
) -> String {
    format!(
        "{}?q={}&appid={}&units={}&lang={}",
        base_url,
        urlencoding::encode(location),
        urlencoding::encode(api_key),
        urlencoding::encode(units),
        urlencoding::encode(lang)
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses a forecast response body into records, in provider order.
///
/// # Errors
/// - `IngestError::InvalidJson` - body is not a JSON object of the expected
///   shape.
/// - `IngestError::MissingList` - valid JSON without a `list` field (what
///   the provider sends for an unknown city).
///
/// Individual entries that lack a timestamp, `main` or `wind` are dropped
/// with a warning. A missing `rain` object or `rain.3h` key yields 0.0 mm.
pub fn parse_forecast(json: &str) -> Result<ForecastSeries, IngestError> {
    let response: ForecastResponse = serde_json::from_str(json)?;
    let entries = response.list.ok_or(IngestError::MissingList)?;

    let mut series = Vec::with_capacity(entries.len());

    for (index, raw) in entries.into_iter().enumerate() {
        let entry: ForecastEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(index, error = %e, "dropping malformed forecast entry");
                continue;
            }
        };

        let Some(timestamp) = entry_timestamp(&entry) else {
            tracing::warn!(index, "dropping forecast entry without a usable timestamp");
            continue;
        };

        let rainfall_mm = entry
            .rain
            .and_then(|r| r.three_hour)
            .filter(|mm| mm.is_finite() && *mm >= 0.0)
            .unwrap_or(0.0);

        series.push(ForecastRecord {
            timestamp,
            rainfall_mm,
            temperature_c: entry.main.temp,
            humidity_pct: entry.main.humidity,
            wind_speed_mps: entry.wind.speed,
            pressure_hpa: entry.main.pressure,
        });
    }

    Ok(series)
}

/// Prefers the unix `dt`; falls back to `dt_txt`, which the provider
/// renders in UTC.
fn entry_timestamp(entry: &ForecastEntry) -> Option<DateTime<Utc>> {
    if let Some(dt) = entry.dt {
        return DateTime::from_timestamp(dt, 0);
    }
    entry
        .dt_txt
        .as_deref()
        .and_then(|txt| NaiveDateTime::parse_from_str(txt, "%Y-%m-%d %H:%M:%S").ok())
        .map(|naive| naive.and_utc())
}

/// Collapses a parse or fetch result into the soft-failure contract.
pub fn series_or_empty(result: Result<ForecastSeries, IngestError>) -> ForecastSeries {
    match result {
        Ok(series) => series,
        Err(e) => {
            tracing::warn!(error = %e, "forecast unavailable, continuing with empty series");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Live client
// ---------------------------------------------------------------------------

pub struct OpenWeatherClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    units: String,
    lang: String,
}

impl OpenWeatherClient {
    /// Builds a client from configuration, reading the API key from the
    /// environment.
    pub fn new(config: &ForecastConfig) -> Result<Self, IngestError> {
        Self::with_api_key(config, config.api_key())
    }

    pub fn with_api_key(
        config: &ForecastConfig,
        api_key: Option<String>,
    ) -> Result<Self, IngestError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key,
            units: config.units.clone(),
            lang: config.lang.clone(),
        })
    }

    /// One request, typed errors.
    pub fn try_fetch(&self, location: &str) -> Result<ForecastSeries, IngestError> {
        let api_key = self.api_key.as_deref().ok_or(IngestError::MissingApiKey)?;
        let url = build_forecast_url(&self.base_url, location, api_key, &self.units, &self.lang);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(IngestError::Status(response.status().as_u16()));
        }

        let body = response.text()?;
        let series = parse_forecast(&body)?;
        tracing::info!(location, records = series.len(), "forecast fetched");
        Ok(series)
    }
}

impl WeatherProvider for OpenWeatherClient {
    fn fetch(&self, location: &str) -> ForecastSeries {
        series_or_empty(self.try_fetch(location))
    }
}

// ---------------------------------------------------------------------------
// Recorded payloads
// ---------------------------------------------------------------------------

/// Serves a previously saved provider response instead of calling the API.
/// Used for offline reports; the location argument is ignored.
pub struct RecordedForecast {
    body: String,
}

impl RecordedForecast {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        fs::read_to_string(path).map(Self::new)
    }
}

impl WeatherProvider for RecordedForecast {
    fn fetch(&self, _location: &str) -> ForecastSeries {
        series_or_empty(parse_forecast(&self.body))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;
    use chrono::TimeZone;

    #[test]
    fn test_build_forecast_url_encodes_parameters() {
        let url = build_forecast_url(
            "https://api.openweathermap.org/data/2.5/forecast",
            "São Carlos,BR",
            "abc123",
            "metric",
            "pt_br",
        );

        assert_eq!(
            url,
            "https://api.openweathermap.org/data/2.5/forecast?q=S%C3%A3o%20Carlos%2CBR&appid=abc123&units=metric&lang=pt_br"
        );
    }

    #[test]
    fn test_parse_forecast_maps_every_entry_in_order() {
        let series = parse_forecast(fixture_forecast_json()).expect("fixture should parse");

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        assert_eq!(series[1].timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap());
        assert_eq!(series[2].timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap());

        let first = &series[0];
        assert_eq!(first.rainfall_mm, 1.25);
        assert_eq!(first.temperature_c, 24.3);
        assert_eq!(first.humidity_pct, 78.0);
        assert_eq!(first.wind_speed_mps, 3.2);
        assert_eq!(first.pressure_hpa, 1012.0);
    }

    #[test]
    fn test_missing_rain_object_defaults_to_zero() {
        let series = parse_forecast(fixture_forecast_json()).unwrap();
        assert_eq!(series[1].rainfall_mm, 0.0, "no `rain` object should mean 0.0 mm");
    }

    #[test]
    fn test_rain_without_3h_key_defaults_to_zero() {
        let series = parse_forecast(fixture_forecast_json()).unwrap();
        assert_eq!(series[2].rainfall_mm, 0.0, "`rain` without `3h` should mean 0.0 mm");
    }

    #[test]
    fn test_missing_list_is_reported() {
        let result = parse_forecast(fixture_city_not_found_json());
        assert!(matches!(result, Err(IngestError::MissingList)));
    }

    #[test]
    fn test_non_json_body_is_reported() {
        let result = parse_forecast("<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(IngestError::InvalidJson(_))));
    }

    #[test]
    fn test_series_or_empty_swallows_errors() {
        let series = series_or_empty(parse_forecast(fixture_city_not_found_json()));
        assert!(series.is_empty());

        let series = series_or_empty(Err(IngestError::Status(401)));
        assert!(series.is_empty());
    }

    #[test]
    fn test_malformed_entry_is_dropped_and_rest_kept() {
        let series = parse_forecast(fixture_partially_malformed_json()).unwrap();

        assert_eq!(series.len(), 2, "entry without `main` should be dropped");
        assert_eq!(series[0].rainfall_mm, 4.0);
        assert_eq!(series[1].rainfall_mm, 2.5);
    }

    #[test]
    fn test_dt_txt_used_when_dt_absent() {
        let series = parse_forecast(fixture_partially_malformed_json()).unwrap();
        assert_eq!(series[1].timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_api_key_short_circuits() {
        let client = OpenWeatherClient::with_api_key(&ForecastConfig::default(), None).unwrap();
        assert!(matches!(
            client.try_fetch("Araraquara,BR"),
            Err(IngestError::MissingApiKey)
        ));
        assert!(client.fetch("Araraquara,BR").is_empty());
    }

    #[test]
    fn test_recorded_forecast_replays_payload() {
        let provider = RecordedForecast::new(fixture_forecast_json());
        assert_eq!(provider.fetch("anything").len(), 3);

        let broken = RecordedForecast::new(fixture_city_not_found_json());
        assert!(broken.fetch("anything").is_empty());
    }
}
