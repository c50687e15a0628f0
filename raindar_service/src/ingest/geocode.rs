/// Nominatim (OpenStreetMap) free-text address lookup.
///
/// API: https://nominatim.openstreetmap.org/search?q=...&format=json&limit=1
///
/// Nominatim's usage policy allows one request per second per client, so a
/// fixed pause precedes every request. A transport failure (timeout, refused
/// connection) is retried once after the same pause; anything else is
/// reported as "not found".

use serde::Deserialize;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::config::GeocodingConfig;
use crate::ingest::Geocoder;
use crate::model::Coordinate;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("geocoding API returned status {0}")]
    Status(u16),
}

/// Nominatim returns coordinates as strings.
#[derive(Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// Builds a search URL for `query`, asking for the single best match.
pub fn build_search_url(base_url: &str, query: &str) -> String {
    format!(
        "{}?q={}&format=json&limit=1",
        base_url,
        urlencoding::encode(query)
    )
}

/// Extracts the first result's coordinate. Empty arrays, unexpected shapes
/// and unparsable numbers all yield `None`.
pub fn parse_search_response(json: &str) -> Option<Coordinate> {
    let results: Vec<SearchResult> = serde_json::from_str(json).ok()?;
    let first = results.into_iter().next()?;

    let coordinate = Coordinate::new(first.lat.trim().parse().ok()?, first.lon.trim().parse().ok()?);
    coordinate.is_valid().then_some(coordinate)
}

pub struct NominatimClient {
    http: reqwest::blocking::Client,
    base_url: String,
    address_suffix: String,
    backoff: Duration,
}

impl NominatimClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            address_suffix: config.address_suffix.clone(),
            backoff: config.backoff(),
        })
    }

    fn query_for(&self, address: &str) -> String {
        format!("{}{}", address.trim(), self.address_suffix)
    }

    fn attempt(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        thread::sleep(self.backoff);

        let response = self.http.get(build_search_url(&self.base_url, query)).send()?;
        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let body = response.text()?;
        Ok(parse_search_response(&body))
    }
}

impl Geocoder for NominatimClient {
    fn locate(&self, address: &str) -> Option<Coordinate> {
        if address.trim().is_empty() {
            return None;
        }
        let query = self.query_for(address);

        let result = match self.attempt(&query) {
            Err(GeocodeError::Transport(e)) => {
                tracing::warn!(error = %e, "geocoding failed, retrying once");
                self.attempt(&query)
            }
            other => other,
        };

        match result {
            Ok(Some(coordinate)) => {
                tracing::info!(query = %query, ?coordinate, "address resolved");
                Some(coordinate)
            }
            Ok(None) => {
                tracing::info!(query = %query, "address not found");
                None
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "geocoding unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;

    #[test]
    fn test_build_search_url() {
        let url = build_search_url(
            "https://nominatim.openstreetmap.org/search",
            "Rua Maurício Galli, Araraquara, Brasil",
        );
        assert!(url.starts_with("https://nominatim.openstreetmap.org/search?q=Rua%20Maur%C3%ADcio%20Galli"));
        assert!(url.ends_with("&format=json&limit=1"));
    }

    #[test]
    fn test_parse_hit() {
        let coordinate = parse_search_response(fixture_nominatim_hit_json())
            .expect("fixture should resolve");
        assert!((coordinate.latitude - (-21.793215)).abs() < 1e-9);
        assert!((coordinate.longitude - (-48.1756473)).abs() < 1e-9);
    }

    #[test]
    fn test_parse_empty_result_is_not_found() {
        assert!(parse_search_response(fixture_nominatim_empty_json()).is_none());
    }

    #[test]
    fn test_parse_garbage_is_not_found() {
        assert!(parse_search_response("{\"error\": \"rate limited\"}").is_none());
        assert!(parse_search_response(r#"[{"lat": "north", "lon": "-48.1"}]"#).is_none());
    }

    #[test]
    fn test_query_gets_municipal_suffix() {
        let client = NominatimClient::new(&GeocodingConfig::default()).unwrap();
        assert_eq!(
            client.query_for("  Rua Voluntários da Pátria 1500 "),
            "Rua Voluntários da Pátria 1500, Araraquara, Brasil"
        );
    }

    #[test]
    fn test_blank_address_skips_the_network() {
        let client = NominatimClient::new(&GeocodingConfig::default()).unwrap();
        assert!(client.locate("   ").is_none());
    }
}
