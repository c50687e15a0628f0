/// HTTP endpoint serving the dashboard view-model.
///
/// Provides a small JSON API for a front end (or curl) to render the
/// rainfall charts, risk map and nearest-point panel.
///
/// Endpoints:
/// - GET /dashboard?lat=&lon=&address=&min_rain=&point= - Full view-model
/// - GET /points - Monitored flood points and history summary
/// - GET /health - Service health check
///
/// Requests are served one at a time on the calling thread. Each one runs a
/// fresh evaluation cycle; nothing is cached between requests.

use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;

use crate::analysis::history;
use crate::dashboard::{Dashboard, DashboardQuery};
use crate::ingest::{Geocoder, WeatherProvider};
use crate::model::Coordinate;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("failed to start HTTP server on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

const AVAILABLE_ENDPOINTS: [&str; 3] = ["/health", "/dashboard", "/points"];

// ---------------------------------------------------------------------------
// Query parsing
// ---------------------------------------------------------------------------

/// Splits a request URL into its path and decoded query parameters.
/// Later duplicates win. `+` is treated as a space, as browsers send it.
pub fn split_url(url: &str) -> (&str, HashMap<String, String>) {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    let params = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect();

    (path, params)
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Builds a dashboard query from request parameters.
///
/// `lat` and `lon` must come together and be valid WGS84 degrees.
pub fn dashboard_query(params: &HashMap<String, String>) -> Result<DashboardQuery, String> {
    let non_empty = |key: &str| params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

    let coordinate = match (non_empty("lat"), non_empty("lon")) {
        (None, None) => None,
        (Some(lat), Some(lon)) => {
            let coordinate = match (lat.parse::<f64>(), lon.parse::<f64>()) {
                (Ok(lat), Ok(lon)) => Coordinate::new(lat, lon),
                _ => return Err(format!("lat/lon must be decimal degrees, got '{}', '{}'", lat, lon)),
            };
            if !coordinate.is_valid() {
                return Err(format!("coordinate out of range: {}, {}", lat, lon));
            }
            Some(coordinate)
        }
        _ => return Err("lat and lon must be given together".to_string()),
    };

    let min_rainfall_mm = match non_empty("min_rain") {
        None => 0.0,
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|_| format!("min_rain must be a number, got '{}'", raw))?,
    };

    Ok(DashboardQuery {
        coordinate,
        address: non_empty("address").map(str::to_string),
        min_rainfall_mm,
        selected_point: non_empty("point").map(str::to_string),
    })
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Resolves one request to a status code and JSON body.
pub fn route<P: WeatherProvider, G: Geocoder>(
    dashboard: &Dashboard<P, G>,
    method: &str,
    url: &str,
) -> (u16, serde_json::Value) {
    if method != "GET" {
        return (405, json!({ "error": "Method not allowed", "allowed": ["GET"] }));
    }

    let (path, params) = split_url(url);
    match path {
        "/health" => handle_health(),
        "/dashboard" => handle_dashboard(dashboard, &params),
        "/points" => handle_points(dashboard),
        _ => (
            404,
            json!({
                "error": "Not found",
                "available_endpoints": AVAILABLE_ENDPOINTS,
            }),
        ),
    }
}

fn handle_health() -> (u16, serde_json::Value) {
    (
        200,
        json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

fn handle_dashboard<P: WeatherProvider, G: Geocoder>(
    dashboard: &Dashboard<P, G>,
    params: &HashMap<String, String>,
) -> (u16, serde_json::Value) {
    let query = match dashboard_query(params) {
        Ok(query) => query,
        Err(e) => return (400, json!({ "error": e })),
    };

    let view = dashboard.render(&query, Utc::now());
    match serde_json::to_value(&view) {
        Ok(body) => (200, body),
        Err(e) => (500, json!({ "error": format!("failed to serialize dashboard: {}", e) })),
    }
}

fn handle_points<P: WeatherProvider, G: Geocoder>(dashboard: &Dashboard<P, G>) -> (u16, serde_json::Value) {
    match dashboard.flood_points() {
        Ok(points) => (
            200,
            json!({
                "points": points,
                "summary": history::summarize(&points),
            }),
        ),
        Err(e) => (503, json!({ "error": e.to_string() })),
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port. Blocks for the life
/// of the server.
pub fn start_endpoint_server<P: WeatherProvider, G: Geocoder>(
    port: u16,
    dashboard: Dashboard<P, G>,
) -> Result<(), EndpointError> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|source| EndpointError::Bind { port, source })?;

    tracing::info!(port, "HTTP endpoint listening");
    println!("📡 HTTP endpoint listening on http://0.0.0.0:{}", port);
    println!("   GET /dashboard?lat=..&lon=.. - Forecast, risk and nearest flood point");
    println!("   GET /points - Monitored flood points");
    println!("   GET /health - Service health check\n");

    for request in server.incoming_requests() {
        let method = request.method().as_str().to_string();
        let url = request.url().to_string();

        let (status, body) = route(&dashboard, &method, &url);
        tracing::info!(%method, %url, status, "request served");

        if let Err(e) = request.respond(create_response(status, &body)) {
            tracing::warn!(error = %e, "failed to send response");
        }
    }

    Ok(())
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: &serde_json::Value) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(json).unwrap_or_else(|_| "{}".to_string());

    let response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json; charset=utf-8"[..]) {
        Ok(header) => response.with_header(header),
        Err(_) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
