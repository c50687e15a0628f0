/// raindar_service: rainfall forecast and flood-point risk for Araraquara.
///
/// # Module structure
///
/// ```text
/// raindar_service
/// ├── model        - shared data types (ForecastRecord, FloodPoint, RiskLevel, ...)
/// ├── config       - service configuration loader (raindar.toml)
/// ├── flood_points - historical flooding point table (CSV)
/// ├── dashboard    - per-request view-model assembly
/// ├── endpoint     - HTTP API serving the view-model
/// ├── cli          - command-line parsing for the raindar binary
/// ├── ingest
/// │   ├── openweather - OpenWeatherMap forecast: URL construction + JSON parsing
/// │   ├── geocode     - Nominatim address lookup
/// │   └── fixtures (test only) - representative API response payloads
/// └── analysis
///     ├── risk       - 24 h horizon, rainfall totals, LOW/MEDIUM/HIGH
///     ├── proximity  - geodesic distance and nearest flood point
///     ├── history    - occurrence dates and statistics
///     ├── rainfall   - hourly and daily chart series
///     ├── storm      - storm watch thresholds
///     └── conditions - current-conditions comfort bands
/// ```

/// Public modules
pub mod analysis;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod endpoint;
pub mod flood_points;
pub mod ingest;
pub mod model;
