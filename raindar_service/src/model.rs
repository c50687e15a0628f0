/// Shared data types for the rainfall / flood-point service.
///
/// Ingestion produces `ForecastRecord`s, the reference table produces
/// `FloodPoint`s, and everything under `analysis` consumes them. Nothing in
/// here performs I/O.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

/// One 3-hour forecast bucket as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Start of the bucket, UTC.
    pub timestamp: DateTime<Utc>,
    /// Rainfall accumulated over the 3-hour bucket, mm. 0.0 when the
    /// provider omits it.
    pub rainfall_mm: f64,
    pub temperature_c: f64,
    /// Relative humidity, 0 to 100.
    pub humidity_pct: f64,
    pub wind_speed_mps: f64,
    pub pressure_hpa: f64,
}

impl ForecastRecord {
    /// Timestamp shifted into the municipal time zone.
    pub fn local_time(&self, offset: FixedOffset) -> DateTime<FixedOffset> {
        self.timestamp.with_timezone(&offset)
    }

    pub fn wind_speed_kmh(&self) -> f64 {
        self.wind_speed_mps * 3.6
    }
}

/// Records in provider order (ascending timestamps). An empty series means
/// "no forecast available", never an error.
pub type ForecastSeries = Vec<ForecastRecord>;

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A curated location with a record of past flooding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloodPoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub occurrence_count: u32,
    /// Valid dates in the order they appear in the reference table.
    pub historical_dates: Vec<NaiveDate>,
}

impl FloodPoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

/// Coarse flood risk derived from summed forecast rainfall. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }

    /// Map marker palette used for the monitored points.
    pub fn marker_color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "green",
            RiskLevel::Medium => "orange",
            RiskLevel::High => "red",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
