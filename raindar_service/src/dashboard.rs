/// Dashboard view-model assembly.
///
/// One evaluation cycle per request: fetch the forecast, read the flood
/// point table, resolve the user's position, then hand everything to
/// `build_dashboard`, which is a pure function of its inputs. There is no
/// state carried between requests.
///
/// Every section degrades independently. An empty forecast blanks the
/// rainfall, risk and storm sections but still allows the nearest-point
/// lookup; a broken reference table blanks the point sections but leaves
/// the forecast intact.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::analysis::conditions::{summarize_conditions, ConditionsSummary};
use crate::analysis::history::{self, HistorySummary, PointDetail};
use crate::analysis::proximity::nearest_point;
use crate::analysis::rainfall::{daily_totals, hourly_rainfall, DailyRainfall, HourlyRainfall};
use crate::analysis::risk::{self, RiskMarker, HORIZON_HOURS};
use crate::analysis::storm::{storm_watch, StormWatch};
use crate::config::{Config, ConfigError};
use crate::flood_points::{load_flood_points, FloodPointsError};
use crate::ingest::{Geocoder, WeatherProvider};
use crate::model::{Coordinate, FloodPoint, ForecastRecord, RiskLevel};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Where the user is, as far as this request knows.
#[derive(Debug, Clone, PartialEq)]
pub enum UserPosition {
    Unset,
    /// An address was given but could not be resolved
    NotFound { query: String },
    At(Coordinate),
}

pub struct DashboardInputs<'a> {
    pub now: DateTime<Utc>,
    pub offset: FixedOffset,
    pub location_label: &'a str,
    pub map_center: Coordinate,
    pub user: &'a UserPosition,
    pub min_rainfall_mm: f64,
    pub series: &'a [ForecastRecord],
    pub points: Result<&'a [FloodPoint], &'a FloodPointsError>,
    pub selected_point: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub generated_at: DateTime<FixedOffset>,
    pub location: String,
    /// Initial map view, the configured municipal center.
    pub map_center: Coordinate,
    pub forecast_available: bool,
    pub horizon_hours: i64,
    /// `None` when there is no forecast inside the horizon.
    pub horizon_rainfall_mm: Option<f64>,
    pub risk: Option<RiskLevel>,
    pub hourly_rainfall: Vec<HourlyRainfall>,
    pub daily_rainfall: Vec<DailyRainfall>,
    pub conditions: Option<ConditionsSummary>,
    pub storm_watch: StormWatch,
    pub flood_points: FloodPointsView,
    pub proximity: ProximityStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FloodPointsView {
    Unavailable {
        reason: String,
    },
    Available {
        points: Vec<FloodPoint>,
        /// `None` without horizon data.
        risk_markers: Option<Vec<RiskMarker>>,
        /// Every marker carries the same municipal forecast; rainfall is
        /// not localized per point.
        risk_is_city_wide: bool,
        summary: HistorySummary,
        point_names: Vec<String>,
        selected: Option<PointDetail>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityReport {
    pub user: Coordinate,
    pub nearest: String,
    pub nearest_latitude: f64,
    pub nearest_longitude: f64,
    pub distance_km: f64,
    pub rainfall_mm: Option<f64>,
    pub risk: Option<RiskLevel>,
    pub risk_is_city_wide: bool,
    pub occurrence_count: u32,
    /// `DD-MM-YYYY; DD-MM-YYYY`, empty when the point has no dates.
    pub dates: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProximityStatus {
    NoUserLocation,
    AddressNotFound { query: String },
    DataUnavailable { reason: String },
    Found(ProximityReport),
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

pub fn build_dashboard(inputs: &DashboardInputs<'_>) -> DashboardView {
    let horizon = risk::filter_horizon(inputs.series, inputs.now, HORIZON_HOURS);

    let assessment = risk::assess(&horizon);

    let flood_points = match inputs.points {
        Ok(points) if !points.is_empty() => FloodPointsView::Available {
            points: points.to_vec(),
            risk_markers: assessment.map(|(total, _)| risk::risk_markers(points, total)),
            risk_is_city_wide: true,
            summary: history::summarize(points),
            point_names: history::point_names(points),
            selected: inputs
                .selected_point
                .and_then(|name| history::point_detail(points, name)),
        },
        Ok(_) => FloodPointsView::Unavailable {
            reason: FloodPointsError::Empty.to_string(),
        },
        Err(e) => FloodPointsView::Unavailable {
            reason: e.to_string(),
        },
    };

    DashboardView {
        generated_at: inputs.now.with_timezone(&inputs.offset),
        location: inputs.location_label.to_string(),
        map_center: inputs.map_center,
        forecast_available: !inputs.series.is_empty(),
        horizon_hours: HORIZON_HOURS,
        horizon_rainfall_mm: assessment.map(|(total, _)| total),
        risk: assessment.map(|(_, level)| level),
        hourly_rainfall: hourly_rainfall(&horizon, inputs.offset, inputs.min_rainfall_mm),
        daily_rainfall: daily_totals(inputs.series, inputs.offset),
        conditions: summarize_conditions(inputs.series, inputs.offset),
        storm_watch: storm_watch(&horizon, inputs.offset),
        flood_points,
        proximity: proximity_status(inputs, assessment),
    }
}

fn proximity_status(inputs: &DashboardInputs<'_>, assessment: Option<(f64, RiskLevel)>) -> ProximityStatus {
    let user = match inputs.user {
        UserPosition::Unset => return ProximityStatus::NoUserLocation,
        UserPosition::NotFound { query } => {
            return ProximityStatus::AddressNotFound {
                query: query.clone(),
            };
        }
        UserPosition::At(coordinate) => *coordinate,
    };

    let points = match inputs.points {
        Ok(points) => points,
        Err(e) => {
            return ProximityStatus::DataUnavailable {
                reason: e.to_string(),
            };
        }
    };

    match nearest_point(user, points) {
        Ok(nearest) => ProximityStatus::Found(ProximityReport {
            user,
            nearest: nearest.point.name.clone(),
            nearest_latitude: nearest.point.latitude,
            nearest_longitude: nearest.point.longitude,
            distance_km: nearest.distance_km,
            rainfall_mm: assessment.map(|(total, _)| total),
            risk: assessment.map(|(_, level)| level),
            risk_is_city_wide: true,
            occurrence_count: nearest.point.occurrence_count,
            dates: history::format_dates(&nearest.point.historical_dates),
        }),
        Err(e) => ProximityStatus::DataUnavailable {
            reason: e.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// What a caller asks for. A coordinate wins over an address when both
/// are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardQuery {
    pub coordinate: Option<Coordinate>,
    pub address: Option<String>,
    pub min_rainfall_mm: f64,
    pub selected_point: Option<String>,
}

/// Wires the providers and configuration to `build_dashboard`.
pub struct Dashboard<P, G> {
    config: Config,
    offset: FixedOffset,
    provider: P,
    geocoder: G,
}

impl<P: WeatherProvider, G: Geocoder> Dashboard<P, G> {
    pub fn new(config: Config, provider: P, geocoder: G) -> Result<Self, ConfigError> {
        let offset = config.municipality.offset()?;
        Ok(Self {
            config,
            offset,
            provider,
            geocoder,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads the reference table fresh from disk.
    pub fn flood_points(&self) -> Result<Vec<FloodPoint>, FloodPointsError> {
        let result = load_flood_points(&self.config.flood_points.path);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "flood point table unavailable");
        }
        result
    }

    pub fn resolve_position(&self, query: &DashboardQuery) -> UserPosition {
        if let Some(coordinate) = query.coordinate {
            return UserPosition::At(coordinate);
        }
        match query.address.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => match self.geocoder.locate(address) {
                Some(coordinate) => UserPosition::At(coordinate),
                None => UserPosition::NotFound {
                    query: address.to_string(),
                },
            },
            _ => UserPosition::Unset,
        }
    }

    /// One full evaluation cycle.
    pub fn render(&self, query: &DashboardQuery, now: DateTime<Utc>) -> DashboardView {
        let series = self.provider.fetch(&self.config.forecast.location);
        if series.is_empty() {
            tracing::warn!(location = %self.config.forecast.location, "no forecast data available");
        }

        let points = self.flood_points();
        let user = self.resolve_position(query);

        let view = build_dashboard(&DashboardInputs {
            now,
            offset: self.offset,
            location_label: &self.config.municipality.name,
            map_center: self.config.municipality.center(),
            user: &user,
            min_rainfall_mm: query.min_rainfall_mm,
            series: &series,
            points: points.as_deref(),
            selected_point: query.selected_point.as_deref(),
        });

        tracing::info!(
            records = series.len(),
            risk = ?view.risk,
            proximity = matches!(view.proximity, ProximityStatus::Found(_)),
            "dashboard rendered"
        );
        view
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
