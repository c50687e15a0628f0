/// Rainfall-based flood risk classification.
///
/// Risk is a function of one number: the forecast rainfall summed over the
/// next 24 hours. It does not look at the flood points at all, which means
/// every point on the map gets the same city-wide label. That is a known
/// limitation of using a single municipal forecast, not something this
/// module tries to correct.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::model::{FloodPoint, ForecastRecord, RiskLevel};

/// Width of the analysis window, hours from "now".
pub const HORIZON_HOURS: i64 = 24;

/// Lower edge of the MEDIUM bucket, mm.
pub const MEDIUM_THRESHOLD_MM: f64 = 10.0;
/// Lower edge of the HIGH bucket, mm.
pub const HIGH_THRESHOLD_MM: f64 = 20.0;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// `< 10` LOW, `10..20` MEDIUM, `>= 20` HIGH. Each bucket includes its
/// lower edge.
pub fn classify(total_rainfall_mm: f64) -> RiskLevel {
    if total_rainfall_mm >= HIGH_THRESHOLD_MM {
        RiskLevel::High
    } else if total_rainfall_mm >= MEDIUM_THRESHOLD_MM {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

// ---------------------------------------------------------------------------
// Horizon
// ---------------------------------------------------------------------------

/// Records with `now <= timestamp <= now + hours`, both ends inclusive,
/// in input order.
pub fn filter_horizon(records: &[ForecastRecord], now: DateTime<Utc>, hours: i64) -> Vec<ForecastRecord> {
    let limit = now + Duration::hours(hours);
    records
        .iter()
        .filter(|r| r.timestamp >= now && r.timestamp <= limit)
        .cloned()
        .collect()
}

pub fn total_rainfall(records: &[ForecastRecord]) -> f64 {
    records.iter().map(|r| r.rainfall_mm).sum()
}

/// Rainfall total of an already-filtered horizon and its classification.
/// `None` when the horizon holds no records, so "no data" never reads as LOW.
pub fn assess(horizon: &[ForecastRecord]) -> Option<(f64, RiskLevel)> {
    if horizon.is_empty() {
        return None;
    }
    let total = total_rainfall(horizon);
    Some((total, classify(total)))
}

// ---------------------------------------------------------------------------
// Map markers
// ---------------------------------------------------------------------------

/// One monitored point coloured by risk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMarker {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub risk: RiskLevel,
    pub color: &'static str,
    pub rainfall_mm: f64,
}

/// Markers for every point, all carrying the same city-wide rainfall and
/// risk.
pub fn risk_markers(points: &[FloodPoint], city_rainfall_mm: f64) -> Vec<RiskMarker> {
    let risk = classify(city_rainfall_mm);
    points
        .iter()
        .map(|p| RiskMarker {
            name: p.name.clone(),
            latitude: p.latitude,
            longitude: p.longitude,
            risk,
            color: risk.marker_color(),
            rainfall_mm: city_rainfall_mm,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at(timestamp: DateTime<Utc>, rainfall_mm: f64) -> ForecastRecord {
        ForecastRecord {
            timestamp,
            rainfall_mm,
            temperature_c: 24.0,
            humidity_pct: 70.0,
            wind_speed_mps: 3.0,
            pressure_hpa: 1012.0,
        }
    }

    /// 17 records, one every 3 hours, covering 48 hours from `start`.
    fn forty_eight_hours(start: DateTime<Utc>) -> Vec<ForecastRecord> {
        (0..=16)
            .map(|i| record_at(start + Duration::hours(3 * i), 1.0))
            .collect()
    }

    // --- Classification ------------------------------------------------------

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(9.999), RiskLevel::Low);
        assert_eq!(classify(10.0), RiskLevel::Medium);
        assert_eq!(classify(19.999), RiskLevel::Medium);
        assert_eq!(classify(20.0), RiskLevel::High);
    }

    #[test]
    fn test_classify_extremes() {
        assert_eq!(classify(0.0), RiskLevel::Low);
        assert_eq!(classify(250.0), RiskLevel::High);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut previous = classify(0.0);
        for tenths in 0..400 {
            let current = classify(tenths as f64 / 10.0);
            assert!(current as u8 >= previous as u8, "risk must never drop as rainfall rises");
            previous = current;
        }
    }

    // --- Horizon -------------------------------------------------------------

    #[test]
    fn test_horizon_is_inclusive_on_both_ends() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let records = forty_eight_hours(now);

        let horizon = filter_horizon(&records, now, HORIZON_HOURS);

        // 0h, 3h, ..., 24h
        assert_eq!(horizon.len(), 9);
        assert_eq!(horizon.first().unwrap().timestamp, now);
        assert_eq!(horizon.last().unwrap().timestamp, now + Duration::hours(24));
    }

    #[test]
    fn test_horizon_excludes_past_records() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let records = forty_eight_hours(start);
        let now = start + Duration::minutes(90);

        let horizon = filter_horizon(&records, now, HORIZON_HOURS);

        assert!(horizon.iter().all(|r| r.timestamp >= now));
        assert_eq!(horizon.first().unwrap().timestamp, start + Duration::hours(3));
        // 3h .. 24h after start; 25.5h would be the edge, 27h is outside
        assert_eq!(horizon.len(), 8);
    }

    #[test]
    fn test_horizon_of_empty_series() {
        let now = Utc::now();
        assert!(filter_horizon(&[], now, HORIZON_HOURS).is_empty());
    }

    #[test]
    fn test_assess_sums_only_the_horizon() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut records = forty_eight_hours(now);
        // A downpour just outside the window should not count.
        records[9].rainfall_mm = 50.0;

        let horizon = filter_horizon(&records, now, HORIZON_HOURS);
        assert_eq!(assess(&horizon), Some((9.0, RiskLevel::Low)));
    }

    #[test]
    fn test_assess_without_horizon_data() {
        assert_eq!(assess(&[]), None);
    }

    // --- Markers -------------------------------------------------------------

    #[test]
    fn test_markers_share_city_wide_risk() {
        let points = vec![
            FloodPoint {
                name: "A".to_string(),
                latitude: -21.79,
                longitude: -48.18,
                occurrence_count: 1,
                historical_dates: vec![],
            },
            FloodPoint {
                name: "B".to_string(),
                latitude: -21.70,
                longitude: -48.10,
                occurrence_count: 9,
                historical_dates: vec![],
            },
        ];

        let markers = risk_markers(&points, 12.5);
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|m| m.risk == RiskLevel::Medium && m.color == "orange"));
        assert!(markers.iter().all(|m| m.rainfall_mm == 12.5));
    }
}
