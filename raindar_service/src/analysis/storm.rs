/// Storm watch over the 24 h horizon.
///
/// Each forecast bucket is checked against four fixed thresholds. Any hit
/// flags the horizon as stormy; the individual alerts are listed in
/// chronological order, and within one bucket in rule order (rain, wind,
/// pressure, humidity).

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::model::ForecastRecord;

pub const HEAVY_RAIN_MM: f64 = 15.0;
pub const STRONG_WIND_KMH: f64 = 50.0;
pub const LOW_PRESSURE_HPA: f64 = 990.0;
pub const HIGH_HUMIDITY_PCT: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StormAlertKind {
    HeavyRain,
    StrongWind,
    LowPressure,
    HighHumidity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StormAlert {
    pub time: DateTime<FixedOffset>,
    pub kind: StormAlertKind,
    /// mm, km/h, hPa or %, depending on `kind`
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "alerts", rename_all = "snake_case")]
pub enum StormWatch {
    /// No horizon data to judge from
    Unavailable,
    Clear,
    Detected(Vec<StormAlert>),
}

fn alerts_for(record: &ForecastRecord, offset: FixedOffset) -> Vec<StormAlert> {
    let time = record.local_time(offset);
    let wind_kmh = record.wind_speed_kmh();

    [
        (record.rainfall_mm >= HEAVY_RAIN_MM, StormAlertKind::HeavyRain, record.rainfall_mm),
        (wind_kmh >= STRONG_WIND_KMH, StormAlertKind::StrongWind, wind_kmh),
        (record.pressure_hpa < LOW_PRESSURE_HPA, StormAlertKind::LowPressure, record.pressure_hpa),
        (record.humidity_pct >= HIGH_HUMIDITY_PCT, StormAlertKind::HighHumidity, record.humidity_pct),
    ]
    .into_iter()
    .filter(|(hit, _, _)| *hit)
    .map(|(_, kind, value)| StormAlert { time, kind, value })
    .collect()
}

pub fn storm_watch(horizon: &[ForecastRecord], offset: FixedOffset) -> StormWatch {
    if horizon.is_empty() {
        return StormWatch::Unavailable;
    }

    let alerts: Vec<StormAlert> = horizon.iter().flat_map(|r| alerts_for(r, offset)).collect();
    if alerts.is_empty() {
        StormWatch::Clear
    } else {
        StormWatch::Detected(alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn calm() -> ForecastRecord {
        ForecastRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            rainfall_mm: 0.0,
            temperature_c: 24.0,
            humidity_pct: 60.0,
            wind_speed_mps: 3.0,
            pressure_hpa: 1012.0,
        }
    }

    fn kinds(watch: &StormWatch) -> Vec<StormAlertKind> {
        match watch {
            StormWatch::Detected(alerts) => alerts.iter().map(|a| a.kind).collect(),
            _ => vec![],
        }
    }

    #[test]
    fn test_empty_horizon_is_unavailable() {
        assert_eq!(storm_watch(&[], brt()), StormWatch::Unavailable);
    }

    #[test]
    fn test_calm_horizon_is_clear() {
        assert_eq!(storm_watch(&[calm(), calm()], brt()), StormWatch::Clear);
    }

    #[test]
    fn test_thresholds_are_inclusive_where_documented() {
        let mut rain = calm();
        rain.rainfall_mm = 15.0;
        let mut humid = calm();
        humid.humidity_pct = 90.0;
        // 13.9 m/s is 50.04 km/h
        let mut windy = calm();
        windy.wind_speed_mps = 13.9;

        let watch = storm_watch(&[rain, humid, windy], brt());
        assert_eq!(
            kinds(&watch),
            vec![StormAlertKind::HeavyRain, StormAlertKind::HighHumidity, StormAlertKind::StrongWind]
        );
    }

    #[test]
    fn test_just_below_thresholds_are_clear() {
        let mut record = calm();
        record.rainfall_mm = 14.9;
        record.humidity_pct = 89.9;
        record.wind_speed_mps = 13.8; // 49.68 km/h
        record.pressure_hpa = 990.0; // strict
        assert_eq!(storm_watch(&[record], brt()), StormWatch::Clear);
    }

    #[test]
    fn test_one_bucket_can_raise_every_alert_in_rule_order() {
        let mut record = calm();
        record.rainfall_mm = 30.0;
        record.wind_speed_mps = 20.0;
        record.pressure_hpa = 985.0;
        record.humidity_pct = 95.0;

        let watch = storm_watch(&[record], brt());
        assert_eq!(
            kinds(&watch),
            vec![
                StormAlertKind::HeavyRain,
                StormAlertKind::StrongWind,
                StormAlertKind::LowPressure,
                StormAlertKind::HighHumidity,
            ]
        );

        if let StormWatch::Detected(alerts) = watch {
            assert_eq!(alerts[1].value, 72.0, "wind should be reported in km/h");
            assert_eq!(alerts[0].time.format("%H:%M").to_string(), "09:00");
        }
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(StormWatch::Clear).unwrap();
        assert_eq!(json["status"], "clear");
    }
}
