/// Rainfall series for the charts: per-bucket rainfall over the horizon and
/// per-day totals over the whole forecast.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::ForecastRecord;

/// Upper end of the "minimum volume" chart filter, mm.
pub const MAX_MIN_RAINFALL_MM: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRainfall {
    pub time: DateTime<FixedOffset>,
    pub rainfall_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRainfall {
    pub date: NaiveDate,
    pub rainfall_mm: f64,
}

/// Clamps a user-supplied filter value into `[0, 20]`; NaN becomes 0.
pub fn clamp_min_rainfall(min_mm: f64) -> f64 {
    if min_mm.is_nan() {
        return 0.0;
    }
    min_mm.clamp(0.0, MAX_MIN_RAINFALL_MM)
}

/// Horizon buckets in local time, keeping those with at least `min_mm`.
pub fn hourly_rainfall(horizon: &[ForecastRecord], offset: FixedOffset, min_mm: f64) -> Vec<HourlyRainfall> {
    let min_mm = clamp_min_rainfall(min_mm);
    horizon
        .iter()
        .filter(|r| r.rainfall_mm >= min_mm)
        .map(|r| HourlyRainfall {
            time: r.local_time(offset),
            rainfall_mm: r.rainfall_mm,
        })
        .collect()
}

/// Rainfall per municipal calendar day across the whole series, ascending.
pub fn daily_totals(series: &[ForecastRecord], offset: FixedOffset) -> Vec<DailyRainfall> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in series {
        *totals.entry(record.local_time(offset).date_naive()).or_default() += record.rainfall_mm;
    }
    totals
        .into_iter()
        .map(|(date, rainfall_mm)| DailyRainfall { date, rainfall_mm })
        .collect()
}
