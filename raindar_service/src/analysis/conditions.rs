/// Current-conditions summary from the first forecast bucket.
///
/// Bands follow common comfort guidance: WHO humidity range for
/// respiratory health, sea-level pressure norms, and a 23 to 26 °C thermal
/// comfort window. Values that fall in no band get `None` rather than a
/// made-up label.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::model::ForecastRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureBand {
    Cold,
    Mild,
    Comfortable,
    Hot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HumidityBand {
    VeryLow,
    Low,
    Moderate,
    Ideal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindBand {
    Calm,
    Moderate,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureBand {
    Low,
    Normal,
    High,
}

pub fn temperature_band(celsius: f64) -> TemperatureBand {
    if celsius < 20.0 {
        TemperatureBand::Cold
    } else if celsius < 23.0 {
        TemperatureBand::Mild
    } else if celsius <= 26.0 {
        TemperatureBand::Comfortable
    } else {
        TemperatureBand::Hot
    }
}

/// `(60, 80]` has no band.
pub fn humidity_band(pct: f64) -> Option<HumidityBand> {
    match pct {
        p if p < 20.0 => Some(HumidityBand::VeryLow),
        p if p < 30.0 => Some(HumidityBand::Low),
        p if p < 50.0 => Some(HumidityBand::Moderate),
        p if p <= 60.0 => Some(HumidityBand::Ideal),
        p if p > 80.0 => Some(HumidityBand::High),
        _ => None,
    }
}

pub fn wind_band(kmh: f64) -> WindBand {
    if kmh < 20.0 {
        WindBand::Calm
    } else if kmh < 50.0 {
        WindBand::Moderate
    } else {
        WindBand::Strong
    }
}

/// `[990, 1000)` and `(1020, 1030]` have no band.
pub fn pressure_band(hpa: f64) -> Option<PressureBand> {
    if hpa < 990.0 {
        Some(PressureBand::Low)
    } else if (1000.0..=1020.0).contains(&hpa) {
        Some(PressureBand::Normal)
    } else if hpa > 1030.0 {
        Some(PressureBand::High)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionsSummary {
    pub time: DateTime<FixedOffset>,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_mps: f64,
    pub wind_speed_kmh: f64,
    pub pressure_hpa: f64,
    pub temperature_band: TemperatureBand,
    pub humidity_band: Option<HumidityBand>,
    pub wind_band: WindBand,
    pub pressure_band: Option<PressureBand>,
}

/// Summary of the earliest bucket in the series, or `None` without data.
pub fn summarize_conditions(series: &[ForecastRecord], offset: FixedOffset) -> Option<ConditionsSummary> {
    let current = series.first()?;
    let wind_speed_kmh = current.wind_speed_kmh();

    Some(ConditionsSummary {
        time: current.local_time(offset),
        temperature_c: current.temperature_c,
        humidity_pct: current.humidity_pct,
        wind_speed_mps: current.wind_speed_mps,
        wind_speed_kmh,
        pressure_hpa: current.pressure_hpa,
        temperature_band: temperature_band(current.temperature_c),
        humidity_band: humidity_band(current.humidity_pct),
        wind_band: wind_band(wind_speed_kmh),
        pressure_band: pressure_band(current.pressure_hpa),
    })
}
