/// Flood occurrence history for the monitored points.
///
/// Dates arrive as one `;`-separated cell per point. Parsing is lenient:
/// bad tokens are dropped, the rest keep their input order. Aggregates
/// are built from the parsed dates, not from the `ocorrencias` column,
/// except where the column itself is what's being reported.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::FloodPoint;

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_date_token(token: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(token, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(token, f).ok())
                .map(|dt| dt.date())
        })
}

/// Splits a `;`-delimited date list, keeping valid dates in input order.
///
/// Accepts ISO dates (optionally with a time part) and `DD/MM/YYYY`.
/// Empty and malformed tokens are skipped without error.
pub fn parse_historical_dates(raw: &str) -> Vec<NaiveDate> {
    raw.split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let parsed = parse_date_token(token);
            if parsed.is_none() {
                tracing::debug!(token, "ignoring malformed flood date");
            }
            parsed
        })
        .collect()
}

/// `05-01-2020; 10-03-2021` style, as shown next to the nearest point.
pub fn format_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|d| d.format("%d-%m-%Y").to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub occurrences: usize,
}

/// Counts dates per calendar year, ascending by year.
pub fn occurrences_by_year<'a>(dates: impl IntoIterator<Item = &'a NaiveDate>) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for date in dates {
        *counts.entry(date.year()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(year, occurrences)| YearCount { year, occurrences })
        .collect()
}

/// City-wide figures over the whole reference table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total_points: usize,
    pub total_occurrences: u64,
    /// Point with the most recorded occurrences; first one wins a tie.
    pub most_critical: Option<String>,
    pub occurrences_by_year: Vec<YearCount>,
}

pub fn summarize(points: &[FloodPoint]) -> HistorySummary {
    let mut most_critical: Option<&FloodPoint> = None;
    for point in points {
        if most_critical.is_none_or(|best| point.occurrence_count > best.occurrence_count) {
            most_critical = Some(point);
        }
    }

    HistorySummary {
        total_points: points.len(),
        total_occurrences: points.iter().map(|p| u64::from(p.occurrence_count)).sum(),
        most_critical: most_critical.map(|p| p.name.clone()),
        occurrences_by_year: occurrences_by_year(points.iter().flat_map(|p| &p.historical_dates)),
    }
}

/// Everything shown for one selected point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointDetail {
    pub name: String,
    pub occurrence_count: u64,
    pub occurrences_by_year: Vec<YearCount>,
    /// Chronological, `DD/MM/YYYY`.
    pub dates: Vec<String>,
}

/// Detail for the point(s) named `name`. Duplicate names in the table are
/// merged, matching how the table is curated (one row per incident batch).
pub fn point_detail(points: &[FloodPoint], name: &str) -> Option<PointDetail> {
    let matching: Vec<&FloodPoint> = points.iter().filter(|p| p.name == name).collect();
    if matching.is_empty() {
        return None;
    }

    let mut dates: Vec<NaiveDate> = matching
        .iter()
        .flat_map(|p| p.historical_dates.iter().copied())
        .collect();
    dates.sort();

    Some(PointDetail {
        name: name.to_string(),
        occurrence_count: matching.iter().map(|p| u64::from(p.occurrence_count)).sum(),
        occurrences_by_year: occurrences_by_year(&dates),
        dates: dates.iter().map(|d| d.format("%d/%m/%Y").to_string()).collect(),
    })
}

/// Sorted, de-duplicated point names for selection lists.
pub fn point_names(points: &[FloodPoint]) -> Vec<String> {
    let mut names: Vec<String> = points.iter().map(|p| p.name.clone()).collect();
    names.sort();
    names.dedup();
    names
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
