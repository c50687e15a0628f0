/// Flood point reference table loader - parses pontos_alagamento.csv
///
/// The table is curated by hand outside this service and read fresh on
/// every request, so edits show up without a restart. Expected columns:
///
/// | column          | meaning                                     |
/// |-----------------|---------------------------------------------|
/// | `latitude`      | WGS84 latitude                              |
/// | `longitude`     | WGS84 longitude                             |
/// | `local`         | point name                                  |
/// | `ocorrencias`   | number of recorded flood occurrences        |
/// | `ultimas_datas` | `;`-separated list of occurrence dates      |
///
/// All five are required. A table missing any of them is rejected as a
/// whole; individual bad cells are skipped or defaulted instead.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::analysis::history::parse_historical_dates;
use crate::model::FloodPoint;

pub const REQUIRED_COLUMNS: [&str; 5] =
    ["latitude", "longitude", "local", "ocorrencias", "ultimas_datas"];

#[derive(Debug, Error)]
pub enum FloodPointsError {
    #[error("failed to open flood point table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read flood point table: {0}")]
    Csv(#[from] csv::Error),
    #[error("flood point table is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("flood point table has no usable rows")]
    Empty,
}

/// Column positions resolved from the header row.
struct ColumnIndex {
    latitude: usize,
    longitude: usize,
    name: usize,
    occurrences: usize,
    dates: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, FloodPointsError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| position(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(FloodPointsError::MissingColumns(missing));
        }

        // Presence checked above.
        let at = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            latitude: at("latitude"),
            longitude: at("longitude"),
            name: at("local"),
            occurrences: at("ocorrencias"),
            dates: at("ultimas_datas"),
        })
    }
}

/// Reads flood points from any CSV source.
pub fn read_flood_points<R: Read>(source: R) -> Result<Vec<FloodPoint>, FloodPointsError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);

    let columns = ColumnIndex::from_headers(reader.headers()?)?;
    let mut points = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or("");

        let (Ok(latitude), Ok(longitude)) =
            (field(columns.latitude).parse::<f64>(), field(columns.longitude).parse::<f64>())
        else {
            tracing::warn!(row = line + 1, "skipping flood point with unparsable coordinates");
            continue;
        };

        let point = FloodPoint {
            name: field(columns.name).to_string(),
            latitude,
            longitude,
            occurrence_count: parse_occurrences(field(columns.occurrences)),
            historical_dates: parse_historical_dates(field(columns.dates)),
        };

        // "NaN", "inf" and out-of-range degrees all parse as f64.
        if !point.coordinate().is_valid() {
            tracing::warn!(row = line + 1, latitude, longitude, "skipping flood point outside WGS84 range");
            continue;
        }
        points.push(point);
    }

    if points.is_empty() {
        return Err(FloodPointsError::Empty);
    }
    Ok(points)
}

/// Loads the reference table from disk.
pub fn load_flood_points(path: impl AsRef<Path>) -> Result<Vec<FloodPoint>, FloodPointsError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FloodPointsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_flood_points(file)
}

/// Occurrence counts are whole numbers, but spreadsheet exports sometimes
/// write them as "6.0". Anything else counts as zero.
fn parse_occurrences(raw: &str) -> u32 {
    if let Ok(n) = raw.parse::<u32>() {
        return n;
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f <= u32::MAX as f64 => f.round() as u32,
        _ => 0,
    }
}
