/// External data sources.
///
/// - `openweather` - OpenWeatherMap 5 day / 3 hour forecast: URL
///   construction, JSON parsing, blocking fetch with soft failure
/// - `geocode`     - Nominatim free-text address lookup
/// - `fixtures` (test only) - representative provider payloads
///
/// Both sources sit behind a trait so the analysis and dashboard code can be
/// exercised without network access.

use crate::model::{Coordinate, ForecastSeries};

pub mod geocode;
pub mod openweather;

#[cfg(test)]
pub(crate) mod fixtures;

/// Source of forecast rows for a location.
///
/// Implementations never fail: transport or payload problems yield an empty
/// series, which callers treat as "no data available".
pub trait WeatherProvider {
    fn fetch(&self, location: &str) -> ForecastSeries;
}

/// Resolves a free-text address to a coordinate. `None` means not found,
/// whatever the underlying cause.
pub trait Geocoder {
    fn locate(&self, address: &str) -> Option<Coordinate>;
}

impl<T: WeatherProvider + ?Sized> WeatherProvider for Box<T> {
    fn fetch(&self, location: &str) -> ForecastSeries {
        (**self).fetch(location)
    }
}
