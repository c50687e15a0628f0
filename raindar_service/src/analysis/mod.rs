/// Data analysis for the rainfall / flood-point service.
///
/// Submodules:
/// - `risk`       - 24 h horizon filtering, rainfall totals, LOW/MEDIUM/HIGH
/// - `proximity`  - WGS84 geodesic distance, nearest flood point
/// - `history`    - flood date parsing and occurrence statistics
/// - `rainfall`   - hourly and daily rainfall chart series
/// - `storm`      - threshold-based storm watch over the horizon
/// - `conditions` - comfort bands for the current forecast bucket
///
/// Everything here is pure: no I/O, no clock reads. Callers pass "now".

pub mod conditions;
pub mod history;
pub mod proximity;
pub mod rainfall;
pub mod risk;
pub mod storm;
