/// Nearest monitored flood point to a user position.
///
/// Distances are ellipsoidal (WGS84) using Vincenty's inverse formula,
/// which is accurate to well under a metre at municipal scale. The
/// iteration does not converge for nearly antipodal pairs; those fall back
/// to a great-circle distance on the mean Earth radius, which is more than
/// good enough for picking a nearest point.

use thiserror::Error;

use crate::model::{Coordinate, FloodPoint};

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
const MEAN_RADIUS_KM: f64 = 6_371.008_8;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProximityError {
    #[error("no flood points available")]
    NoPoints,
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearestPoint<'a> {
    pub point: &'a FloodPoint,
    pub distance_km: f64,
}

// ---------------------------------------------------------------------------
// Distance
// ---------------------------------------------------------------------------

/// Geodesic distance between two positions on the WGS84 ellipsoid, km.
pub fn geodesic_distance_km(from: Coordinate, to: Coordinate) -> f64 {
    vincenty_km(from, to).unwrap_or_else(|| haversine_km(from, to))
}

fn vincenty_km(from: Coordinate, to: Coordinate) -> Option<f64> {
    let l = (to.longitude - from.longitude).to_radians();
    let u1 = ((1.0 - WGS84_F) * from.latitude.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * to.latitude.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();

        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            return Some(0.0); // coincident points
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial line: cos_sq_alpha == 0
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };

        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - previous).abs() < CONVERGENCE {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let a = 1.0
                + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = b
                * sin_sigma
                * (cos_2sigma_m
                    + b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));

            return Some(WGS84_B * a * (sigma - delta_sigma) / 1000.0);
        }
    }

    None
}

fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * MEAN_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// The point closest to `user`, with its distance. Ties go to the point
/// listed first. Points whose distance cannot be computed (non-finite
/// coordinates) are ignored; if none remain the result is `NoPoints`.
pub fn nearest_point(user: Coordinate, points: &[FloodPoint]) -> Result<NearestPoint<'_>, ProximityError> {
    if !user.is_valid() {
        return Err(ProximityError::InvalidCoordinate {
            latitude: user.latitude,
            longitude: user.longitude,
        });
    }

    let mut best: Option<NearestPoint<'_>> = None;
    for point in points {
        let distance_km = geodesic_distance_km(user, point.coordinate());
        if !distance_km.is_finite() {
            continue;
        }
        if best.as_ref().is_none_or(|b| distance_km < b.distance_km) {
            best = Some(NearestPoint { point, distance_km });
        }
    }

    best.ok_or(ProximityError::NoPoints)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn point(name: &str, latitude: f64, longitude: f64) -> FloodPoint {
        FloodPoint {
            name: name.to_string(),
            latitude,
            longitude,
            occurrence_count: 1,
            historical_dates: vec![],
        }
    }

    fn three_points() -> Vec<FloodPoint> {
        vec![
            point("A", -21.79, -48.18),
            point("B", -21.80, -48.20),
            point("C", -21.70, -48.10),
        ]
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = geodesic_distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((d - 111.319_491).abs() < 0.001, "got {} km", d);
    }

    #[test]
    fn test_one_degree_of_latitude_at_equator() {
        // Meridian arc 0°→1° on WGS84 is 110.574 km.
        let d = geodesic_distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 110.574).abs() < 0.01, "got {} km", d);
    }

    #[test]
    fn test_coincident_points_are_zero() {
        let here = Coordinate::new(-21.7945, -48.1752);
        assert_eq!(geodesic_distance_km(here, here), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(-21.79, -48.18);
        let c = Coordinate::new(-21.70, -48.10);
        let there = geodesic_distance_km(a, c);
        let back = geodesic_distance_km(c, a);
        assert!((there - back).abs() < 1e-9);
        assert!(there > 12.0 && there < 14.0, "A to C should be about 13 km, got {}", there);
    }

    #[test]
    fn test_nearly_antipodal_falls_back() {
        let d = geodesic_distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.5, 179.7));
        assert!(d.is_finite());
        assert!(d > 19_000.0 && d < 20_100.0, "got {} km", d);
    }

    #[test]
    fn test_nearest_of_three() {
        let points = three_points();
        let nearest = nearest_point(Coordinate::new(-21.795, -48.179), &points).unwrap();

        assert_eq!(nearest.point.name, "A");
        assert!(nearest.distance_km < 1.0, "got {} km", nearest.distance_km);
    }

    #[test]
    fn test_nearest_picks_each_point_from_its_own_location() {
        let points = three_points();
        for p in &points {
            let nearest = nearest_point(p.coordinate(), &points).unwrap();
            assert_eq!(nearest.point.name, p.name);
            assert_eq!(nearest.distance_km, 0.0);
        }
    }

    #[test]
    fn test_tie_goes_to_first_listed() {
        let points = vec![point("first", -21.79, -48.18), point("second", -21.79, -48.18)];
        let nearest = nearest_point(Coordinate::new(-21.80, -48.19), &points).unwrap();
        assert_eq!(nearest.point.name, "first");
    }

    #[test]
    fn test_non_finite_point_never_wins() {
        let points = vec![point("Garbage", f64::NAN, f64::NAN), point("A", -21.79, -48.18)];
        let nearest = nearest_point(Coordinate::new(-21.79, -48.18), &points).unwrap();

        assert_eq!(nearest.point.name, "A");
        assert_eq!(nearest.distance_km, 0.0);
    }

    #[test]
    fn test_only_non_finite_points_is_no_points() {
        let points = vec![point("Garbage", f64::NAN, -48.18), point("Infinite", f64::INFINITY, 0.0)];
        let result = nearest_point(Coordinate::new(-21.79, -48.18), &points);
        assert_eq!(result.unwrap_err(), ProximityError::NoPoints);
    }

    #[test]
    fn test_empty_set_is_an_error() {
        let result = nearest_point(Coordinate::new(-21.79, -48.18), &[]);
        assert_eq!(result.unwrap_err(), ProximityError::NoPoints);
    }

    #[test]
    fn test_invalid_coordinate_is_an_error() {
        let points = three_points();
        let result = nearest_point(Coordinate::new(f64::NAN, -48.18), &points);
        assert!(matches!(result, Err(ProximityError::InvalidCoordinate { .. })));
    }
}
