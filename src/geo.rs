//! Great-circle distance and geofence containment math.
//!
//! Pure, deterministic functions shared by the shift clock (presence
//! verification) and the break inference engine (trace analysis).

use crate::models::{Coordinate, GeofenceSpec};

/// Mean Earth radius in meters, as used by the Haversine formula.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Computes the great-circle distance between two coordinates in meters
/// using the Haversine formula.
///
/// The function is symmetric and returns 0 for identical points.
///
/// # Example
///
/// ```
/// use cao_engine::geo::distance;
/// use cao_engine::models::Coordinate;
///
/// let amsterdam = Coordinate::new(52.3676, 4.9041);
/// let rotterdam = Coordinate::new(51.9244, 4.4777);
///
/// let d = distance(amsterdam, rotterdam);
/// // Roughly 57 km as the crow flies.
/// assert!((d - 57_000.0).abs() < 2_000.0);
/// assert_eq!(distance(amsterdam, amsterdam), 0.0);
/// ```
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Returns true when `point` lies within `fence` (boundary inclusive).
///
/// # Example
///
/// ```
/// use cao_engine::geo::within_geofence;
/// use cao_engine::models::{Coordinate, GeofenceSpec};
///
/// let fence = GeofenceSpec {
///     center: Coordinate::new(52.3676, 4.9041),
///     radius_meters: 100.0,
/// };
/// assert!(within_geofence(Coordinate::new(52.3676, 4.9041), &fence));
/// assert!(!within_geofence(Coordinate::new(52.40, 4.90), &fence));
/// ```
pub fn within_geofence(point: Coordinate, fence: &GeofenceSpec) -> bool {
    distance(point, fence.center) <= fence.radius_meters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_of_identical_points_is_zero() {
        let p = Coordinate::new(52.3676, 4.9041);
        assert_eq!(distance(p, p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(52.3676, 4.9041);
        let b = Coordinate::new(51.9244, 4.4777);
        let ab = distance(a, b);
        let ba = distance(b, a);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance_amsterdam_utrecht() {
        // Amsterdam Centraal to Utrecht Centraal, roughly 35 km.
        let amsterdam = Coordinate::new(52.3791, 4.9003);
        let utrecht = Coordinate::new(52.0894, 5.1101);
        let d = distance(amsterdam, utrecht);
        assert!(d > 33_000.0 && d < 37_000.0, "got {}", d);
    }

    #[test]
    fn test_small_offset_distance() {
        // One thousandth of a degree of latitude is about 111 meters.
        let a = Coordinate::new(52.0, 4.0);
        let b = Coordinate::new(52.001, 4.0);
        let d = distance(a, b);
        assert!((d - 111.0).abs() < 2.0, "got {}", d);
    }

    #[test]
    fn test_within_geofence_at_center() {
        let fence = GeofenceSpec {
            center: Coordinate::new(52.0, 4.0),
            radius_meters: 100.0,
        };
        assert!(within_geofence(fence.center, &fence));
    }

    #[test]
    fn test_within_geofence_just_inside_and_outside() {
        let fence = GeofenceSpec {
            center: Coordinate::new(52.0, 4.0),
            radius_meters: 100.0,
        };
        // ~55m north of center.
        assert!(within_geofence(Coordinate::new(52.0005, 4.0), &fence));
        // ~222m north of center.
        assert!(!within_geofence(Coordinate::new(52.002, 4.0), &fence));
    }

    #[test]
    fn test_antimeridian_crossing() {
        let a = Coordinate::new(0.0, 179.999);
        let b = Coordinate::new(0.0, -179.999);
        // The two points are ~222m apart across the antimeridian.
        let d = distance(a, b);
        assert!(d < 500.0, "got {}", d);
    }
}
