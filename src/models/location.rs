//! Location models: coordinates, GPS samples, and geofences.
//!
//! This module defines the geospatial types used by the shift clock for
//! presence verification and by the break inference engine for trace
//! analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude point in decimal degrees (WGS 84).
///
/// # Example
///
/// ```
/// use cao_engine::models::Coordinate;
///
/// let amsterdam = Coordinate {
///     latitude: 52.3676,
///     longitude: 4.9041,
/// };
/// assert!(amsterdam.latitude > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees, positive north.
    pub latitude: f64,
    /// Longitude in decimal degrees, positive east.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One location sample as delivered by the host platform.
///
/// Samples that report a mocked source or poor accuracy are rejected by
/// the verifier and never become part of a verified check-in or check-out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Reported horizontal accuracy in meters (lower is better).
    pub accuracy_meters: f64,
    /// When the sample was taken.
    pub recorded_at: DateTime<Utc>,
    /// Whether the platform flagged the sample as coming from a mock
    /// location provider.
    pub is_mock_source: bool,
}

impl GpsSample {
    /// Returns the sample's position as a [`Coordinate`].
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A circular geofence around a job site.
///
/// The radius is a policy parameter, configurable per site; 100m is the
/// deployment default.
///
/// # Example
///
/// ```
/// use cao_engine::models::{Coordinate, GeofenceSpec};
///
/// let fence = GeofenceSpec {
///     center: Coordinate::new(52.3676, 4.9041),
///     radius_meters: 100.0,
/// };
/// assert_eq!(fence.radius_meters, 100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeofenceSpec {
    /// The center of the fence, usually the site entrance.
    pub center: Coordinate,
    /// The fence radius in meters.
    pub radius_meters: f64,
}
