//! Error types for the CAO time tracking and compliance engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all failure conditions in location verification, shift clock state
//! transitions, persistence, and configuration loading.

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the engine.
///
/// Verification failures carry the measured values (distance, accuracy) so
/// callers can give actionable feedback to the guard.
///
/// # Example
///
/// ```
/// use cao_engine::error::EngineError;
///
/// let error = EngineError::OutOfGeofence {
///     distance_meters: 250.0,
///     radius_meters: 100.0,
/// };
/// assert_eq!(
///     error.to_string(),
///     "Location is 250.0m from the site center, outside the 100.0m geofence"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Location services are disabled or permission was denied.
    #[error("Location unavailable: {reason}")]
    LocationUnavailable {
        /// Why no location could be obtained.
        reason: String,
    },

    /// No location sample was obtained within the acquisition timeout.
    #[error("Location acquisition timed out after {timeout_secs}s")]
    AcquisitionTimeout {
        /// The timeout that elapsed, in seconds.
        timeout_secs: u64,
    },

    /// The acquired sample's reported accuracy exceeds the threshold.
    #[error("Location accuracy {measured_meters:.1}m exceeds the {threshold_meters:.1}m threshold")]
    AccuracyInsufficient {
        /// The accuracy reported by the sample, in meters.
        measured_meters: f64,
        /// The maximum acceptable accuracy, in meters.
        threshold_meters: f64,
    },

    /// The platform reported the sample came from a synthetic source.
    #[error("Location sample came from a mocked source")]
    SpoofDetected,

    /// The verified sample lies outside the site geofence.
    #[error("Location is {distance_meters:.1}m from the site center, outside the {radius_meters:.1}m geofence")]
    OutOfGeofence {
        /// Measured distance from the fence center, in meters.
        distance_meters: f64,
        /// The fence radius, in meters.
        radius_meters: f64,
    },

    /// The guard already has an open time entry.
    #[error("Guard '{guard_id}' already has an active time entry")]
    ShiftAlreadyActive {
        /// The guard with the open entry.
        guard_id: String,
    },

    /// The guard has no open time entry.
    #[error("Guard '{guard_id}' has no active time entry")]
    NoActiveShift {
        /// The guard without an open entry.
        guard_id: String,
    },

    /// A break was started while one is already open.
    #[error("Guard '{guard_id}' is already on a break")]
    AlreadyOnBreak {
        /// The guard already on break.
        guard_id: String,
    },

    /// A break was ended while none is open.
    #[error("Guard '{guard_id}' has no active break")]
    NoActiveBreak {
        /// The guard without an open break.
        guard_id: String,
    },

    /// The time entry is already checked out and immutable.
    #[error("Time entry {entry_id} is already checked out")]
    EntryAlreadyClosed {
        /// The closed entry.
        entry_id: Uuid,
    },

    /// Another clock operation for the same guard is in flight.
    #[error("Another clock operation for guard '{guard_id}' is in progress")]
    OperationInProgress {
        /// The guard whose operations are serialized.
        guard_id: String,
    },

    /// The time entry was not found in the repository.
    #[error("Time entry {entry_id} not found")]
    EntryNotFound {
        /// The missing entry.
        entry_id: Uuid,
    },

    /// The persistence layer could not be reached.
    #[error("Persistence unavailable: {message}")]
    RepositoryUnavailable {
        /// A description of the persistence failure.
        message: String,
    },

    /// A time entry contained inconsistent data.
    #[error("Invalid time entry {entry_id}: {message}")]
    InvalidEntry {
        /// The inconsistent entry.
        entry_id: Uuid,
        /// What made the entry invalid.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Returns true for failures the caller can remediate and retry,
    /// such as moving closer to the site or enabling location services.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::LocationUnavailable { .. }
                | EngineError::AcquisitionTimeout { .. }
                | EngineError::AccuracyInsufficient { .. }
                | EngineError::OutOfGeofence { .. }
                | EngineError::OperationInProgress { .. }
                | EngineError::RepositoryUnavailable { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
