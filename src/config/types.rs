//! Configuration types for the CAO compliance engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML policy files. Every policy parameter the
//! engine uses (premium multipliers, the night window, break minimums,
//! working limits, geofence and verification thresholds) lives here, with
//! defaults matching the CAO Particuliere Beveiliging values so pure
//! computation can run without files on disk.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Metadata about the collective labor agreement.
#[derive(Debug, Clone, Deserialize)]
pub struct CaoMetadata {
    /// Short code for the agreement (e.g., "cao-pb").
    pub code: String,
    /// The human-readable name of the agreement.
    pub name: String,
    /// The version or effective date of the agreement.
    pub version: String,
    /// URL to the official agreement text.
    pub source_url: String,
}

impl Default for CaoMetadata {
    fn default() -> Self {
        Self {
            code: "cao-pb".to_string(),
            name: "CAO Particuliere Beveiliging".to_string(),
            version: "2024-07-01".to_string(),
            source_url: "https://www.kadera-beveiliging.nl/cao".to_string(),
        }
    }
}

/// Premium multipliers per pay category.
///
/// A shift falls into exactly one top-level category; the precedence
/// (holiday, then Sunday, then Saturday, then night) is fixed, the
/// multipliers are data.
#[derive(Debug, Clone, Deserialize)]
pub struct PremiumRates {
    /// Multiplier for public-holiday shifts.
    pub holiday: Decimal,
    /// Multiplier for Sunday shifts.
    pub sunday: Decimal,
    /// Multiplier for Saturday shifts.
    pub saturday: Decimal,
    /// Multiplier for shifts intersecting the night window.
    pub night: Decimal,
    /// Multiplier for weekday hours beyond the daily ordinary threshold.
    pub overtime: Decimal,
}

impl Default for PremiumRates {
    fn default() -> Self {
        Self {
            holiday: Decimal::new(20, 1),  // 2.0
            sunday: Decimal::new(20, 1),   // 2.0
            saturday: Decimal::new(15, 1), // 1.5
            night: Decimal::new(13, 1),    // 1.3
            overtime: Decimal::new(15, 1), // 1.5
        }
    }
}

/// The nightly window that attracts the night premium.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NightWindow {
    /// Local hour the window opens (22 for 22:00).
    pub start_hour: u32,
    /// Local hour the window closes the next morning (6 for 06:00).
    pub end_hour: u32,
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            start_hour: 22,
            end_hour: 6,
        }
    }
}

/// The premiums section of the policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PremiumConfig {
    /// Premium multipliers per category.
    pub premiums: PremiumRates,
    /// The night window.
    pub night_window: NightWindow,
    /// Daily ordinary hours before weekday overtime starts.
    pub daily_ordinary_hours: Decimal,
    /// Vakantiegeld accrual as a fraction of gross earnings.
    pub vakantiegeld_rate: Decimal,
}

impl Default for PremiumConfig {
    fn default() -> Self {
        Self {
            premiums: PremiumRates::default(),
            night_window: NightWindow::default(),
            daily_ordinary_hours: Decimal::new(8, 0),
            vakantiegeld_rate: Decimal::new(8, 2), // 0.08
        }
    }
}

/// One row of the required-break table: shifts of at least `min_hours`
/// require `required_minutes` of break time.
#[derive(Debug, Clone, Deserialize)]
pub struct BreakRequirement {
    /// Lower bound (inclusive) of shift hours this row applies from.
    pub min_hours: Decimal,
    /// Required break minutes for such shifts.
    pub required_minutes: i64,
}

/// Legal working limits checked at check-out.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkingLimits {
    /// Maximum length of a single shift in hours.
    pub max_shift_hours: Decimal,
    /// Maximum worked hours per calendar week.
    pub max_weekly_hours: Decimal,
    /// Required rest between shifts in hours; shorter gaps warn.
    pub minimum_rest_hours: i64,
    /// Rest below this many hours is a high-severity violation.
    pub critical_rest_hours: i64,
    /// Required break minutes by shift length, ascending by `min_hours`.
    pub required_breaks: Vec<BreakRequirement>,
}

impl Default for WorkingLimits {
    fn default() -> Self {
        Self {
            max_shift_hours: Decimal::new(12, 0),
            max_weekly_hours: Decimal::new(60, 0),
            minimum_rest_hours: 11,
            critical_rest_hours: 8,
            required_breaks: vec![
                BreakRequirement {
                    min_hours: Decimal::new(4, 0),
                    required_minutes: 15,
                },
                BreakRequirement {
                    min_hours: Decimal::new(55, 1), // 5.5
                    required_minutes: 30,
                },
                BreakRequirement {
                    min_hours: Decimal::new(8, 0),
                    required_minutes: 45,
                },
            ],
        }
    }
}

impl WorkingLimits {
    /// Returns the required break minutes for a shift of the given length.
    pub fn required_break_minutes(&self, shift_hours: Decimal) -> i64 {
        self.required_breaks
            .iter()
            .filter(|r| shift_hours >= r.min_hours)
            .map(|r| r.required_minutes)
            .max()
            .unwrap_or(0)
    }
}

/// Location verification and sampling parameters.
///
/// Radius and accuracy are deployment policy, not physical constants.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VerificationConfig {
    /// Default geofence radius in meters when a site specifies none.
    pub geofence_radius_meters: f64,
    /// Maximum acceptable sample accuracy in meters.
    pub accuracy_threshold_meters: f64,
    /// Location acquisition timeout in seconds.
    pub acquisition_timeout_secs: u64,
    /// Interval of the background sampler in seconds.
    pub sample_interval_secs: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            geofence_radius_meters: 100.0,
            accuracy_threshold_meters: 50.0,
            acquisition_timeout_secs: 30,
            sample_interval_secs: 300,
        }
    }
}

/// Break inference thresholds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InferenceConfig {
    /// Samples within this many meters of the run anchor are stationary.
    pub stationary_radius_meters: f64,
    /// Minimum duration of a stationary run to count as a candidate break.
    pub minimum_stationary_minutes: i64,
    /// Distance from the site center below which the guard is on site.
    pub on_site_radius_meters: f64,
    /// Distance beyond which a stationary period suggests a meal break.
    pub meal_distance_meters: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            stationary_radius_meters: 25.0,
            minimum_stationary_minutes: 10,
            on_site_radius_meters: 200.0,
            meal_distance_meters: 1000.0,
        }
    }
}

/// The limits section of the policy configuration (limits.yaml).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitsConfig {
    /// Legal working limits.
    pub working_limits: WorkingLimits,
    /// Verification and sampling parameters.
    pub verification: VerificationConfig,
    /// Break inference thresholds.
    pub inference: InferenceConfig,
}

/// The complete policy configuration for one deployment.
#[derive(Debug, Clone, Default)]
pub struct CaoConfig {
    metadata: CaoMetadata,
    premiums: PremiumConfig,
    limits: LimitsConfig,
}

impl CaoConfig {
    /// Assembles a configuration from its parsed sections.
    pub fn new(metadata: CaoMetadata, premiums: PremiumConfig, limits: LimitsConfig) -> Self {
        Self {
            metadata,
            premiums,
            limits,
        }
    }

    /// Returns the agreement metadata.
    pub fn metadata(&self) -> &CaoMetadata {
        &self.metadata
    }

    /// Returns the premium configuration.
    pub fn premiums(&self) -> &PremiumConfig {
        &self.premiums
    }

    /// Returns the working limits.
    pub fn working_limits(&self) -> &WorkingLimits {
        &self.limits.working_limits
    }

    /// Returns the verification parameters.
    pub fn verification(&self) -> &VerificationConfig {
        &self.limits.verification
    }

    /// Returns the break inference thresholds.
    pub fn inference(&self) -> &InferenceConfig {
        &self.limits.inference
    }
}
