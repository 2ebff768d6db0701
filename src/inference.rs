//! Break inference from the periodic location trail.
//!
//! Guards forget to log breaks. This engine scans an entry's periodic
//! samples for stationary periods and turns them into advisory
//! [`BreakSuggestion`]s a supervisor can confirm. Suggestions are never
//! applied to the entry automatically.

use chrono::{DateTime, Utc};

use crate::config::InferenceConfig;
use crate::geo;
use crate::models::{BreakType, Coordinate, GpsSample, TimeEntry};

/// Confidence never reaches certainty; the trail is circumstantial.
const MAX_CONFIDENCE: f64 = 0.95;

/// A rest pause short enough to be paid under the CAO.
const PAID_REST_MINUTES: i64 = 15;

/// An inferred, unconfirmed break.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakSuggestion {
    /// Start of the stationary period.
    pub started_at: DateTime<Utc>,
    /// End of the stationary period.
    pub ended_at: DateTime<Utc>,
    /// The most plausible break type for where the guard was.
    pub break_type: BreakType,
    /// How sure the engine is, in (0, 0.95].
    pub confidence: f64,
    /// Whether the break would be paid if confirmed as suggested.
    pub suggested_paid: bool,
    /// Distance from the site center to the stationary position.
    pub distance_from_site_meters: f64,
}

impl BreakSuggestion {
    /// Duration of the suggested break in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.ended_at - self.started_at).num_minutes()
    }
}

/// Detects stationary periods in a shift's location trail and classifies
/// them as break candidates.
pub struct BreakInferenceEngine {
    config: InferenceConfig,
}

impl BreakInferenceEngine {
    /// Creates an engine with the given thresholds.
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Scans the entry's location trail for likely breaks.
    ///
    /// A stationary period is a run of consecutive samples within the
    /// stationary radius of the run's first sample, sustained for at least
    /// the minimum stationary duration. The trail starts with the check-in
    /// fix, so the first run is anchored at the site; an on-site run that
    /// begins there is ordinary post duty and is never suggested.
    pub fn suggest_breaks(&self, entry: &TimeEntry, site: Coordinate) -> Vec<BreakSuggestion> {
        let trail: Vec<&GpsSample> = entry.location_samples.iter().collect();

        let mut suggestions = Vec::new();
        let mut run_start = 0;
        for i in 1..=trail.len() {
            let still_in_run = i < trail.len()
                && geo::distance(trail[run_start].coordinate(), trail[i].coordinate())
                    <= self.config.stationary_radius_meters;
            if still_in_run {
                continue;
            }
            if let Some(suggestion) = self.classify_run(&trail[run_start..i], run_start == 0, site)
            {
                suggestions.push(suggestion);
            }
            run_start = i;
        }
        suggestions
    }

    fn classify_run(
        &self,
        run: &[&GpsSample],
        at_shift_start: bool,
        site: Coordinate,
    ) -> Option<BreakSuggestion> {
        let first = run.first()?;
        let last = run.last()?;
        let minutes = (last.recorded_at - first.recorded_at).num_minutes();
        if minutes < self.config.minimum_stationary_minutes {
            return None;
        }

        let distance = geo::distance(first.coordinate(), site);
        let break_type = if distance > self.config.meal_distance_meters {
            BreakType::Meal
        } else if distance > self.config.on_site_radius_meters {
            BreakType::Rest
        } else {
            BreakType::Personal
        };
        if at_shift_start && break_type == BreakType::Personal {
            // Standing at the post from the moment of check-in.
            return None;
        }
        let suggested_paid = break_type == BreakType::Rest && minutes <= PAID_REST_MINUTES;

        Some(BreakSuggestion {
            started_at: first.recorded_at,
            ended_at: last.recorded_at,
            break_type,
            confidence: confidence(minutes, distance),
            suggested_paid,
            distance_from_site_meters: distance,
        })
    }
}

/// Longer and farther both make a break more plausible.
fn confidence(minutes: i64, distance_meters: f64) -> f64 {
    let duration_part = (minutes.min(60) as f64 / 60.0) * 0.25;
    let distance_part = (distance_meters.min(2000.0) / 2000.0) * 0.2;
    (0.5 + duration_part + distance_part).min(MAX_CONFIDENCE)
}
