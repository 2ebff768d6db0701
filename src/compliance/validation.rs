//! Legal working-limit validation.
//!
//! Checks a closed entry against the CAO limits: maximum shift length,
//! maximum weekly hours, required break minutes, and the rest period since
//! the previous shift. Findings are advisory audit data; they never block
//! closing the shift.

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::config::CaoConfig;
use crate::models::{CaoComplianceResult, CaoViolation, TimeEntry, ViolationKind};
use crate::timezone::LocalClock;

/// Validates a closed entry against the CAO working limits.
///
/// `weekly_entries` are the guard's other entries in the same calendar
/// week; the most recent closed one before this entry also provides the
/// rest-period reference point.
pub fn validate_entry(
    entry: &TimeEntry,
    weekly_entries: &[TimeEntry],
    local_clock: &dyn LocalClock,
    config: &CaoConfig,
) -> CaoComplianceResult {
    let limits = config.working_limits();
    let mut violations = Vec::new();
    let mut warnings = Vec::new();
    let detected_at = entry.checked_out_at.unwrap_or(entry.checked_in_at);

    let shift_hours = entry.shift_hours();

    if shift_hours > limits.max_shift_hours {
        violations.push(CaoViolation {
            kind: ViolationKind::ExceedsMaximumHours,
            description: format!(
                "Shift lasted {} hours, above the {} hour maximum",
                shift_hours.normalize(),
                limits.max_shift_hours.normalize()
            ),
            severity: 0.9,
            detected_at,
        });
    }

    let weekly_hours = entry.worked_hours() + same_week_hours(entry, weekly_entries, local_clock);
    if weekly_hours > limits.max_weekly_hours {
        violations.push(CaoViolation {
            kind: ViolationKind::ExceedsWeeklyHours,
            description: format!(
                "{} hours worked this week, above the {} hour maximum",
                weekly_hours.normalize(),
                limits.max_weekly_hours.normalize()
            ),
            severity: 0.8,
            detected_at,
        });
    }

    let required_minutes = limits.required_break_minutes(shift_hours);
    let actual_minutes = entry.break_minutes();
    if actual_minutes < required_minutes {
        violations.push(CaoViolation {
            kind: ViolationKind::MissingRequiredBreaks,
            description: format!(
                "{} of {} required break minutes taken on a {} hour shift",
                actual_minutes,
                required_minutes,
                shift_hours.normalize()
            ),
            severity: 0.6,
            detected_at,
        });
    }

    if let Some(previous_end) = previous_shift_end(entry, weekly_entries) {
        let rest_minutes = (entry.checked_in_at - previous_end).num_minutes();
        let minimum = limits.minimum_rest_hours * 60;
        let critical = limits.critical_rest_hours * 60;

        if rest_minutes < minimum {
            let rest_hours = Decimal::new(rest_minutes, 0) / Decimal::new(60, 0);
            let finding = CaoViolation {
                kind: ViolationKind::InsufficientRestPeriod,
                description: format!(
                    "Only {} hours of rest since the previous shift, {} required",
                    rest_hours.round_dp(1).normalize(),
                    limits.minimum_rest_hours
                ),
                severity: if rest_minutes < critical { 0.9 } else { 0.3 },
                detected_at,
            };
            if rest_minutes < critical {
                violations.push(finding);
            } else {
                warnings.push(finding);
            }
        }
    }

    CaoComplianceResult {
        is_compliant: violations.is_empty(),
        violations,
        warnings,
    }
}

/// Sums the worked hours of the guard's other closed entries falling in
/// the same local ISO week as `entry`.
fn same_week_hours(
    entry: &TimeEntry,
    weekly_entries: &[TimeEntry],
    local_clock: &dyn LocalClock,
) -> Decimal {
    let week = local_clock.to_local(entry.checked_in_at).iso_week();

    weekly_entries
        .iter()
        .filter(|other| other.id != entry.id && other.is_closed())
        .filter(|other| local_clock.to_local(other.checked_in_at).iso_week() == week)
        .map(|other| other.worked_hours())
        .sum()
}

/// Finds the latest check-out before this entry's check-in among the
/// guard's other closed entries.
fn previous_shift_end(
    entry: &TimeEntry,
    weekly_entries: &[TimeEntry],
) -> Option<chrono::DateTime<chrono::Utc>> {
    weekly_entries
        .iter()
        .filter(|other| other.id != entry.id)
        .filter_map(|other| other.checked_out_at)
        .filter(|end| *end <= entry.checked_in_at)
        .max()
}
