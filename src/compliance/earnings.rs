//! Earnings calculation for a closed shift.
//!
//! Applies the classification's premium multiplier, splits regular
//! weekday shifts into ordinary and overtime hours, and accrues
//! vakantiegeld on top of the computed earnings.

use rust_decimal::Decimal;

use crate::config::CaoConfig;
use crate::error::{EngineError, EngineResult};
use crate::holidays::HolidayCalendar;
use crate::models::{CaoEarningsResult, CategoryLine, PayCategory, TimeEntry};
use crate::timezone::LocalClock;

use super::classify::{ShiftCategory, classify_shift};
use super::validation::validate_entry;

/// Computes the earnings breakdown and compliance verdict for a closed
/// entry.
///
/// `weekly_entries` are the guard's other entries in the same calendar
/// week, used for the weekly-hours and rest-period checks.
///
/// # Errors
///
/// Returns [`EngineError::InvalidEntry`] when the entry is not checked
/// out; earnings are only computed for closed, immutable entries.
pub fn compute_earnings(
    entry: &TimeEntry,
    base_rate: Decimal,
    weekly_entries: &[TimeEntry],
    calendar: &HolidayCalendar,
    local_clock: &dyn LocalClock,
    config: &CaoConfig,
) -> EngineResult<CaoEarningsResult> {
    let checked_out_at = entry
        .checked_out_at
        .ok_or_else(|| EngineError::InvalidEntry {
            entry_id: entry.id,
            message: "earnings require a checked-out entry".to_string(),
        })?;

    if checked_out_at <= entry.checked_in_at {
        return Err(EngineError::InvalidEntry {
            entry_id: entry.id,
            message: "check-out must be after check-in".to_string(),
        });
    }

    let start_local = local_clock.to_local(entry.checked_in_at);
    let end_local = local_clock.to_local(checked_out_at);
    let category = classify_shift(start_local, end_local, calendar, config.premiums());

    let hours = entry.worked_hours();
    let lines = build_lines(category, hours, base_rate, config);

    let total_earnings: Decimal = lines.iter().map(|l| l.amount).sum();
    let holiday_pay = total_earnings * config.premiums().vakantiegeld_rate;
    let effective_hourly_rate = if hours > Decimal::ZERO {
        total_earnings / hours
    } else {
        Decimal::ZERO
    };

    Ok(CaoEarningsResult {
        lines,
        total_earnings,
        holiday_pay,
        effective_hourly_rate,
        compliance: validate_entry(entry, weekly_entries, local_clock, config),
    })
}

/// Builds the category lines for the classified hours.
///
/// Only a regular weekday shift splits into two lines; every other
/// category puts all hours on one line at its multiplier.
fn build_lines(
    category: ShiftCategory,
    hours: Decimal,
    base_rate: Decimal,
    config: &CaoConfig,
) -> Vec<CategoryLine> {
    if hours <= Decimal::ZERO {
        return Vec::new();
    }

    let premiums = config.premiums();

    match category {
        ShiftCategory::RegularWeekday => {
            let ordinary_hours = hours.min(premiums.daily_ordinary_hours);
            let overtime_hours = hours - ordinary_hours;

            let mut lines = vec![CategoryLine {
                category: PayCategory::Regular,
                hours: ordinary_hours,
                rate: base_rate,
                amount: ordinary_hours * base_rate,
            }];

            if overtime_hours > Decimal::ZERO {
                let overtime_rate = base_rate * premiums.premiums.overtime;
                lines.push(CategoryLine {
                    category: PayCategory::Overtime,
                    hours: overtime_hours,
                    rate: overtime_rate,
                    amount: overtime_hours * overtime_rate,
                });
            }

            lines
        }
        _ => {
            let rate = base_rate * category.multiplier(&premiums.premiums);
            vec![CategoryLine {
                category: category.pay_category(),
                hours,
                rate,
                amount: hours * rate,
            }]
        }
    }
}
