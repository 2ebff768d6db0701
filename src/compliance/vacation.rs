//! Statutory vacation-day accrual.
//!
//! A full-time year (2080 hours) accrues 25 vacation days; guards accrue
//! pro rata by worked hours and by the fraction of the calendar year they
//! were employed.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Vacation days accrued over a full-time year.
const FULL_TIME_VACATION_DAYS: i64 = 25;

/// Worked hours in a nominal full-time year.
const FULL_TIME_YEARLY_HOURS: i64 = 2080;

/// Computes the vacation days earned for a year of work.
///
/// `employment_fraction` is the fraction of the calendar year the guard
/// was employed, in [0, 1].
///
/// # Example
///
/// ```
/// use cao_engine::compliance::earned_vacation_days;
/// use rust_decimal::Decimal;
///
/// // A full year at full-time hours earns the full 25 days.
/// let days = earned_vacation_days(Decimal::from(2080), Decimal::ONE);
/// assert_eq!(days, Decimal::from(25));
///
/// // Half the hours earn half the days.
/// let days = earned_vacation_days(Decimal::from(1040), Decimal::ONE);
/// assert_eq!(days.round_dp(2), Decimal::new(1250, 2));
/// ```
pub fn earned_vacation_days(yearly_worked_hours: Decimal, employment_fraction: Decimal) -> Decimal {
    Decimal::from(FULL_TIME_VACATION_DAYS) * yearly_worked_hours
        / Decimal::from(FULL_TIME_YEARLY_HOURS)
        * employment_fraction
}

/// Returns the fraction of `year` the guard was employed, given their
/// employment start date.
pub fn employment_fraction_of_year(employment_start: NaiveDate, year: i32) -> Decimal {
    let year_start = match NaiveDate::from_ymd_opt(year, 1, 1) {
        Some(d) => d,
        None => return Decimal::ZERO,
    };
    let next_year_start = match NaiveDate::from_ymd_opt(year + 1, 1, 1) {
        Some(d) => d,
        None => return Decimal::ZERO,
    };

    if employment_start >= next_year_start {
        return Decimal::ZERO;
    }
    if employment_start <= year_start {
        return Decimal::ONE;
    }

    let days_in_year = (next_year_start - year_start).num_days();
    let employed_days = (next_year_start - employment_start).num_days();
    Decimal::new(employed_days, 0) / Decimal::new(days_in_year, 0)
}

/// Convenience wrapper combining both: vacation days for `year` given the
/// worked hours and the employment start date.
pub fn vacation_days_for_year(
    yearly_worked_hours: Decimal,
    employment_start: NaiveDate,
    year: i32,
) -> Decimal {
    earned_vacation_days(
        yearly_worked_hours,
        employment_fraction_of_year(employment_start, year),
    )
}
