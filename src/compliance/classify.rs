//! Shift classification for premium precedence.
//!
//! A closed shift falls into exactly one top-level category. Precedence:
//! public holiday, then Sunday, then Saturday, then night, then regular
//! weekday. Premiums do not stack across categories in this model; the
//! multipliers themselves are configuration data.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use rust_decimal::Decimal;

use crate::config::{NightWindow, PremiumRates};
use crate::holidays::HolidayCalendar;
use crate::models::PayCategory;

/// The top-level pay classification of a shift.
///
/// Saturday and Sunday are distinct here because they carry different
/// multipliers, even though both report under [`PayCategory::Weekend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftCategory {
    /// The shift date is a public holiday.
    Holiday,
    /// The shift date is a Sunday.
    Sunday,
    /// The shift date is a Saturday.
    Saturday,
    /// The shift intersects the night window.
    Night,
    /// An ordinary weekday shift; overtime may split off within it.
    RegularWeekday,
}

impl ShiftCategory {
    /// The reporting category this classification maps to.
    pub fn pay_category(&self) -> PayCategory {
        match self {
            ShiftCategory::Holiday => PayCategory::Holiday,
            ShiftCategory::Sunday | ShiftCategory::Saturday => PayCategory::Weekend,
            ShiftCategory::Night => PayCategory::Night,
            ShiftCategory::RegularWeekday => PayCategory::Regular,
        }
    }

    /// The premium multiplier for this classification.
    ///
    /// Regular weekday hours are at the base rate; their overtime
    /// multiplier is applied separately by the earnings calculation.
    pub fn multiplier(&self, rates: &PremiumRates) -> Decimal {
        match self {
            ShiftCategory::Holiday => rates.holiday,
            ShiftCategory::Sunday => rates.sunday,
            ShiftCategory::Saturday => rates.saturday,
            ShiftCategory::Night => rates.night,
            ShiftCategory::RegularWeekday => Decimal::ONE,
        }
    }
}

/// Returns true when any part of `[start, end)` falls inside the nightly
/// window (`start_hour` in the evening through `end_hour` the next
/// morning).
pub fn intersects_night_window(
    start: NaiveDateTime,
    end: NaiveDateTime,
    window: &NightWindow,
) -> bool {
    if start.hour() < window.end_hour {
        return true;
    }
    // Past the evening boundary of the starting day, including shifts
    // that cross midnight.
    let evening = start
        .date()
        .and_hms_opt(window.start_hour, 0, 0)
        .unwrap_or(start);
    end > evening
}

/// Classifies a shift by its local start and end wall times.
///
/// The shift date for holiday and weekend purposes is the local date of
/// check-in.
///
/// # Example
///
/// ```
/// use cao_engine::compliance::{classify_shift, ShiftCategory};
/// use cao_engine::config::PremiumConfig;
/// use cao_engine::holidays::HolidayCalendar;
/// use chrono::NaiveDate;
///
/// let calendar = HolidayCalendar::new();
/// let premiums = PremiumConfig::default();
///
/// // 2025-06-07 is a Saturday.
/// let start = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap().and_hms_opt(17, 0, 0).unwrap();
/// assert_eq!(classify_shift(start, end, &calendar, &premiums), ShiftCategory::Saturday);
/// ```
pub fn classify_shift(
    start: NaiveDateTime,
    end: NaiveDateTime,
    calendar: &HolidayCalendar,
    premiums: &crate::config::PremiumConfig,
) -> ShiftCategory {
    let date = start.date();

    if calendar.is_holiday(date) {
        return ShiftCategory::Holiday;
    }

    match date.weekday() {
        Weekday::Sun => ShiftCategory::Sunday,
        Weekday::Sat => ShiftCategory::Saturday,
        _ if intersects_night_window(start, end, &premiums.night_window) => ShiftCategory::Night,
        _ => ShiftCategory::RegularWeekday,
    }
}
