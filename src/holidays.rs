//! Dutch public holiday calendar.
//!
//! Combines the fixed national holidays with the Easter-derived ones
//! computed via the anonymous Gregorian computus. Results are memoized
//! per year.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use chrono::{Datelike, Duration, NaiveDate};

/// Computes Easter Sunday for a year in the Gregorian calendar.
///
/// Uses the anonymous Gregorian algorithm (Meeus/Jones/Butcher).
///
/// # Example
///
/// ```
/// use cao_engine::holidays::easter_sunday;
/// use chrono::NaiveDate;
///
/// assert_eq!(easter_sunday(2025), NaiveDate::from_ymd_opt(2025, 4, 20).unwrap());
/// assert_eq!(easter_sunday(2026), NaiveDate::from_ymd_opt(2026, 4, 5).unwrap());
/// ```
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    // The computus always yields a valid March or April date.
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 4, 1).expect("valid date"))
}

/// Computes the public holidays for a year.
///
/// Fixed dates: New Year's Day (Jan 1), Koningsdag (Apr 27),
/// Bevrijdingsdag (May 5), and both Christmas days (Dec 25-26).
/// Easter-derived: Good Friday, Easter Monday, Ascension Day, and
/// Whit Monday.
///
/// # Example
///
/// ```
/// use cao_engine::holidays::holidays_for_year;
/// use chrono::NaiveDate;
///
/// let holidays = holidays_for_year(2025);
/// assert!(holidays.contains(&NaiveDate::from_ymd_opt(2025, 4, 27).unwrap()));
/// assert!(holidays.contains(&NaiveDate::from_ymd_opt(2025, 4, 18).unwrap())); // Good Friday
/// assert_eq!(holidays.len(), 9);
/// ```
pub fn holidays_for_year(year: i32) -> BTreeSet<NaiveDate> {
    let mut holidays = BTreeSet::new();

    let fixed = [(1, 1), (4, 27), (5, 5), (12, 25), (12, 26)];
    for (month, day) in fixed {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            holidays.insert(date);
        }
    }

    let easter = easter_sunday(year);
    holidays.insert(easter - Duration::days(2)); // Good Friday
    holidays.insert(easter + Duration::days(1)); // Easter Monday
    holidays.insert(easter + Duration::days(39)); // Ascension Day
    holidays.insert(easter + Duration::days(50)); // Whit Monday

    holidays
}

/// A per-year memoizing holiday calendar.
///
/// Safe to share across workers; derivation is pure, so the cache only
/// avoids recomputation.
#[derive(Debug, Default)]
pub struct HolidayCalendar {
    cache: Mutex<HashMap<i32, BTreeSet<NaiveDate>>>,
}

impl HolidayCalendar {
    /// Creates an empty calendar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `date` is a public holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .entry(date.year())
            .or_insert_with(|| holidays_for_year(date.year()))
            .contains(&date)
    }

    /// Returns the holidays for a year, computing and caching on first use.
    pub fn holidays(&self, year: i32) -> BTreeSet<NaiveDate> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .entry(year)
            .or_insert_with(|| holidays_for_year(year))
            .clone()
    }
}
