//! CAO compliance and pay interpretation.
//!
//! This module turns a closed [`TimeEntry`] into a priced, compliance-checked
//! [`CaoEarningsResult`]: shifts are classified into pay categories
//! ([`classify_shift`]), priced with the CAO premium multipliers
//! ([`compute_earnings`]), and checked against working-time limits
//! ([`validate_entry`]). Vacation accrual lives in [`earned_vacation_days`].

mod classify;
mod earnings;
mod vacation;
mod validation;

pub use classify::{classify_shift, intersects_night_window, ShiftCategory};
pub use earnings::compute_earnings;
pub use vacation::{earned_vacation_days, employment_fraction_of_year, vacation_days_for_year};
pub use validation::validate_entry;

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::config::CaoConfig;
use crate::error::EngineResult;
use crate::holidays::HolidayCalendar;
use crate::models::{CaoComplianceResult, CaoEarningsResult, TimeEntry};
use crate::timezone::LocalClock;

/// Bundles the CAO policy, holiday calendar and timezone handling into a
/// single engine that prices and validates time entries.
///
/// The engine is cheap to clone-by-`Arc` and safe to share across tasks:
/// all of its state is read-only after construction apart from the holiday
/// calendar's internal memoization.
pub struct ComplianceRuleEngine {
    config: CaoConfig,
    calendar: HolidayCalendar,
    local_clock: Arc<dyn LocalClock>,
}

impl ComplianceRuleEngine {
    /// Creates an engine over the given CAO policy.
    pub fn new(config: CaoConfig, local_clock: Arc<dyn LocalClock>) -> Self {
        Self {
            config,
            calendar: HolidayCalendar::new(),
            local_clock,
        }
    }

    /// The CAO policy this engine applies.
    pub fn config(&self) -> &CaoConfig {
        &self.config
    }

    /// Prices a closed entry and attaches a compliance verdict.
    ///
    /// `weekly_entries` are the guard's other entries used for the weekly
    /// hour cap and rest-period checks; the entry being priced is excluded
    /// automatically.
    pub fn compute_earnings(
        &self,
        entry: &TimeEntry,
        base_rate: Decimal,
        weekly_entries: &[TimeEntry],
    ) -> EngineResult<CaoEarningsResult> {
        compute_earnings(
            entry,
            base_rate,
            weekly_entries,
            &self.calendar,
            self.local_clock.as_ref(),
            &self.config,
        )
    }

    /// Runs only the working-time checks, without pricing.
    pub fn validate(&self, entry: &TimeEntry, weekly_entries: &[TimeEntry]) -> CaoComplianceResult {
        validate_entry(entry, weekly_entries, self.local_clock.as_ref(), &self.config)
    }
}
