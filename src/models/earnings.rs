//! Earnings and compliance result models.
//!
//! This module contains the [`CaoEarningsResult`] type and its associated
//! structures that capture the outputs of a pay calculation: per-category
//! hours and earnings, vakantiegeld accrual, and the compliance verdict.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The pay category a shift's hours fall into.
///
/// A shift is classified into exactly one top-level category; only a
/// regular weekday shift splits further into regular and overtime hours.
///
/// # Example
///
/// ```
/// use cao_engine::models::PayCategory;
///
/// let category = PayCategory::Weekend;
/// assert_eq!(format!("{:?}", category), "Weekend");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayCategory {
    /// Ordinary weekday hours at the base rate.
    Regular,
    /// Weekday hours beyond the daily ordinary threshold, at 150%.
    Overtime,
    /// Saturday (150%) or Sunday (200%) hours.
    Weekend,
    /// Hours on a shift intersecting the night window, at 130%.
    Night,
    /// Hours on a public holiday, at 200%.
    Holiday,
}

/// Hours, rate, and amount for one pay category of a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLine {
    /// The pay category.
    pub category: PayCategory,
    /// Hours worked in this category.
    pub hours: Decimal,
    /// The effective hourly rate for this category.
    pub rate: Decimal,
    /// The total amount for this line (hours * rate).
    pub amount: Decimal,
}

/// The kind of a CAO violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A single shift exceeded the maximum shift length.
    ExceedsMaximumHours,
    /// The week's total hours exceeded the weekly maximum.
    ExceedsWeeklyHours,
    /// Actual break time fell below the required minimum.
    MissingRequiredBreaks,
    /// The rest period since the previous shift was too short.
    InsufficientRestPeriod,
}

/// A detected CAO violation.
///
/// Violations are advisory audit data for payroll review; they never block
/// closing a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaoViolation {
    /// The kind of violation.
    pub kind: ViolationKind,
    /// A human-readable description with the measured values.
    pub description: String,
    /// Severity in [0, 1]; 1 is the most severe.
    pub severity: f64,
    /// When the violation was detected.
    pub detected_at: DateTime<Utc>,
}

impl CaoViolation {
    /// Returns a coarse label for the severity score, for audit export.
    pub fn severity_label(&self) -> &'static str {
        if self.severity >= 0.75 {
            "high"
        } else if self.severity >= 0.4 {
            "medium"
        } else {
            "low"
        }
    }
}

/// The compliance verdict for one closed shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaoComplianceResult {
    /// True when no violations were detected. Warnings do not affect this.
    pub is_compliant: bool,
    /// Detected violations, advisory only.
    pub violations: Vec<CaoViolation>,
    /// Non-blocking warnings (for example a short but legal rest period).
    pub warnings: Vec<CaoViolation>,
}

impl CaoComplianceResult {
    /// A verdict with no findings.
    pub fn compliant() -> Self {
        Self {
            is_compliant: true,
            violations: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// The complete earnings breakdown for one closed shift.
///
/// Category hours sum to the shift's actual worked hours; vakantiegeld is
/// reported separately and is never folded into `total_earnings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaoEarningsResult {
    /// Per-category hours and earnings. Categories without hours are absent.
    pub lines: Vec<CategoryLine>,
    /// Total earnings across all categories, excluding vakantiegeld.
    pub total_earnings: Decimal,
    /// Statutory holiday-pay accrual (vakantiegeld, 8% of total earnings).
    pub holiday_pay: Decimal,
    /// Total earnings divided by total hours; zero for a zero-hour shift.
    pub effective_hourly_rate: Decimal,
    /// The compliance verdict computed alongside the earnings.
    pub compliance: CaoComplianceResult,
}

impl CaoEarningsResult {
    /// Total hours across all category lines.
    pub fn total_hours(&self) -> Decimal {
        self.lines.iter().map(|l| l.hours).sum()
    }

    /// Hours in one category, zero if the category is absent.
    pub fn hours_for(&self, category: PayCategory) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.category == category)
            .map(|l| l.hours)
            .sum()
    }

    /// Earnings in one category, zero if the category is absent.
    pub fn amount_for(&self, category: PayCategory) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.category == category)
            .map(|l| l.amount)
            .sum()
    }
}
