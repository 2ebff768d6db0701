//! Time entry and break models.
//!
//! A [`TimeEntry`] is created at check-in, toggled between `CheckedIn` and
//! `OnBreak` by break transitions, and finalized at check-out, after which
//! it is immutable to this subsystem. Corrections create a new record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::earnings::CaoEarningsResult;
use super::location::GpsSample;

/// The kind of break taken during a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakType {
    /// A break required by the CAO break minimums.
    Mandatory,
    /// A meal break.
    Meal,
    /// A short rest break.
    Rest,
    /// A personal break.
    Personal,
    /// An emergency interruption.
    Emergency,
}

impl BreakType {
    /// Returns the default paid flag for this break type.
    ///
    /// Short rests and emergency interruptions are paid by default in the
    /// sector; meal, personal, and mandatory breaks are unpaid unless the
    /// host overrides the flag.
    pub fn default_paid(&self) -> bool {
        matches!(self, BreakType::Rest | BreakType::Emergency)
    }
}

/// A break taken during a shift.
///
/// A break is open while `ended_at` is `None`; ending the break or checking
/// out closes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakRecord {
    /// When the break started.
    pub started_at: DateTime<Utc>,
    /// When the break ended; `None` while the break is open.
    pub ended_at: Option<DateTime<Utc>>,
    /// The kind of break.
    pub break_type: BreakType,
    /// Duration in minutes the guard announced at the start, if any.
    ///
    /// Purely informational: the actual duration is whatever the clock
    /// records, but the overrun is useful audit context.
    #[serde(default)]
    pub planned_minutes: Option<i64>,
    /// Whether the break counts as paid time.
    pub is_paid: bool,
    /// The verified location where the break started.
    pub start_location: GpsSample,
    /// The verified location where the break ended, once closed.
    pub end_location: Option<GpsSample>,
    /// Whether both endpoints passed location verification.
    pub is_verified: bool,
}

impl BreakRecord {
    /// Returns the break duration in minutes, or `None` while it is open.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.ended_at
            .map(|ended| (ended - self.started_at).num_minutes())
    }
}

/// The lifecycle state of a time entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEntryStatus {
    /// The guard is checked in and working.
    CheckedIn,
    /// The guard is on a break.
    OnBreak,
    /// The shift is closed; the entry is immutable.
    CheckedOut,
}

/// A guard's verified presence record for one shift.
///
/// At most one entry per guard is non-terminal at any instant. The entry is
/// authoritative for pay only when both check-in and check-out carried a
/// geofence-verified sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Unique identifier for this entry.
    pub id: Uuid,
    /// The guard who worked the shift.
    pub guard_id: String,
    /// The scheduled shift being worked.
    pub shift_id: String,
    /// The job site the shift belongs to.
    pub site_id: String,
    /// When the guard checked in.
    pub checked_in_at: DateTime<Utc>,
    /// When the guard checked out; `None` while the entry is open.
    pub checked_out_at: Option<DateTime<Utc>>,
    /// The verified check-in sample.
    pub check_in_location: GpsSample,
    /// The verified check-out sample, once closed.
    pub check_out_location: Option<GpsSample>,
    /// Periodic samples collected while the shift was open, in order.
    pub location_samples: Vec<GpsSample>,
    /// Breaks taken during the shift, in order, non-overlapping.
    pub breaks: Vec<BreakRecord>,
    /// The computed earnings breakdown, attached at check-out.
    pub earnings: Option<CaoEarningsResult>,
    /// The lifecycle state.
    pub status: TimeEntryStatus,
}

impl TimeEntry {
    /// Creates a freshly checked-in entry from a verified sample.
    pub fn checked_in(
        guard_id: impl Into<String>,
        shift_id: impl Into<String>,
        site_id: impl Into<String>,
        check_in: GpsSample,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            guard_id: guard_id.into(),
            shift_id: shift_id.into(),
            site_id: site_id.into(),
            checked_in_at: check_in.recorded_at,
            checked_out_at: None,
            check_in_location: check_in,
            check_out_location: None,
            location_samples: vec![check_in],
            breaks: Vec::new(),
            earnings: None,
            status: TimeEntryStatus::CheckedIn,
        }
    }

    /// Returns true once the entry is checked out.
    pub fn is_closed(&self) -> bool {
        self.status == TimeEntryStatus::CheckedOut
    }

    /// Returns the currently open break, if any.
    pub fn open_break(&self) -> Option<&BreakRecord> {
        self.breaks.iter().find(|b| b.ended_at.is_none())
    }

    /// Total check-in to check-out span in minutes, ignoring breaks.
    ///
    /// Returns 0 while the entry is still open.
    pub fn shift_minutes(&self) -> i64 {
        match self.checked_out_at {
            Some(out) => (out - self.checked_in_at).num_minutes(),
            None => 0,
        }
    }

    /// Total check-in to check-out span in hours as a Decimal.
    pub fn shift_hours(&self) -> Decimal {
        Decimal::new(self.shift_minutes(), 0) / Decimal::new(60, 0)
    }

    /// Sum of all closed break durations in minutes, paid or not.
    pub fn break_minutes(&self) -> i64 {
        self.breaks
            .iter()
            .filter_map(|b| b.duration_minutes())
            .sum()
    }

    /// Sum of unpaid closed break durations in minutes.
    pub fn unpaid_break_minutes(&self) -> i64 {
        self.breaks
            .iter()
            .filter(|b| !b.is_paid)
            .filter_map(|b| b.duration_minutes())
            .sum()
    }

    /// Calculates the actual worked hours for a closed entry.
    ///
    /// Worked time is the check-in to check-out span minus unpaid break
    /// time. Paid breaks are NOT subtracted. Returns zero while the entry
    /// is open.
    ///
    /// # Example
    ///
    /// ```
    /// use cao_engine::models::{GpsSample, TimeEntry};
    /// use chrono::{TimeZone, Utc};
    /// use rust_decimal::Decimal;
    ///
    /// let check_in = GpsSample {
    ///     latitude: 52.0,
    ///     longitude: 4.0,
    ///     accuracy_meters: 10.0,
    ///     recorded_at: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
    ///     is_mock_source: false,
    /// };
    /// let mut entry = TimeEntry::checked_in("guard_001", "shift_001", "site_001", check_in);
    /// entry.checked_out_at = Some(Utc.with_ymd_and_hms(2025, 6, 2, 17, 0, 0).unwrap());
    /// entry.status = cao_engine::models::TimeEntryStatus::CheckedOut;
    /// assert_eq!(entry.worked_hours(), Decimal::new(80, 1)); // 8.0 hours
    /// ```
    pub fn worked_hours(&self) -> Decimal {
        let worked_minutes = self.shift_minutes() - self.unpaid_break_minutes();
        Decimal::new(worked_minutes, 0) / Decimal::new(60, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn sample_at(at: DateTime<Utc>) -> GpsSample {
        GpsSample {
            latitude: 52.3676,
            longitude: 4.9041,
            accuracy_meters: 12.0,
            recorded_at: at,
            is_mock_source: false,
        }
    }

    fn closed_entry(
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        breaks: Vec<BreakRecord>,
    ) -> TimeEntry {
        let mut entry =
            TimeEntry::checked_in("guard_001", "shift_001", "site_001", sample_at(check_in));
        entry.breaks = breaks;
        entry.checked_out_at = Some(check_out);
        entry.check_out_location = Some(sample_at(check_out));
        entry.status = TimeEntryStatus::CheckedOut;
        entry
    }

    fn break_between(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        break_type: BreakType,
        is_paid: bool,
    ) -> BreakRecord {
        BreakRecord {
            started_at: start,
            ended_at: Some(end),
            break_type,
            planned_minutes: None,
            is_paid,
            start_location: sample_at(start),
            end_location: Some(sample_at(end)),
            is_verified: true,
        }
    }

    /// TE-001: 8 hour entry, no breaks
    #[test]
    fn test_8_hour_entry_no_breaks() {
        let entry = closed_entry(utc(2025, 6, 2, 9, 0), utc(2025, 6, 2, 17, 0), vec![]);
        assert_eq!(entry.worked_hours(), Decimal::new(80, 1)); // 8.0
    }

    /// TE-002: 8.5 hour entry with 30min unpaid meal break
    #[test]
    fn test_8_5_hour_entry_with_unpaid_break() {
        let entry = closed_entry(
            utc(2025, 6, 2, 9, 0),
            utc(2025, 6, 2, 17, 30),
            vec![break_between(
                utc(2025, 6, 2, 12, 0),
                utc(2025, 6, 2, 12, 30),
                BreakType::Meal,
                false,
            )],
        );
        assert_eq!(entry.worked_hours(), Decimal::new(80, 1)); // 8.0
    }

    /// TE-003: 8.5 hour entry with 30min paid rest break
    #[test]
    fn test_8_5_hour_entry_with_paid_break() {
        let entry = closed_entry(
            utc(2025, 6, 2, 9, 0),
            utc(2025, 6, 2, 17, 30),
            vec![break_between(
                utc(2025, 6, 2, 12, 0),
                utc(2025, 6, 2, 12, 30),
                BreakType::Rest,
                true,
            )],
        );
        assert_eq!(entry.worked_hours(), Decimal::new(85, 1)); // 8.5
    }

    /// TE-004: overnight entry crossing midnight
    #[test]
    fn test_overnight_entry() {
        let entry = closed_entry(utc(2025, 6, 2, 22, 0), utc(2025, 6, 3, 6, 0), vec![]);
        assert_eq!(entry.worked_hours(), Decimal::new(80, 1)); // 8.0
    }

    #[test]
    fn test_open_entry_has_zero_worked_hours() {
        let entry = TimeEntry::checked_in(
            "guard_001",
            "shift_001",
            "site_001",
            sample_at(utc(2025, 6, 2, 9, 0)),
        );
        assert_eq!(entry.worked_hours(), Decimal::ZERO);
        assert!(!entry.is_closed());
        assert_eq!(entry.status, TimeEntryStatus::CheckedIn);
    }

    #[test]
    fn test_open_break_lookup() {
        let mut entry = TimeEntry::checked_in(
            "guard_001",
            "shift_001",
            "site_001",
            sample_at(utc(2025, 6, 2, 9, 0)),
        );
        assert!(entry.open_break().is_none());

        entry.breaks.push(BreakRecord {
            started_at: utc(2025, 6, 2, 12, 0),
            ended_at: None,
            break_type: BreakType::Meal,
            planned_minutes: Some(30),
            is_paid: false,
            start_location: sample_at(utc(2025, 6, 2, 12, 0)),
            end_location: None,
            is_verified: true,
        });
        entry.status = TimeEntryStatus::OnBreak;

        let open = entry.open_break().unwrap();
        assert_eq!(open.break_type, BreakType::Meal);
        assert_eq!(open.planned_minutes, Some(30));
        assert!(open.duration_minutes().is_none());
    }

    #[test]
    fn test_break_record_without_planned_minutes_deserializes() {
        // Records written before the field existed carry no planned
        // duration.
        let json = r#"{
            "started_at": "2025-06-02T12:00:00Z",
            "ended_at": null,
            "break_type": "meal",
            "is_paid": false,
            "start_location": {
                "latitude": 52.3676,
                "longitude": 4.9041,
                "accuracy_meters": 12.0,
                "recorded_at": "2025-06-02T12:00:00Z",
                "is_mock_source": false
            },
            "end_location": null,
            "is_verified": true
        }"#;
        let record: BreakRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.planned_minutes, None);
    }

    #[test]
    fn test_multiple_breaks_mixed_paid() {
        let entry = closed_entry(
            utc(2025, 6, 2, 8, 0),
            utc(2025, 6, 2, 18, 0), // 10 hours total
            vec![
                break_between(
                    utc(2025, 6, 2, 10, 0),
                    utc(2025, 6, 2, 10, 15),
                    BreakType::Rest,
                    true,
                ),
                break_between(
                    utc(2025, 6, 2, 12, 0),
                    utc(2025, 6, 2, 12, 30),
                    BreakType::Meal,
                    false,
                ),
                break_between(
                    utc(2025, 6, 2, 15, 0),
                    utc(2025, 6, 2, 15, 15),
                    BreakType::Personal,
                    false,
                ),
            ],
        );

        assert_eq!(entry.break_minutes(), 60);
        assert_eq!(entry.unpaid_break_minutes(), 45);
        // 10 hours - 45 min unpaid = 9.25 hours
        assert_eq!(entry.worked_hours(), Decimal::new(925, 2));
    }

    #[test]
    fn test_default_paid_flags() {
        assert!(BreakType::Rest.default_paid());
        assert!(BreakType::Emergency.default_paid());
        assert!(!BreakType::Meal.default_paid());
        assert!(!BreakType::Personal.default_paid());
        assert!(!BreakType::Mandatory.default_paid());
    }

    #[test]
    fn test_entry_serialization_round_trip() {
        let entry = closed_entry(
            utc(2025, 6, 2, 9, 0),
            utc(2025, 6, 2, 17, 0),
            vec![break_between(
                utc(2025, 6, 2, 12, 0),
                utc(2025, 6, 2, 12, 30),
                BreakType::Meal,
                false,
            )],
        );

        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: TimeEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, deserialized);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TimeEntryStatus::CheckedOut).unwrap();
        assert_eq!(json, "\"checked_out\"");
        let json = serde_json::to_string(&BreakType::Meal).unwrap();
        assert_eq!(json, "\"meal\"");
    }
}
