//! Core data models for the CAO time tracking and compliance engine.
//!
//! This module contains all the domain models used throughout the engine.

mod earnings;
mod location;
mod time_entry;

pub use earnings::{
    CaoComplianceResult, CaoEarningsResult, CaoViolation, CategoryLine, PayCategory, ViolationKind,
};
pub use location::{Coordinate, GeofenceSpec, GpsSample};
pub use time_entry::{BreakRecord, BreakType, TimeEntry, TimeEntryStatus};
