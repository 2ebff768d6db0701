//! GPS-verified time tracking and CAO pay compliance for security guards.
//!
//! The crate has two halves that meet at check-out:
//!
//! - the **shift clock** ([`clock::ShiftClock`]) drives the verified
//!   check-in / break / check-out state machine, backed by a
//!   [`repository::TimeEntryRepository`] and an
//!   [`offline::OfflineQueue`] for the field's flaky connectivity;
//! - the **compliance engine** ([`compliance::ComplianceRuleEngine`])
//!   prices closed entries under the Dutch security-sector CAO: premium
//!   categories, overtime, vakantiegeld and working-time violations.
//!
//! Policy numbers (premium multipliers, working limits, geofence radii)
//! come from [`config::CaoConfig`], loadable from YAML, so a CAO revision
//! is a data change.

#![warn(missing_docs)]

pub mod clock;
pub mod compliance;
pub mod config;
pub mod error;
pub mod geo;
pub mod holidays;
pub mod inference;
pub mod models;
pub mod offline;
pub mod repository;
pub mod timezone;
pub mod verify;

pub use error::{EngineError, EngineResult};
