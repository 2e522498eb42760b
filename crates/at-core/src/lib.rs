//! Core domain logic for the attendance tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Punches: the four recognized actions and the [`Punch`] abstraction
//! - Summaries: reconstructing work/break/net durations from punches
//! - Status: the dashboard label derived from the latest punch
//! - Authorization: gating views by the signed-in principal's role
//! - Credentials: local password hashing

pub mod auth;
pub mod credentials;
pub mod punch;
mod status;
mod summary;
pub mod types;

pub use auth::{Capability, Denial, Principal, authorize};
pub use punch::{ActionType, Punch, PunchEvent, UnknownAction};
pub use status::{CurrentStatus, current_status};
pub use summary::{DurationSummary, HoursMinutes, reconstruct};
pub use types::{Email, Employee, EmployeeId, Role, ValidationError};
