//! Current status derived from the most recent punch.
//!
//! This looks only at the last punch and is independent of
//! [`reconstruct`](crate::reconstruct): an orphan `break_start` after a
//! `logout` reports [`CurrentStatus::OnBreak`] even though the reconstructor
//! ignores that break.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::punch::{ActionType, Punch};

/// Point-in-time label shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrentStatus {
    #[serde(rename = "Working")]
    Working,
    #[serde(rename = "On Break")]
    OnBreak,
    #[serde(rename = "Not Working")]
    NotWorking,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl CurrentStatus {
    /// Derives the status from the most recent punch, if there is one.
    pub fn from_last<P: Punch>(last: Option<&P>) -> Self {
        let Some(punch) = last else {
            return Self::NotWorking;
        };
        match punch.action() {
            Some(ActionType::Login | ActionType::BreakEnd) => Self::Working,
            Some(ActionType::BreakStart) => Self::OnBreak,
            Some(ActionType::Logout) => Self::NotWorking,
            None => Self::Unknown,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Working => "Working",
            Self::OnBreak => "On Break",
            Self::NotWorking => "Not Working",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CurrentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Derives the status from punches ordered by timestamp (the last one wins).
pub fn current_status<P: Punch>(punches: &[P]) -> CurrentStatus {
    CurrentStatus::from_last(punches.last())
}
