//! Work and break duration reconstruction.
//!
//! Derives worked, break and net time from an employee's punches in a single
//! forward pass.
//!
//! # Algorithm Summary
//!
//! Two open markers are tracked, one for the current work interval and one for
//! the current break:
//!
//! - `login` opens (or reopens, discarding the earlier start) a work interval
//! - `logout` closes the open work interval, if any
//! - `break_start` opens a break, but only while a work interval is open
//! - `break_end` closes the open break, if any
//!
//! Punches that close nothing are ignored. Intervals still open at the end of
//! the sequence are not counted.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::punch::{ActionType, Punch};

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_MINUTE: u64 = 60;

/// A duration split into whole hours and the remaining whole minutes.
///
/// Leftover seconds are truncated, never rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursMinutes {
    pub hours: u64,
    pub minutes: u64,
}

impl HoursMinutes {
    #[must_use]
    pub const fn from_seconds(seconds: u64) -> Self {
        Self {
            hours: seconds / SECONDS_PER_HOUR,
            minutes: (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
        }
    }
}

impl fmt::Display for HoursMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// Totals derived from a punch sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSummary {
    /// Sum of closed work intervals, in whole seconds.
    pub total_work_seconds: u64,
    /// Sum of closed break intervals, in whole seconds.
    pub total_break_seconds: u64,
    /// Work minus break, floored at zero.
    pub net_work_seconds: u64,
}

impl DurationSummary {
    #[must_use]
    pub const fn work(&self) -> HoursMinutes {
        HoursMinutes::from_seconds(self.total_work_seconds)
    }

    #[must_use]
    pub const fn breaks(&self) -> HoursMinutes {
        HoursMinutes::from_seconds(self.total_break_seconds)
    }

    #[must_use]
    pub const fn net(&self) -> HoursMinutes {
        HoursMinutes::from_seconds(self.net_work_seconds)
    }
}

/// Reconstructs work and break totals from punches ordered by timestamp.
///
/// Total over any input: empty, unordered or repetitive sequences produce
/// zero-filled (never negative) totals. Punches whose action is not
/// recognized are skipped. A close that precedes its open contributes
/// nothing.
pub fn reconstruct<P: Punch>(punches: &[P]) -> DurationSummary {
    let mut work_start: Option<DateTime<Utc>> = None;
    let mut break_start: Option<DateTime<Utc>> = None;
    let mut total_work = Duration::zero();
    let mut total_break = Duration::zero();

    for punch in punches {
        let at = punch.timestamp();
        match punch.action() {
            Some(ActionType::Login) => work_start = Some(at),
            Some(ActionType::Logout) => {
                if let Some(start) = work_start.take() {
                    total_work += elapsed(start, at);
                }
            }
            Some(ActionType::BreakStart) => {
                if work_start.is_some() {
                    break_start = Some(at);
                }
            }
            Some(ActionType::BreakEnd) => {
                if let Some(start) = break_start.take() {
                    total_break += elapsed(start, at);
                }
            }
            None => {}
        }
    }

    let total_work_seconds = whole_seconds(total_work);
    let total_break_seconds = whole_seconds(total_break);
    let net_work_seconds = total_work_seconds.saturating_sub(total_break_seconds);

    tracing::trace!(
        punches = punches.len(),
        total_work_seconds,
        total_break_seconds,
        "reconstructed durations"
    );

    DurationSummary {
        total_work_seconds,
        total_break_seconds,
        net_work_seconds,
    }
}

fn elapsed(start: DateTime<Utc>, end: DateTime<Utc>) -> Duration {
    (end - start).max(Duration::zero())
}

fn whole_seconds(duration: Duration) -> u64 {
    u64::try_from(duration.num_seconds()).unwrap_or(0)
}
