//! JSON bodies returned by the views.

use at_core::{CurrentStatus, DurationSummary, HoursMinutes, reconstruct};
use at_db::StoredPunch;
use serde::{Deserialize, Serialize};

/// A duration in seconds plus its hours/minutes split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationView {
    pub seconds: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl DurationView {
    fn new(seconds: u64) -> Self {
        let HoursMinutes { hours, minutes } = HoursMinutes::from_seconds(seconds);
        Self {
            seconds,
            hours,
            minutes,
        }
    }
}

/// Work, break and net totals plus the current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryView {
    pub work: DurationView,
    #[serde(rename = "break")]
    pub break_time: DurationView,
    pub net: DurationView,
    pub status: CurrentStatus,
}

impl SummaryView {
    /// Summarizes punches ordered by timestamp.
    ///
    /// `status` comes from the employee's latest punch overall, which may lie
    /// outside `punches` when they are a filtered window.
    pub fn from_punches(punches: &[StoredPunch], status: CurrentStatus) -> Self {
        let DurationSummary {
            total_work_seconds,
            total_break_seconds,
            net_work_seconds,
        } = reconstruct(punches);
        Self {
            work: DurationView::new(total_work_seconds),
            break_time: DurationView::new(total_break_seconds),
            net: DurationView::new(net_work_seconds),
            status,
        }
    }
}

/// An employee's punches and their summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceLog {
    pub name: String,
    pub records: Vec<StoredPunch>,
    pub summary: SummaryView,
}

impl AttendanceLog {
    pub fn new(name: String, records: Vec<StoredPunch>, status: CurrentStatus) -> Self {
        let summary = SummaryView::from_punches(&records, status);
        Self {
            name,
            records,
            summary,
        }
    }
}

/// Body of `GET /dashboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardView {
    pub name: String,
    pub status: CurrentStatus,
}

/// Body returned after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedIn {
    pub token: String,
    /// Where the client should go next.
    pub landing: String,
}
