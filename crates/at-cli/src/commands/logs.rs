//! Logs command for printing an employee's punches and durations.

use std::io::Write;

use anyhow::Result;
use at_core::CurrentStatus;
use at_db::Database;
use at_server::AttendanceLog;
use chrono::{DateTime, Utc};

use super::util::{parse_bound, require_employee};

/// Prints the attendance log of the employee with `email`.
///
/// `since` and `until` accept ISO 8601 or relative times resolved against
/// `now`.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    email: &str,
    since: Option<&str>,
    until: Option<&str>,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let employee = require_employee(db, email)?;
    let since = parse_bound(since, now)?;
    let until = parse_bound(until, now)?;
    let records = db.list_punches_between(employee.id, since, until)?;
    let status = CurrentStatus::from_last(db.last_punch(employee.id)?.as_ref());
    let log = AttendanceLog::new(employee.name, records, status);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&log)?)?;
        return Ok(());
    }

    writeln!(writer, "Attendance for {}", log.name)?;
    if log.records.is_empty() {
        writeln!(writer, "No punches recorded.")?;
    }
    for record in &log.records {
        writeln!(
            writer,
            "{}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            record.action_type
        )?;
    }

    let summary = &log.summary;
    writeln!(writer)?;
    writeln!(writer, "Work:   {}h {}m", summary.work.hours, summary.work.minutes)?;
    writeln!(
        writer,
        "Break:  {}h {}m",
        summary.break_time.hours, summary.break_time.minutes
    )?;
    writeln!(writer, "Net:    {}h {}m", summary.net.hours, summary.net.minutes)?;
    writeln!(writer, "Status: {}", summary.status)?;

    Ok(())
}
