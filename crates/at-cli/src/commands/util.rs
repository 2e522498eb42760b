//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use at_core::{Email, Employee};
use at_db::Database;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;

static RELATIVE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Longest accepted relative offset in days, about a thousand years.
const MAX_AGO_DAYS: i64 = 1000 * 365;

/// Parses an RFC 3339 instant or an offset such as `"2 hours ago"` relative
/// to `now`.
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let caps = RELATIVE_TIME.captures(s.trim()).with_context(|| {
        format!("Invalid datetime: {s}. Use RFC 3339 (2025-03-03T09:00:00Z) or e.g. '2 hours ago'")
    })?;
    let count: i64 = caps[1].parse().context("relative time count out of range")?;
    let unit = match &caps[2] {
        "minute" => Duration::minutes(1),
        "hour" => Duration::hours(1),
        "day" => Duration::days(1),
        _ => Duration::weeks(1),
    };

    let ago = i32::try_from(count)
        .ok()
        .and_then(|count| unit.checked_mul(count))
        .filter(|ago| *ago <= Duration::days(MAX_AGO_DAYS))
        .with_context(|| format!("relative time too large: {s}"))?;
    Ok(now - ago)
}

/// Parses an optional `--since`/`--until` value.
pub fn parse_bound(s: Option<&str>, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
    s.map(|s| parse_datetime(s, now)).transpose()
}

/// Looks up an employee by email, failing if there is none.
pub fn require_employee(db: &Database, email: &str) -> Result<Employee> {
    let email = Email::new(email).context("invalid --email")?;
    db.find_employee_by_email(&email)?
        .with_context(|| format!("no employee with email {email}"))
}
