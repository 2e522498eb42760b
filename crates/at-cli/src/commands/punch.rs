//! Punch command for recording an attendance action.

use std::io::Write;

use anyhow::Result;
use at_core::ActionType;
use at_db::Database;
use chrono::{DateTime, Utc};

use super::util::require_employee;

/// Records `action` for the employee with `email` at `now`.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    email: &str,
    action: ActionType,
    now: DateTime<Utc>,
) -> Result<()> {
    let employee = require_employee(db, email)?;
    db.record_punch(employee.id, action, now)?;
    writeln!(writer, "{action} marked!")?;
    Ok(())
}
