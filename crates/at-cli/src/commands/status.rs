//! Status command for showing an employee's current state.

use std::io::Write;

use anyhow::Result;
use at_core::CurrentStatus;
use at_db::Database;

use super::util::require_employee;

pub fn run<W: Write>(writer: &mut W, db: &Database, email: &str) -> Result<()> {
    let employee = require_employee(db, email)?;
    let last = db.last_punch(employee.id)?;
    let status = CurrentStatus::from_last(last.as_ref());

    writeln!(writer, "{}: {status}", employee.name)?;
    if let Some(last) = last {
        writeln!(
            writer,
            "Last punch: {} at {}",
            last.action_type,
            last.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use at_core::ActionType;
    use chrono::{TimeZone, Utc};
    use insta::assert_snapshot;

    #[test]
    fn status_without_punches() {
        let db = Database::open_in_memory().unwrap();
        db.seed_sample_employees().unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, "jane.doe@example.com").unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @"Jane Doe: Not Working");
    }

    #[test]
    fn status_follows_last_punch() {
        let db = Database::open_in_memory().unwrap();
        db.seed_sample_employees().unwrap();
        let jane = require_employee(&db, "jane.doe@example.com").unwrap();
        let at = |h, m| Utc.with_ymd_and_hms(2025, 3, 3, h, m, 0).unwrap();
        db.record_punch(jane.id, ActionType::Login, at(9, 0)).unwrap();
        db.record_punch(jane.id, ActionType::BreakStart, at(12, 0)).unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, "jane.doe@example.com").unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Jane Doe: On Break
        Last punch: break_start at 2025-03-03 12:00:00 UTC
        ");
    }
}
